// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability-bitmask decoding and attribute classification.
//!
//! Attribute notifications arrive with a raw [`ChangeMask`] whose individual
//! bits each signal one category of change. [`DecodedFacts::decode`] turns
//! that mask into an immutable set of named [`Fact`]s plus a [`Direction`],
//! so downstream logic is set-membership tests rather than nested bit
//! checks. Decoding is pure and total: every 32-bit pattern produces a
//! valid (possibly empty) fact set, and unknown bits are ignored.
//!
//! The second half of this module classifies the affected attribute into
//! the interest categories that decide what resolution the dispatcher
//! performs: a point read for vertex-position data, a hierarchy walk for
//! transform channels, or a vertex enumeration for derived-mesh outputs.

use core::fmt;

use crate::node::NodeHandle;

// ---------------------------------------------------------------------------
// Mask bits
// ---------------------------------------------------------------------------

/// An incoming connection was made to the attribute.
pub const CONNECTION_MADE: u32 = 1 << 0;
/// A connection to the attribute was broken.
pub const CONNECTION_BROKEN: u32 = 1 << 1;
/// The attribute was evaluated (pulled by the dependency graph).
pub const EVAL: u32 = 1 << 2;
/// The attribute's value was set directly.
pub const VALUE_SET: u32 = 1 << 3;
/// The attribute was locked.
pub const LOCKED: u32 = 1 << 4;
/// The attribute was unlocked.
pub const UNLOCKED: u32 = 1 << 5;
/// A dynamic attribute was added to the node.
pub const ATTRIBUTE_ADDED: u32 = 1 << 6;
/// A dynamic attribute was removed from the node.
pub const ATTRIBUTE_REMOVED: u32 = 1 << 7;
/// The attribute was renamed.
pub const ATTRIBUTE_RENAMED: u32 = 1 << 8;
/// The attribute was made keyable.
pub const KEYABLE: u32 = 1 << 9;
/// The attribute was made unkeyable.
pub const UNKEYABLE: u32 = 1 << 10;
/// The change describes data flowing *into* the node.
pub const INCOMING: u32 = 1 << 11;
/// An element was added to an array attribute.
pub const ARRAY_ADDED: u32 = 1 << 12;
/// An element was removed from an array attribute.
pub const ARRAY_REMOVED: u32 = 1 << 13;
/// The peer attribute on the other side of a connection was set.
pub const PEER_SET: u32 = 1 << 14;

/// Every bit the decoder recognizes.
const KNOWN: u32 = CONNECTION_MADE
    | CONNECTION_BROKEN
    | EVAL
    | VALUE_SET
    | LOCKED
    | UNLOCKED
    | ATTRIBUTE_ADDED
    | ATTRIBUTE_REMOVED
    | ATTRIBUTE_RENAMED
    | KEYABLE
    | UNKEYABLE
    | INCOMING
    | ARRAY_ADDED
    | ARRAY_REMOVED
    | PEER_SET;

/// The raw capability bitmask delivered with an attribute notification.
///
/// Hosts assemble this from their native message flags. Core never branches
/// on the raw value directly; it goes through [`DecodedFacts::decode`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangeMask(pub u32);

impl fmt::Debug for ChangeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeMask({:#x})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

/// One semantic fact about an attribute change.
///
/// Facts are non-exclusive; a single notification routinely carries several
/// (e.g. [`ValueSet`](Self::ValueSet) on an incoming change).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fact {
    /// See [`CONNECTION_MADE`].
    ConnectionMade,
    /// See [`CONNECTION_BROKEN`].
    ConnectionBroken,
    /// See [`EVAL`].
    Eval,
    /// See [`VALUE_SET`].
    ValueSet,
    /// See [`LOCKED`].
    Locked,
    /// See [`UNLOCKED`].
    Unlocked,
    /// See [`ATTRIBUTE_ADDED`].
    AttributeAdded,
    /// See [`ATTRIBUTE_REMOVED`].
    AttributeRemoved,
    /// See [`ATTRIBUTE_RENAMED`].
    AttributeRenamed,
    /// See [`KEYABLE`].
    Keyable,
    /// See [`UNKEYABLE`].
    Unkeyable,
    /// See [`ARRAY_ADDED`].
    ArrayAdded,
    /// See [`ARRAY_REMOVED`].
    ArrayRemoved,
    /// See [`PEER_SET`].
    PeerSet,
}

/// Fixed decoding table, one entry per recognized bit.
///
/// [`INCOMING`] is deliberately absent: direction is surfaced as
/// [`DecodedFacts::direction`], not as a set member.
const FACT_TABLE: &[(u32, Fact)] = &[
    (CONNECTION_MADE, Fact::ConnectionMade),
    (CONNECTION_BROKEN, Fact::ConnectionBroken),
    (EVAL, Fact::Eval),
    (VALUE_SET, Fact::ValueSet),
    (LOCKED, Fact::Locked),
    (UNLOCKED, Fact::Unlocked),
    (ATTRIBUTE_ADDED, Fact::AttributeAdded),
    (ATTRIBUTE_REMOVED, Fact::AttributeRemoved),
    (ATTRIBUTE_RENAMED, Fact::AttributeRenamed),
    (KEYABLE, Fact::Keyable),
    (UNKEYABLE, Fact::Unkeyable),
    (ARRAY_ADDED, Fact::ArrayAdded),
    (ARRAY_REMOVED, Fact::ArrayRemoved),
    (PEER_SET, Fact::PeerSet),
];

impl Fact {
    /// Returns the fact's report label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConnectionMade => "connection-made",
            Self::ConnectionBroken => "connection-broken",
            Self::Eval => "eval",
            Self::ValueSet => "value-set",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::AttributeAdded => "attribute-added",
            Self::AttributeRemoved => "attribute-removed",
            Self::AttributeRenamed => "attribute-renamed",
            Self::Keyable => "keyable",
            Self::Unkeyable => "unkeyable",
            Self::ArrayAdded => "array-added",
            Self::ArrayRemoved => "array-removed",
            Self::PeerSet => "peer-set",
        }
    }

    const fn bit(self) -> u32 {
        match self {
            Self::ConnectionMade => CONNECTION_MADE,
            Self::ConnectionBroken => CONNECTION_BROKEN,
            Self::Eval => EVAL,
            Self::ValueSet => VALUE_SET,
            Self::Locked => LOCKED,
            Self::Unlocked => UNLOCKED,
            Self::AttributeAdded => ATTRIBUTE_ADDED,
            Self::AttributeRemoved => ATTRIBUTE_REMOVED,
            Self::AttributeRenamed => ATTRIBUTE_RENAMED,
            Self::Keyable => KEYABLE,
            Self::Unkeyable => UNKEYABLE,
            Self::ArrayAdded => ARRAY_ADDED,
            Self::ArrayRemoved => ARRAY_REMOVED,
            Self::PeerSet => PEER_SET,
        }
    }
}

/// Which way data flowed for an attribute change.
///
/// Only incoming changes are relevant for transform and point resolution;
/// outgoing evaluations are reported but never resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Data flowing into the node.
    Incoming,
    /// Data flowing out of the node.
    Outgoing,
}

/// The decoded, immutable view of a [`ChangeMask`].
///
/// Holds only recognized bits; membership queries are constant time.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedFacts {
    bits: u32,
    direction: Direction,
}

impl DecodedFacts {
    /// Decodes a raw mask. Pure and total: unknown bits are dropped, never
    /// errors, and an all-zero mask yields an empty fact set.
    #[must_use]
    pub const fn decode(mask: ChangeMask) -> Self {
        let direction = if mask.0 & INCOMING != 0 {
            Direction::Incoming
        } else {
            Direction::Outgoing
        };
        Self {
            bits: mask.0 & KNOWN & !INCOMING,
            direction,
        }
    }

    /// Returns whether the set contains `fact`.
    #[must_use]
    pub const fn contains(self, fact: Fact) -> bool {
        self.bits & fact.bit() != 0
    }

    /// Returns whether no recognized fact bit was set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns the data-flow direction of the change.
    #[must_use]
    pub const fn direction(self) -> Direction {
        self.direction
    }

    /// Iterates the facts in the set, in table order.
    pub fn iter(self) -> impl Iterator<Item = Fact> {
        FACT_TABLE
            .iter()
            .filter(move |(bit, _)| self.bits & bit != 0)
            .map(|&(_, fact)| fact)
    }

    /// Whether the attribute's value was set directly.
    ///
    /// Gates point reads and transform resolution.
    #[must_use]
    pub const fn value_set(self) -> bool {
        self.contains(Fact::ValueSet)
    }

    /// Whether this is an incoming evaluation (data pulled into the node).
    ///
    /// Gates topology-output enumeration and point reads.
    #[must_use]
    pub const fn incoming_eval(self) -> bool {
        self.contains(Fact::Eval) && matches!(self.direction, Direction::Incoming)
    }
}

impl fmt::Debug for DecodedFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for fact in self.iter() {
            set.entry(&fact.name());
        }
        set.entry(&match self.direction {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        });
        set.finish()
    }
}

// ---------------------------------------------------------------------------
// Attribute classification
// ---------------------------------------------------------------------------

/// The value shape of an attribute, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrValueKind {
    /// A 3-component float value (e.g. a mesh vertex position).
    Float3,
    /// Any other value shape.
    Other,
}

/// A reference to a host attribute, as carried by a change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrRef {
    /// The attribute's name (channel name for compounds, e.g. `translateX`).
    pub name: String,
    /// The attribute's value shape.
    pub value_kind: AttrValueKind,
    /// Logical element index for array attributes (e.g. vertex number).
    pub logical_index: Option<u32>,
}

impl AttrRef {
    /// Convenience constructor for a scalar attribute.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_kind: AttrValueKind::Other,
            logical_index: None,
        }
    }
}

/// Which transform channel an attribute name belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformChannel {
    /// `translate`, `translateX/Y/Z`.
    Translate,
    /// `scale`, `scaleX/Y/Z`.
    Scale,
    /// `rotate`, `rotateX/Y/Z`.
    Rotate,
}

/// The interest category an attribute falls into, deciding what resolution
/// (if any) the dispatcher performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrInterest {
    /// A 3-float point attribute; resolved with a mesh point read.
    PointData,
    /// A transform channel; resolved with a hierarchy walk.
    TransformChannel(TransformChannel),
    /// A derived-mesh output; resolved with a vertex enumeration.
    TopologyOutput,
    /// None of the above; only the generic fact summary is reported.
    None,
}

/// Attribute names that carry derived (computed) mesh geometry.
const DERIVED_MESH_OUTPUTS: &[&str] = &["outMesh"];

/// Classifies an attribute into its interest category.
///
/// Point data is recognized by value shape; transform channels and topology
/// outputs by name membership (substring match, so `translateX` and
/// `translate` both land in [`TransformChannel::Translate`]).
#[must_use]
pub fn classify(attr: &AttrRef) -> AttrInterest {
    if attr.value_kind == AttrValueKind::Float3 {
        return AttrInterest::PointData;
    }
    if attr.name.contains("translate") {
        return AttrInterest::TransformChannel(TransformChannel::Translate);
    }
    if attr.name.contains("scale") {
        return AttrInterest::TransformChannel(TransformChannel::Scale);
    }
    if attr.name.contains("rotate") {
        return AttrInterest::TransformChannel(TransformChannel::Rotate);
    }
    if DERIVED_MESH_OUTPUTS.iter().any(|out| attr.name.contains(out)) {
        return AttrInterest::TopologyOutput;
    }
    AttrInterest::None
}

/// A change notification as delivered by the host, before decoding.
///
/// Transient: constructed per notification, consumed synchronously by the
/// dispatcher, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The node the change occurred on.
    pub node: NodeHandle,
    /// The raw capability bitmask.
    pub mask: ChangeMask,
    /// The affected attribute, when the host identifies one.
    pub attr: Option<AttrRef>,
    /// The attribute on the other side of a connection, for connection
    /// changes.
    pub peer: Option<AttrRef>,
}
