// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured records and the [`Reporter`] contract.
//!
//! The dispatcher turns every handled event into one or more of the record
//! types below and hands them to a [`Reporter`]. All trait methods default
//! to no-ops, so implementations only handle the records they care about
//! (a logger, a telemetry forwarder, a test collector).
//!
//! Records own their data — they carry no live graph references and stay
//! valid after the event that produced them.

use glam::DVec3;

use crate::boundary::EventKind;
use crate::facts::DecodedFacts;
use crate::node::{HandleStatus, NodeHandle, NodeTag};
use crate::transform::TransformSnapshot;

/// A node was added to or removed from the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeEvent {
    /// [`EventKind::NodeAdded`] or [`EventKind::NodeRemoved`].
    pub kind: EventKind,
    /// The node's type tag ([`NodeTag::Other`] when unresolvable).
    pub tag: NodeTag,
    /// The node's display name at event time (empty when unresolvable).
    pub name: String,
    /// Whether the handle still resolved when the record was built.
    pub status: HandleStatus,
}

/// A node's display name changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameEvent {
    /// The renamed node.
    pub node: NodeHandle,
    /// The name before the change.
    pub old_name: String,
    /// The name after the change.
    pub new_name: String,
}

/// Generic fact summary for an attribute change.
///
/// Emitted for *every* attribute change, including those that trigger no
/// transform, point, or topology resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeFacts {
    /// Type tag of the node the attribute lives on.
    pub tag: NodeTag,
    /// The attribute's name (empty when the host did not identify one).
    pub attr_name: String,
    /// The decoded fact set.
    pub facts: DecodedFacts,
}

/// A point-data attribute's current value.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSnapshot {
    /// The attribute's name.
    pub attr_name: String,
    /// The point position read from the mesh.
    pub position: DVec3,
}

/// Current vertex indices of a mesh, after a topology-relevant change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologySnapshot {
    /// The attribute name that triggered the enumeration, or the node's
    /// display name for structural topology events.
    pub source: String,
    /// The mesh's vertex indices at enumeration time.
    pub vertex_indices: Vec<u32>,
}

/// The host's periodic timer fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerTick {
    /// Seconds elapsed since the previous tick (host-reported).
    pub elapsed: f64,
}

/// Receives structured records from the dispatcher.
///
/// All methods have default no-op implementations, so you only need to
/// implement the records you consume.
pub trait Reporter {
    /// A node was added or removed.
    fn on_node_event(&mut self, e: &NodeEvent) {
        let _ = e;
    }

    /// A node was renamed.
    fn on_rename(&mut self, e: &RenameEvent) {
        let _ = e;
    }

    /// The generic fact summary for an attribute change.
    fn on_attribute_facts(&mut self, e: &AttributeFacts) {
        let _ = e;
    }

    /// One resolved transform level (called once per ancestor level).
    fn on_transform(&mut self, s: &TransformSnapshot) {
        let _ = s;
    }

    /// A point-data value was read.
    fn on_point(&mut self, s: &PointSnapshot) {
        let _ = s;
    }

    /// Mesh vertex indices were enumerated.
    fn on_topology(&mut self, s: &TopologySnapshot) {
        let _ = s;
    }

    /// The periodic timer fired.
    fn on_timer(&mut self, t: &TimerTick) {
        let _ = t;
    }
}
