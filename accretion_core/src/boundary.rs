// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for scene-graph integrations.
//!
//! Accretion splits host-specific work into *boundary* implementations. A
//! host integration provides the following pieces:
//!
//! - **Event delivery** — The host invokes
//!   [`ChangeDispatcher::dispatch`](crate::dispatch::ChangeDispatcher::dispatch)
//!   synchronously from its own event loop, one
//!   [`HostEvent`](crate::dispatch::HostEvent) per notification, in
//!   emission order. The engine never spawns threads and never blocks.
//!
//! - **Subscriptions** — [`SceneBoundary::subscribe`] and
//!   [`SceneBoundary::unsubscribe_all`] map to whatever callback machinery
//!   the host exposes. The returned [`CallbackId`] is opaque to core; the
//!   [`CallbackRegistry`](crate::registry::CallbackRegistry) only stores
//!   and later returns it.
//!
//! - **Graph queries** — Read-only lookups the engine performs while
//!   resolving a change: display names, type tags, local and accumulated
//!   world transforms, ancestor paths, and mesh point data. Every query is
//!   fallible; a handle can go stale between the notification and the
//!   query, and the engine recovers from that locally.
//!
//! # Crate boundaries
//!
//! `accretion_core` owns the data model, event filtering, transform
//! resolution, and this contract module. Host crates depend on
//! `accretion_core` and provide the glue; application code wires a boundary,
//! a dispatcher, and a [`Reporter`](crate::report::Reporter) together at
//! plugin startup.

use glam::{DMat4, DVec3};

use crate::node::{NodeHandle, NodeTag};
use crate::transform::LocalTransform;

/// An opaque identifier for one registered host callback.
///
/// Hosts assign these on [`SceneBoundary::subscribe`]; core stores them in
/// the active set and hands them back verbatim on teardown.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(pub u64);

impl core::fmt::Debug for CallbackId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CallbackId({})", self.0)
    }
}

/// The kinds of change notification the engine subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A node was created anywhere in the graph.
    NodeAdded,
    /// A node was removed from the graph.
    NodeRemoved,
    /// A node's display name changed.
    NameChanged,
    /// An attribute on a node changed (value, connection, lock state, ...).
    AttributeChanged,
    /// Mesh topology was rebuilt.
    TopologyChanged,
    /// The host's periodic timer fired.
    Timer,
}

impl EventKind {
    /// Returns a short label for log and report output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NodeAdded => "node-added",
            Self::NodeRemoved => "node-removed",
            Self::NameChanged => "name-changed",
            Self::AttributeChanged => "attribute-changed",
            Self::TopologyChanged => "topology-changed",
            Self::Timer => "timer",
        }
    }
}

/// What a subscription is scoped to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubscriptionScope {
    /// The whole graph: fires for any node.
    Graph,
    /// A single node: fires only for changes on that node.
    Node(NodeHandle),
    /// A periodic timer with the given interval in seconds.
    Every(f64),
}

/// Errors surfaced by a host boundary.
///
/// None of these are fatal to the engine: registration failures reduce
/// coverage, and query failures reduce a single report. The dispatcher
/// absorbs every variant at the point of detection.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// The host refused a subscription request.
    #[error("registration refused by host: {0}")]
    RegistrationRefused(String),
    /// The handle no longer resolves to a live node.
    #[error("stale handle: {0:?}")]
    StaleHandle(NodeHandle),
    /// The node exists but is not attached to the scene hierarchy.
    #[error("node detached from hierarchy: {0:?}")]
    Detached(NodeHandle),
    /// The query does not apply to this node (e.g. mesh points on a light).
    #[error("unsupported query: {0}")]
    Unsupported(&'static str),
}

/// Read and subscription access to the external scene graph.
///
/// Both real host integrations and in-memory test scenes implement this
/// trait, enabling generic dispatch loops and test doubles. All methods are
/// expected to return promptly; the engine calls them synchronously from
/// inside event handlers.
pub trait SceneBoundary {
    /// Requests a callback registration from the host.
    ///
    /// Returns the host-assigned [`CallbackId`] on success. Callers should
    /// go through [`CallbackRegistry::register`](crate::registry::CallbackRegistry::register),
    /// which converts failures into tracked
    /// [`Subscription`](crate::registry::Subscription) outcomes instead of
    /// propagating them.
    fn subscribe(
        &mut self,
        kind: EventKind,
        scope: SubscriptionScope,
    ) -> Result<CallbackId, BoundaryError>;

    /// Removes every callback in `ids` in one request.
    ///
    /// A refusal is reported to the caller but must leave the host in a
    /// usable state; the registry clears its active set regardless.
    fn unsubscribe_all(&mut self, ids: &[CallbackId]) -> Result<(), BoundaryError>;

    /// Returns the type tag of a node.
    fn node_tag(&self, node: NodeHandle) -> Result<NodeTag, BoundaryError>;

    /// Returns the current display name of a node.
    fn display_name(&self, node: NodeHandle) -> Result<String, BoundaryError>;

    /// Returns the node's transform relative to its parent, with rotation
    /// as Euler angles in the host's native radians.
    fn local_transform(&self, node: NodeHandle) -> Result<LocalTransform, BoundaryError>;

    /// Returns the node's accumulated world matrix (the composition of all
    /// ancestor local transforms, root-most applied last).
    fn world_matrix(&self, node: NodeHandle) -> Result<DMat4, BoundaryError>;

    /// Returns the ordered ancestor chain of a node: the node itself first,
    /// then each parent, ending at the scene root.
    ///
    /// A detached node yields [`BoundaryError::Detached`]. Hosts must bound
    /// the walk themselves if their storage permits cycles; the
    /// [`walker`](crate::walk) independently re-checks the returned chain.
    fn ancestor_path(&self, node: NodeHandle) -> Result<Vec<NodeHandle>, BoundaryError>;

    /// Reads one mesh point position by logical vertex index.
    fn mesh_point(&self, node: NodeHandle, index: u32) -> Result<DVec3, BoundaryError>;

    /// Enumerates the current vertex indices of a mesh node.
    fn mesh_vertex_indices(&self, node: NodeHandle) -> Result<Vec<u32>, BoundaryError>;
}
