// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event routing.
//!
//! [`ChangeDispatcher`] is the control-flow hub: the host delivers one
//! [`HostEvent`] at a time, synchronously and in emission order, and the
//! dispatcher routes it to the matching handler. Attribute changes are
//! decoded through [`facts`](crate::facts); transform-relevant ones invoke
//! the [`walker`](crate::walk) and report one snapshot per ancestor level.
//!
//! There is no persisted dispatch state — each event is independent. The
//! only mutable state the dispatcher owns is its
//! [`CallbackRegistry`](crate::registry::CallbackRegistry), written during
//! install, dynamic sub-registration, and shutdown.
//!
//! # Error policy
//!
//! Nothing a handler does may abort the host's event loop. Every boundary
//! failure is absorbed where it is detected: the affected resolution step
//! is skipped, the remaining reporting still happens, and a `tracing`
//! diagnostic records what was lost.

use tracing::{debug, warn};

use crate::boundary::{EventKind, SceneBoundary, SubscriptionScope};
use crate::facts::{AttrInterest, ChangeEvent, DecodedFacts, classify};
use crate::node::{HandleStatus, NodeHandle, NodeTag};
use crate::registry::CallbackRegistry;
use crate::report::{
    AttributeFacts, NodeEvent, PointSnapshot, RenameEvent, Reporter, TimerTick, TopologySnapshot,
};
use crate::walk;

/// A change notification as delivered by the host's event loop.
///
/// Transient: constructed at the host boundary per notification, consumed
/// synchronously by [`ChangeDispatcher::dispatch`], never persisted.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// A node was created.
    NodeAdded {
        /// The new node.
        node: NodeHandle,
    },
    /// A node was removed.
    NodeRemoved {
        /// The removed node (its handle may already be stale).
        node: NodeHandle,
    },
    /// A node's display name changed.
    NameChanged {
        /// The renamed node.
        node: NodeHandle,
        /// The name before the change.
        old_name: String,
    },
    /// An attribute changed; see [`ChangeEvent`].
    AttributeChanged(ChangeEvent),
    /// Mesh topology was rebuilt.
    TopologyChanged {
        /// The mesh node.
        node: NodeHandle,
    },
    /// The host's periodic timer fired.
    Timer {
        /// Seconds elapsed since the previous tick.
        elapsed: f64,
    },
}

/// Engine configuration, set once at install time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchConfig {
    /// Interval in seconds requested for the periodic timer subscription.
    pub timer_interval: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            timer_interval: 5.0,
        }
    }
}

/// Routes host events to handlers and owns the callback lifecycle.
#[derive(Debug)]
pub struct ChangeDispatcher {
    registry: CallbackRegistry,
    config: WatchConfig,
}

impl ChangeDispatcher {
    /// Installs the engine: registers the graph-wide node-added and
    /// node-removed subscriptions plus the periodic timer.
    ///
    /// Individual registration failures are tracked and logged, never
    /// fatal — the engine runs with whatever coverage it obtained.
    pub fn install<B: SceneBoundary + ?Sized>(boundary: &mut B, config: WatchConfig) -> Self {
        let mut registry = CallbackRegistry::new();
        registry.register(boundary, EventKind::NodeAdded, SubscriptionScope::Graph);
        registry.register(boundary, EventKind::NodeRemoved, SubscriptionScope::Graph);
        registry.register(
            boundary,
            EventKind::Timer,
            SubscriptionScope::Every(config.timer_interval),
        );
        Self { registry, config }
    }

    /// Returns the registry for bookkeeping queries.
    #[must_use]
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> WatchConfig {
        self.config
    }

    /// Tears down every active subscription. Idempotent.
    pub fn shutdown<B: SceneBoundary + ?Sized>(&mut self, boundary: &mut B) {
        self.registry.teardown_all(boundary);
    }

    /// Handles one host event.
    ///
    /// Runs to completion synchronously on the delivering thread; never
    /// blocks, never panics on stale handles, never returns an error.
    pub fn dispatch<B, R>(&mut self, boundary: &mut B, reporter: &mut R, event: HostEvent)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        match event {
            HostEvent::NodeAdded { node } => self.on_node_added(boundary, reporter, node),
            HostEvent::NodeRemoved { node } => {
                Self::on_node_removed(boundary, reporter, node);
            }
            HostEvent::NameChanged { node, old_name } => {
                Self::on_name_changed(boundary, reporter, node, old_name);
            }
            HostEvent::AttributeChanged(change) => {
                Self::on_attribute_changed(boundary, reporter, &change);
            }
            HostEvent::TopologyChanged { node } => {
                Self::on_topology_changed(boundary, reporter, node);
            }
            HostEvent::Timer { elapsed } => reporter.on_timer(&TimerTick { elapsed }),
        }
    }

    fn on_node_added<B, R>(&mut self, boundary: &mut B, reporter: &mut R, node: NodeHandle)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        let (tag, name, status) = node_metadata(boundary, node);
        reporter.on_node_event(&NodeEvent {
            kind: EventKind::NodeAdded,
            tag,
            name,
            status,
        });

        // Widen coverage to the new node: rename and attribute callbacks
        // scoped to it. Their ids join the active set for bulk teardown.
        self.registry.register(
            boundary,
            EventKind::NameChanged,
            SubscriptionScope::Node(node),
        );
        self.registry.register(
            boundary,
            EventKind::AttributeChanged,
            SubscriptionScope::Node(node),
        );
    }

    fn on_node_removed<B, R>(boundary: &mut B, reporter: &mut R, node: NodeHandle)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        // Per-node subscriptions are not unregistered here; they go stale
        // with the node and are swept by bulk teardown.
        let (tag, name, status) = node_metadata(boundary, node);
        reporter.on_node_event(&NodeEvent {
            kind: EventKind::NodeRemoved,
            tag,
            name,
            status,
        });
    }

    fn on_name_changed<B, R>(boundary: &mut B, reporter: &mut R, node: NodeHandle, old_name: String)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        let new_name = boundary.display_name(node).unwrap_or_default();
        reporter.on_rename(&RenameEvent {
            node,
            old_name,
            new_name,
        });
    }

    fn on_attribute_changed<B, R>(boundary: &mut B, reporter: &mut R, change: &ChangeEvent)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        let facts = DecodedFacts::decode(change.mask);

        if let Some(attr) = &change.attr {
            match classify(attr) {
                AttrInterest::PointData if facts.value_set() || facts.incoming_eval() => {
                    Self::report_point(boundary, reporter, change, &attr.name);
                }
                AttrInterest::TransformChannel(_) if facts.value_set() => {
                    Self::report_transform_chain(boundary, reporter, change.node);
                }
                AttrInterest::TopologyOutput if facts.incoming_eval() => {
                    Self::report_topology(boundary, reporter, change.node, attr.name.clone());
                }
                _ => {}
            }
        }

        // Always emit the generic summary, even when no interest category
        // matched; observers rely on the full fact stream.
        let (tag, _, _) = node_metadata(boundary, change.node);
        let attr_name = change
            .attr
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_default();
        reporter.on_attribute_facts(&AttributeFacts {
            tag,
            attr_name,
            facts,
        });
    }

    fn report_point<B, R>(boundary: &B, reporter: &mut R, change: &ChangeEvent, attr_name: &str)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        let index = change
            .attr
            .as_ref()
            .and_then(|a| a.logical_index)
            .unwrap_or(0);
        match boundary.mesh_point(change.node, index) {
            Ok(position) => reporter.on_point(&PointSnapshot {
                attr_name: attr_name.to_owned(),
                position,
            }),
            Err(err) => {
                // Point read after removal: report nothing beyond the
                // fact summary.
                debug!(node = ?change.node, index, %err, "point read skipped");
            }
        }
    }

    fn report_transform_chain<B, R>(boundary: &B, reporter: &mut R, node: NodeHandle)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        // Only transform nodes carry a resolvable hierarchy; channel-named
        // attributes on other node types get the fact summary only.
        if !matches!(boundary.node_tag(node), Ok(NodeTag::Transform)) {
            return;
        }
        match walk::resolve(boundary, node) {
            Ok(levels) => {
                for snapshot in levels {
                    reporter.on_transform(&snapshot);
                }
            }
            Err(err) => warn!(?node, %err, "transform resolution abandoned"),
        }
    }

    fn report_topology<B, R>(boundary: &B, reporter: &mut R, node: NodeHandle, source: String)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        match boundary.mesh_vertex_indices(node) {
            Ok(vertex_indices) => reporter.on_topology(&TopologySnapshot {
                source,
                vertex_indices,
            }),
            Err(err) => debug!(?node, %err, "vertex enumeration skipped"),
        }
    }

    fn on_topology_changed<B, R>(boundary: &mut B, reporter: &mut R, node: NodeHandle)
    where
        B: SceneBoundary + ?Sized,
        R: Reporter + ?Sized,
    {
        let source = boundary.display_name(node).unwrap_or_default();
        Self::report_topology(boundary, reporter, node, source);
    }
}

/// Best-effort node metadata for record construction.
///
/// Stale handles degrade to [`NodeTag::Other`], an empty name, and
/// [`HandleStatus::Stale`]; they never fail the handler.
fn node_metadata<B: SceneBoundary + ?Sized>(
    boundary: &B,
    node: NodeHandle,
) -> (NodeTag, String, HandleStatus) {
    let tag = boundary.node_tag(node);
    let name = boundary.display_name(node);
    let status = if tag.is_ok() && name.is_ok() {
        HandleStatus::Live
    } else {
        HandleStatus::Stale
    };
    (
        tag.unwrap_or(NodeTag::Other),
        name.unwrap_or_default(),
        status,
    )
}
