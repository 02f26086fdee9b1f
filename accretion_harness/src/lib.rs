// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory scene double and collecting reporter for integration tests.
//!
//! [`MemoryScene`] implements [`SceneBoundary`] over slot storage with
//! generation counters, so removed nodes leave stale handles behind the same
//! way a real host does. Mutators queue [`HostEvent`]s in application order;
//! tests drain the queue and feed it through a
//! [`ChangeDispatcher`](accretion_core::dispatch::ChangeDispatcher).

use glam::{DMat4, DVec3};

use accretion_core::boundary::{
    BoundaryError, CallbackId, EventKind, SceneBoundary, SubscriptionScope,
};
use accretion_core::dispatch::HostEvent;
use accretion_core::facts::{AttrRef, AttrValueKind, ChangeEvent, ChangeMask, VALUE_SET};
use accretion_core::node::{NodeHandle, NodeTag};
use accretion_core::report::{
    AttributeFacts, NodeEvent, PointSnapshot, RenameEvent, Reporter, TimerTick, TopologySnapshot,
};
use accretion_core::transform::{LocalTransform, TransformSnapshot};

const INVALID: u32 = u32::MAX;

/// Injectable host-failure toggles for stress tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailureToggles {
    /// Number of upcoming subscription requests to refuse.
    pub refuse_subscribes: u32,
    /// The next bulk unsubscribe request is refused.
    pub refuse_unsubscribe: bool,
}

/// An in-memory scene graph standing in for a real host.
///
/// Nodes occupy slots in parallel arrays. Removed nodes are recycled via a
/// free list, and generation counters ensure old handles surface as
/// [`BoundaryError::StaleHandle`] rather than aliasing the reused slot.
#[derive(Debug, Default)]
pub struct MemoryScene {
    // -- Topology and properties --
    parent: Vec<u32>,
    tag: Vec<NodeTag>,
    name: Vec<String>,
    local: Vec<LocalTransform>,
    points: Vec<Vec<DVec3>>,
    detached: Vec<bool>,

    // -- Allocation --
    alive: Vec<bool>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,

    // -- Host side of the callback contract --
    next_callback: u64,
    subscriptions: Vec<(CallbackId, EventKind, SubscriptionScope)>,
    toggles: FailureToggles,

    // -- Pending notifications --
    queue: Vec<HostEvent>,
}

impl MemoryScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(idx: u32, generation: u32) -> NodeHandle {
        NodeHandle((u64::from(generation) << 32) | u64::from(idx))
    }

    /// Resolves a handle to its slot index, rejecting stale generations.
    fn slot(&self, node: NodeHandle) -> Result<u32, BoundaryError> {
        let idx = u32::try_from(node.0 & u64::from(u32::MAX))
            .map_err(|_| BoundaryError::StaleHandle(node))?;
        let generation =
            u32::try_from(node.0 >> 32).map_err(|_| BoundaryError::StaleHandle(node))?;
        let i = idx as usize;
        if i < self.alive.len() && self.alive[i] && self.generation[i] == generation {
            Ok(idx)
        } else {
            Err(BoundaryError::StaleHandle(node))
        }
    }

    // -- Mutators (each queues the matching host notification) --

    /// Creates a node and queues a [`HostEvent::NodeAdded`].
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        tag: NodeTag,
        parent: Option<NodeHandle>,
    ) -> NodeHandle {
        let parent_idx = parent
            .and_then(|p| self.slot(p).ok())
            .unwrap_or(INVALID);

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot under a fresh generation.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = parent_idx;
            self.tag[i] = tag;
            self.name[i] = name.into();
            self.local[i] = LocalTransform::IDENTITY;
            self.points[i].clear();
            self.detached[i] = false;
            self.alive[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(parent_idx);
            self.tag.push(tag);
            self.name.push(name.into());
            self.local.push(LocalTransform::IDENTITY);
            self.points.push(Vec::new());
            self.detached.push(false);
            self.alive.push(true);
            self.generation.push(0);
            idx
        };

        let node = Self::encode(idx, self.generation[idx as usize]);
        self.queue.push(HostEvent::NodeAdded { node });
        node
    }

    /// Removes a node and queues a [`HostEvent::NodeRemoved`].
    ///
    /// The handle is stale from this point on; queries against it fail with
    /// [`BoundaryError::StaleHandle`], which is exactly the situation the
    /// engine has to degrade through.
    pub fn remove_node(&mut self, node: NodeHandle) {
        if let Ok(idx) = self.slot(node) {
            self.alive[idx as usize] = false;
            self.free_list.push(idx);
            self.queue.push(HostEvent::NodeRemoved { node });
        }
    }

    /// Renames a node and queues a [`HostEvent::NameChanged`] carrying the
    /// previous name.
    pub fn rename(&mut self, node: NodeHandle, new_name: impl Into<String>) {
        if let Ok(idx) = self.slot(node) {
            let old_name = std::mem::replace(&mut self.name[idx as usize], new_name.into());
            self.queue.push(HostEvent::NameChanged { node, old_name });
        }
    }

    /// Overwrites a node's local transform without queueing a notification.
    pub fn set_local_transform(&mut self, node: NodeHandle, local: LocalTransform) {
        if let Ok(idx) = self.slot(node) {
            self.local[idx as usize] = local;
        }
    }

    /// Sets a node's local translation and queues a value-set change on the
    /// `translate` channel.
    pub fn set_translation(&mut self, node: NodeHandle, translate: DVec3) {
        if let Ok(idx) = self.slot(node) {
            self.local[idx as usize].translate = translate;
            self.queue.push(HostEvent::AttributeChanged(ChangeEvent {
                node,
                mask: ChangeMask(VALUE_SET),
                attr: Some(AttrRef::named("translate")),
                peer: None,
            }));
        }
    }

    /// Replaces a node's mesh points without queueing a notification.
    pub fn set_mesh_points(&mut self, node: NodeHandle, points: Vec<DVec3>) {
        if let Ok(idx) = self.slot(node) {
            self.points[idx as usize] = points;
        }
    }

    /// Moves one mesh point and queues a value-set change on the
    /// three-float point attribute carrying the logical index.
    pub fn set_mesh_point(&mut self, node: NodeHandle, index: u32, position: DVec3) {
        if let Ok(idx) = self.slot(node) {
            let i = idx as usize;
            if let Some(p) = self.points[i].get_mut(index as usize) {
                *p = position;
                self.queue.push(HostEvent::AttributeChanged(ChangeEvent {
                    node,
                    mask: ChangeMask(VALUE_SET),
                    attr: Some(AttrRef {
                        name: "controlPoints".to_owned(),
                        value_kind: AttrValueKind::Float3,
                        logical_index: Some(index),
                    }),
                    peer: None,
                }));
            }
        }
    }

    /// Replaces a mesh node's points and queues a
    /// [`HostEvent::TopologyChanged`].
    pub fn rebuild_topology(&mut self, node: NodeHandle, points: Vec<DVec3>) {
        if let Ok(idx) = self.slot(node) {
            self.points[idx as usize] = points;
            self.queue.push(HostEvent::TopologyChanged { node });
        }
    }

    /// Queues an arbitrary attribute change without mutating state.
    pub fn touch_attribute(&mut self, node: NodeHandle, attr: AttrRef, mask: ChangeMask) {
        self.queue.push(HostEvent::AttributeChanged(ChangeEvent {
            node,
            mask,
            attr: Some(attr),
            peer: None,
        }));
    }

    /// Queues a timer tick.
    pub fn tick(&mut self, elapsed: f64) {
        self.queue.push(HostEvent::Timer { elapsed });
    }

    /// Raw parent write, bypassing validation. Permits building parent
    /// cycles that the walker must reject.
    pub fn force_parent(&mut self, node: NodeHandle, parent: NodeHandle) {
        if let (Ok(idx), Ok(parent_idx)) = (self.slot(node), self.slot(parent)) {
            self.parent[idx as usize] = parent_idx;
        }
    }

    /// Marks a node as detached from the hierarchy.
    pub fn detach(&mut self, node: NodeHandle) {
        if let Ok(idx) = self.slot(node) {
            self.detached[idx as usize] = true;
        }
    }

    // -- Failure injection --

    /// Refuses the next `count` subscription requests.
    pub fn fail_next_subscribes(&mut self, count: u32) {
        self.toggles.refuse_subscribes = count;
    }

    /// Refuses the next bulk unsubscribe request.
    pub fn refuse_next_unsubscribe(&mut self) {
        self.toggles.refuse_unsubscribe = true;
    }

    // -- Test observation --

    /// Takes all queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.queue)
    }

    /// Number of callbacks currently registered with the host side.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl SceneBoundary for MemoryScene {
    fn subscribe(
        &mut self,
        kind: EventKind,
        scope: SubscriptionScope,
    ) -> Result<CallbackId, BoundaryError> {
        if self.toggles.refuse_subscribes > 0 {
            self.toggles.refuse_subscribes -= 1;
            return Err(BoundaryError::RegistrationRefused(
                "injected refusal".to_owned(),
            ));
        }
        if let SubscriptionScope::Node(node) = scope {
            self.slot(node)?;
        }
        self.next_callback += 1;
        let id = CallbackId(self.next_callback);
        self.subscriptions.push((id, kind, scope));
        Ok(id)
    }

    fn unsubscribe_all(&mut self, ids: &[CallbackId]) -> Result<(), BoundaryError> {
        if self.toggles.refuse_unsubscribe {
            self.toggles.refuse_unsubscribe = false;
            return Err(BoundaryError::Unsupported("bulk unsubscribe refused"));
        }
        self.subscriptions.retain(|(id, _, _)| !ids.contains(id));
        Ok(())
    }

    fn node_tag(&self, node: NodeHandle) -> Result<NodeTag, BoundaryError> {
        let idx = self.slot(node)?;
        Ok(self.tag[idx as usize])
    }

    fn display_name(&self, node: NodeHandle) -> Result<String, BoundaryError> {
        let idx = self.slot(node)?;
        Ok(self.name[idx as usize].clone())
    }

    fn local_transform(&self, node: NodeHandle) -> Result<LocalTransform, BoundaryError> {
        let idx = self.slot(node)?;
        Ok(self.local[idx as usize])
    }

    fn world_matrix(&self, node: NodeHandle) -> Result<DMat4, BoundaryError> {
        let chain = self.ancestor_path(node)?;
        let mut world = DMat4::IDENTITY;
        for ancestor in chain.iter().rev() {
            let idx = self.slot(*ancestor)?;
            world *= self.local[idx as usize].to_matrix();
        }
        Ok(world)
    }

    fn ancestor_path(&self, node: NodeHandle) -> Result<Vec<NodeHandle>, BoundaryError> {
        let mut idx = self.slot(node)?;
        if self.detached[idx as usize] {
            return Err(BoundaryError::Detached(node));
        }

        // Bounded at the slot count; a forced parent cycle yields a
        // truncated chain the walker rejects on its own.
        let cap = self.parent.len() + 1;
        let mut chain = Vec::new();
        while chain.len() < cap {
            chain.push(Self::encode(idx, self.generation[idx as usize]));
            let parent = self.parent[idx as usize];
            if parent == INVALID || !self.alive[parent as usize] {
                break;
            }
            idx = parent;
        }
        Ok(chain)
    }

    fn mesh_point(&self, node: NodeHandle, index: u32) -> Result<DVec3, BoundaryError> {
        let idx = self.slot(node)?;
        self.points[idx as usize]
            .get(index as usize)
            .copied()
            .ok_or(BoundaryError::Unsupported("mesh point index out of range"))
    }

    fn mesh_vertex_indices(&self, node: NodeHandle) -> Result<Vec<u32>, BoundaryError> {
        let idx = self.slot(node)?;
        if self.tag[idx as usize] != NodeTag::Mesh {
            return Err(BoundaryError::Unsupported("not a mesh node"));
        }
        let count = u32::try_from(self.points[idx as usize].len())
            .map_err(|_| BoundaryError::Unsupported("vertex count overflow"))?;
        Ok((0..count).collect())
    }
}

/// Buffers every record a dispatcher emits, for assertion in tests.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    /// Node lifecycle records, in emission order.
    pub node_events: Vec<NodeEvent>,
    /// Rename records.
    pub renames: Vec<RenameEvent>,
    /// Generic attribute fact summaries.
    pub attribute_facts: Vec<AttributeFacts>,
    /// Per-level transform snapshots.
    pub transforms: Vec<TransformSnapshot>,
    /// Point position reads.
    pub points: Vec<PointSnapshot>,
    /// Vertex enumerations.
    pub topologies: Vec<TopologySnapshot>,
    /// Timer ticks.
    pub ticks: Vec<TimerTick>,
}

impl CollectingReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for CollectingReporter {
    fn on_node_event(&mut self, e: &NodeEvent) {
        self.node_events.push(e.clone());
    }

    fn on_rename(&mut self, e: &RenameEvent) {
        self.renames.push(e.clone());
    }

    fn on_attribute_facts(&mut self, e: &AttributeFacts) {
        self.attribute_facts.push(e.clone());
    }

    fn on_transform(&mut self, s: &TransformSnapshot) {
        self.transforms.push(s.clone());
    }

    fn on_point(&mut self, s: &PointSnapshot) {
        self.points.push(s.clone());
    }

    fn on_topology(&mut self, s: &TopologySnapshot) {
        self.topologies.push(s.clone());
    }

    fn on_timer(&mut self, t: &TimerTick) {
        self.ticks.push(*t);
    }
}
