// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback registration bookkeeping.
//!
//! [`CallbackRegistry`] owns the set of currently active host callbacks.
//! Registration goes through the registry so that every outcome is tracked:
//! a successful subscribe appends its [`CallbackId`] to the active set, a
//! refused one is recorded in the returned [`Subscription`] and leaves the
//! set untouched. [`CallbackRegistry::teardown_all`] removes everything in
//! one request and is idempotent.
//!
//! Invariant: the active set contains exactly the ids of successful
//! registrations, each once. Failed registrations never enter it.

use tracing::{info, warn};

use crate::boundary::{BoundaryError, CallbackId, EventKind, SceneBoundary, SubscriptionScope};

/// How a registration attempt ended.
#[derive(Clone, Debug, PartialEq)]
pub enum RegistrationOutcome {
    /// The host accepted the subscription and assigned this id.
    Registered(CallbackId),
    /// The host refused; the diagnostic explains why.
    Failed(String),
}

/// One registration attempt, immutable after creation.
///
/// Subscriptions exist for bookkeeping and diagnostics; destroying them
/// does nothing — the active set is only emptied by
/// [`CallbackRegistry::teardown_all`].
#[derive(Clone, Debug, PartialEq)]
pub struct Subscription {
    /// Which notification kind was requested.
    pub kind: EventKind,
    /// What the subscription was scoped to.
    pub scope: SubscriptionScope,
    /// How the attempt ended.
    pub outcome: RegistrationOutcome,
}

impl Subscription {
    /// Returns whether the registration succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.outcome, RegistrationOutcome::Registered(_))
    }
}

/// Owns the active callback set for one engine instance.
///
/// Created at startup, passed by reference wherever registration happens,
/// torn down once at shutdown. Written only during register/teardown and
/// read-only during dispatch; under a multi-threaded host it would need
/// exclusive-access discipline, which the single-threaded delivery model
/// makes unnecessary here.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    active: Vec<CallbackId>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a subscription from the boundary and records the outcome.
    ///
    /// Never propagates boundary failure: a refusal comes back as a
    /// [`Subscription`] with [`RegistrationOutcome::Failed`] and the active
    /// set is unchanged. The system continues with reduced coverage.
    pub fn register<B: SceneBoundary + ?Sized>(
        &mut self,
        boundary: &mut B,
        kind: EventKind,
        scope: SubscriptionScope,
    ) -> Subscription {
        let outcome = match boundary.subscribe(kind, scope) {
            Ok(id) => {
                info!(kind = kind.as_str(), ?id, "callback registered");
                self.active.push(id);
                RegistrationOutcome::Registered(id)
            }
            Err(err) => {
                warn!(kind = kind.as_str(), %err, "callback registration failed");
                RegistrationOutcome::Failed(err.to_string())
            }
        };
        Subscription {
            kind,
            scope,
            outcome,
        }
    }

    /// Returns how many callbacks are currently active.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Removes every active callback from the boundary and clears the set.
    ///
    /// The set is cleared regardless of individual removal outcomes; a
    /// refusal is logged and otherwise ignored (the handles are about to be
    /// invalid anyway at shutdown). Idempotent: a second call finds an
    /// empty set and performs no boundary request.
    pub fn teardown_all<B: SceneBoundary + ?Sized>(&mut self, boundary: &mut B) {
        if self.active.is_empty() {
            return;
        }
        if let Err(err) = boundary.unsubscribe_all(&self.active) {
            warn!(%err, count = self.active.len(), "bulk unsubscribe refused");
        }
        self.active.clear();
    }
}

/// Convenience for callers that want the refusal as an error value rather
/// than a tracked subscription (e.g. hosts validating their own wiring).
impl TryFrom<Subscription> for CallbackId {
    type Error = BoundaryError;

    fn try_from(sub: Subscription) -> Result<Self, Self::Error> {
        match sub.outcome {
            RegistrationOutcome::Registered(id) => Ok(id),
            RegistrationOutcome::Failed(reason) => {
                Err(BoundaryError::RegistrationRefused(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A boundary stub that accepts or refuses subscriptions from a script.
    #[derive(Default)]
    struct ScriptedBoundary {
        refusals: Vec<bool>,
        next_id: u64,
        unsubscribed: Vec<Vec<CallbackId>>,
        refuse_unsubscribe: bool,
    }

    impl SceneBoundary for ScriptedBoundary {
        fn subscribe(
            &mut self,
            _kind: EventKind,
            _scope: SubscriptionScope,
        ) -> Result<CallbackId, BoundaryError> {
            let refuse = self.refusals.pop().unwrap_or(false);
            if refuse {
                return Err(BoundaryError::RegistrationRefused("scripted".into()));
            }
            self.next_id += 1;
            Ok(CallbackId(self.next_id))
        }

        fn unsubscribe_all(&mut self, ids: &[CallbackId]) -> Result<(), BoundaryError> {
            self.unsubscribed.push(ids.to_vec());
            if self.refuse_unsubscribe {
                return Err(BoundaryError::Unsupported("scripted refusal"));
            }
            Ok(())
        }

        fn node_tag(
            &self,
            node: crate::node::NodeHandle,
        ) -> Result<crate::node::NodeTag, BoundaryError> {
            Err(BoundaryError::StaleHandle(node))
        }

        fn display_name(&self, node: crate::node::NodeHandle) -> Result<String, BoundaryError> {
            Err(BoundaryError::StaleHandle(node))
        }

        fn local_transform(
            &self,
            node: crate::node::NodeHandle,
        ) -> Result<crate::transform::LocalTransform, BoundaryError> {
            Err(BoundaryError::StaleHandle(node))
        }

        fn world_matrix(
            &self,
            node: crate::node::NodeHandle,
        ) -> Result<glam::DMat4, BoundaryError> {
            Err(BoundaryError::StaleHandle(node))
        }

        fn ancestor_path(
            &self,
            node: crate::node::NodeHandle,
        ) -> Result<Vec<crate::node::NodeHandle>, BoundaryError> {
            Err(BoundaryError::StaleHandle(node))
        }

        fn mesh_point(
            &self,
            node: crate::node::NodeHandle,
            _index: u32,
        ) -> Result<glam::DVec3, BoundaryError> {
            Err(BoundaryError::StaleHandle(node))
        }

        fn mesh_vertex_indices(
            &self,
            node: crate::node::NodeHandle,
        ) -> Result<Vec<u32>, BoundaryError> {
            Err(BoundaryError::StaleHandle(node))
        }
    }

    #[test]
    fn successful_registration_grows_active_set() {
        let mut boundary = ScriptedBoundary::default();
        let mut registry = CallbackRegistry::new();

        let sub = registry.register(&mut boundary, EventKind::NodeAdded, SubscriptionScope::Graph);
        assert!(sub.succeeded());
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn failed_registration_leaves_active_set_unchanged() {
        let mut boundary = ScriptedBoundary {
            refusals: vec![true],
            ..Default::default()
        };
        let mut registry = CallbackRegistry::new();

        let sub = registry.register(&mut boundary, EventKind::NodeAdded, SubscriptionScope::Graph);
        assert!(!sub.succeeded());
        assert_eq!(registry.active_count(), 0);
        match sub.outcome {
            RegistrationOutcome::Failed(reason) => {
                assert!(reason.contains("scripted"), "unexpected reason {reason:?}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn active_count_equals_successes() {
        // Mixed success/failure sequence; pops from the back.
        let mut boundary = ScriptedBoundary {
            refusals: vec![false, true, false, true, false],
            ..Default::default()
        };
        let mut registry = CallbackRegistry::new();
        for _ in 0..5 {
            registry.register(&mut boundary, EventKind::Timer, SubscriptionScope::Every(5.0));
        }
        assert_eq!(registry.active_count(), 3);
    }

    #[test]
    fn teardown_clears_and_is_idempotent() {
        let mut boundary = ScriptedBoundary::default();
        let mut registry = CallbackRegistry::new();
        registry.register(&mut boundary, EventKind::NodeAdded, SubscriptionScope::Graph);
        registry.register(&mut boundary, EventKind::NodeRemoved, SubscriptionScope::Graph);

        registry.teardown_all(&mut boundary);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(boundary.unsubscribed.len(), 1);
        assert_eq!(boundary.unsubscribed[0].len(), 2);

        // Second teardown performs no boundary request.
        registry.teardown_all(&mut boundary);
        assert_eq!(boundary.unsubscribed.len(), 1);
    }

    #[test]
    fn teardown_refusal_still_clears() {
        let mut boundary = ScriptedBoundary {
            refuse_unsubscribe: true,
            ..Default::default()
        };
        let mut registry = CallbackRegistry::new();
        registry.register(&mut boundary, EventKind::NodeAdded, SubscriptionScope::Graph);

        registry.teardown_all(&mut boundary);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn subscription_converts_to_callback_id() {
        let mut boundary = ScriptedBoundary::default();
        let mut registry = CallbackRegistry::new();
        let sub = registry.register(&mut boundary, EventKind::NodeAdded, SubscriptionScope::Graph);
        let id = CallbackId::try_from(sub);
        assert!(id.is_ok(), "successful subscription should yield an id");
    }
}
