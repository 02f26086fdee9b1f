// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchy walking and transform resolution.
//!
//! [`resolve`] obtains the ancestor chain of a node and returns a
//! [`TransformWalk`]: a lazy, finite, non-restartable iterator yielding one
//! [`TransformSnapshot`] per level, from the changed node up to the scene
//! root. Every `next()` re-queries live graph state, so the snapshots
//! reflect the graph at iteration time, never a cache.
//!
//! The chain is validated up front: a repeated handle or a chain longer
//! than [`MAX_WALK_DEPTH`] is a [`MalformedPath`]. A node the boundary can
//! no longer place in the hierarchy is not an error — it resolves to an
//! empty walk and dispatch continues.

use tracing::debug;

use crate::boundary::{BoundaryError, SceneBoundary};
use crate::node::NodeHandle;
use crate::transform::{TransformSnapshot, Trs};

/// Defensive bound on ancestor-chain length.
///
/// Real scene hierarchies stay far below this; a chain that reaches it is
/// treated as malformed rather than walked further.
pub const MAX_WALK_DEPTH: usize = 256;

/// The ancestor chain cannot be walked.
#[derive(Debug, thiserror::Error)]
pub enum MalformedPath {
    /// The same handle appeared twice in the chain.
    #[error("cycle in ancestor chain at {node:?}")]
    Cycle {
        /// The first handle seen twice.
        node: NodeHandle,
    },
    /// The chain exceeded [`MAX_WALK_DEPTH`] entries.
    #[error("ancestor chain exceeds maximum depth {max}")]
    TooDeep {
        /// The bound that was exceeded.
        max: usize,
    },
}

/// Validates a boundary-provided ancestor chain.
///
/// Chains are short, so the duplicate scan is quadratic without mattering;
/// it finds a cycle within the first repetition, well inside twice the true
/// depth of the cyclic portion.
fn validate_chain(chain: &[NodeHandle]) -> Result<(), MalformedPath> {
    if chain.len() > MAX_WALK_DEPTH {
        return Err(MalformedPath::TooDeep {
            max: MAX_WALK_DEPTH,
        });
    }
    for (i, node) in chain.iter().enumerate() {
        if chain[..i].contains(node) {
            return Err(MalformedPath::Cycle { node: *node });
        }
    }
    Ok(())
}

/// Resolves the transform chain of `node`.
///
/// Returns an empty walk when the boundary cannot place the node in the
/// hierarchy (detached or stale — dispatch proceeds with reduced output),
/// and [`MalformedPath`] when the chain itself is unwalkable.
pub fn resolve<B: SceneBoundary + ?Sized>(
    boundary: &B,
    node: NodeHandle,
) -> Result<TransformWalk<'_, B>, MalformedPath> {
    let chain = match boundary.ancestor_path(node) {
        Ok(chain) => chain,
        Err(BoundaryError::Detached(_) | BoundaryError::StaleHandle(_)) => {
            debug!(?node, "node not in hierarchy, empty walk");
            Vec::new()
        }
        Err(err) => {
            debug!(?node, %err, "ancestor path unavailable, empty walk");
            Vec::new()
        }
    };
    validate_chain(&chain)?;
    Ok(TransformWalk {
        boundary,
        chain,
        next: 0,
    })
}

/// A lazy iterator over resolved transform snapshots, leaf to root.
///
/// Created by [`resolve`]. Finite (bounded by the validated chain length)
/// and non-restartable: each level's local and world transforms are read
/// from the boundary when the level is reached. A level whose queries fail
/// mid-walk (the graph mutated underneath us) is skipped, not fatal.
#[derive(Debug)]
pub struct TransformWalk<'a, B: ?Sized> {
    boundary: &'a B,
    chain: Vec<NodeHandle>,
    next: usize,
}

impl<B: ?Sized> TransformWalk<'_, B> {
    /// Returns the number of levels in the validated chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}

impl<B: SceneBoundary + ?Sized> TransformWalk<'_, B> {
    fn snapshot_at(&self, level: usize) -> Result<TransformSnapshot, BoundaryError> {
        let node = self.chain[level];
        let local = self.boundary.local_transform(node)?;
        let world = self.boundary.world_matrix(node)?;
        let name = self.boundary.display_name(node).unwrap_or_default();
        Ok(TransformSnapshot {
            node,
            name,
            local: Trs::from_local(&local),
            world: Trs::from_matrix(&world),
        })
    }
}

impl<B: SceneBoundary + ?Sized> Iterator for TransformWalk<'_, B> {
    type Item = TransformSnapshot;

    fn next(&mut self) -> Option<TransformSnapshot> {
        while self.next < self.chain.len() {
            let level = self.next;
            self.next += 1;
            match self.snapshot_at(level) {
                Ok(snapshot) => return Some(snapshot),
                Err(err) => {
                    // Stale level: skip it, keep walking toward the root.
                    debug!(node = ?self.chain[level], %err, "skipping unresolvable level");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_is_valid() {
        assert!(validate_chain(&[]).is_ok());
    }

    #[test]
    fn linear_chain_is_valid() {
        let chain: Vec<NodeHandle> = (0..50_u64).map(NodeHandle).collect();
        assert!(validate_chain(&chain).is_ok());
    }

    #[test]
    fn repeated_handle_is_a_cycle() {
        let chain = vec![NodeHandle(1), NodeHandle(2), NodeHandle(1)];
        match validate_chain(&chain) {
            Err(MalformedPath::Cycle { node }) => assert_eq!(node, NodeHandle(1)),
            other => panic!("expected Cycle, got {other:?}"),
        }
    }

    #[test]
    fn over_deep_chain_is_rejected() {
        let chain: Vec<NodeHandle> = (0..=MAX_WALK_DEPTH as u64).map(NodeHandle).collect();
        assert!(matches!(
            validate_chain(&chain),
            Err(MalformedPath::TooDeep { .. })
        ));
    }

    #[test]
    fn cycle_found_within_bounded_steps() {
        // A two-node cycle padded to the depth bound: the duplicate is
        // found at index 2, long before the scan reaches the bound.
        let mut chain = Vec::new();
        for i in 0..MAX_WALK_DEPTH as u64 {
            chain.push(NodeHandle(i % 2));
        }
        assert!(matches!(
            validate_chain(&chain),
            Err(MalformedPath::Cycle { .. })
        ));
    }
}
