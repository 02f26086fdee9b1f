// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity types.
//!
//! [`NodeHandle`] is a lightweight handle identifying a node in the host
//! scene graph. Hosts assign these; core treats them as opaque and never
//! dereferences them except through
//! [`SceneBoundary`](crate::boundary::SceneBoundary) queries, so a handle
//! may go stale at any time without invalidating core state.

use core::fmt;

/// An opaque reference to a node in the external scene graph.
///
/// The host assigns handle values and may reuse or invalidate them as nodes
/// are created and destroyed. Core code passes handles through without
/// interpreting the value and tolerates stale ones (boundary queries on a
/// stale handle fail with
/// [`BoundaryError::StaleHandle`](crate::boundary::BoundaryError::StaleHandle)).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeHandle(pub u64);

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({})", self.0)
    }
}

/// The closed set of node type tags the engine distinguishes.
///
/// Hosts report one tag per node. Anything outside the known set maps to
/// [`Other`](Self::Other); the engine still reports events for such nodes,
/// it just never attempts transform or mesh resolution on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    /// A hierarchical transform node.
    Transform,
    /// A polygonal mesh node.
    Mesh,
    /// A material / shading node.
    Material,
    /// A light source.
    Light,
    /// A skeleton joint.
    Joint,
    /// Any node type outside the known set.
    Other,
}

impl NodeTag {
    /// Returns a short lowercase label for log and report output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::Light => "light",
            Self::Joint => "joint",
            Self::Other => "other",
        }
    }
}

/// Whether a handle could still be resolved by the boundary when a record
/// was produced.
///
/// Events can outlive the nodes they reference (a removal notification
/// arrives after the node is gone). Records carry this status instead of
/// failing, so reporters can render what is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleStatus {
    /// The boundary resolved the handle; cached metadata is current.
    Live,
    /// The boundary no longer resolves the handle; metadata may be empty.
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_debug_format() {
        assert_eq!(format!("{:?}", NodeHandle(42)), "NodeHandle(42)");
    }

    #[test]
    fn tag_labels_are_lowercase() {
        for tag in [
            NodeTag::Transform,
            NodeTag::Mesh,
            NodeTag::Material,
            NodeTag::Light,
            NodeTag::Joint,
            NodeTag::Other,
        ] {
            let label = tag.as_str();
            assert!(
                label.chars().all(|c| c.is_ascii_lowercase()),
                "label {label:?} should be lowercase"
            );
        }
    }
}
