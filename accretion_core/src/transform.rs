// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform value types and TRS compose/decompose.
//!
//! The boundary reports local transforms with rotation in the host's native
//! radians ([`LocalTransform`]); records carry degrees ([`Trs`]), matching
//! what artists see in channel editors. World-space values come from
//! decomposing the node's accumulated world matrix, which agrees with
//! multiplying the local chain root-to-leaf within floating-point
//! tolerance.
//!
//! All math is `f64` via glam's `D*` types. Euler order is XYZ throughout.

use glam::{DMat4, DQuat, DVec3, EulerRot};

use crate::node::NodeHandle;

/// A node's transform relative to its immediate parent, as the host
/// reports it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    /// Translation along the parent axes.
    pub translate: DVec3,
    /// Per-axis scale factors.
    pub scale: DVec3,
    /// Euler rotation (XYZ order) in radians.
    pub rotate_rad: DVec3,
}

impl LocalTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translate: DVec3::ZERO,
        scale: DVec3::ONE,
        rotate_rad: DVec3::ZERO,
    };

    /// A pure translation.
    #[must_use]
    pub const fn from_translation(translate: DVec3) -> Self {
        Self {
            translate,
            scale: DVec3::ONE,
            rotate_rad: DVec3::ZERO,
        }
    }

    /// Composes this transform into a 4×4 column-major matrix
    /// (scale, then rotation, then translation).
    #[must_use]
    pub fn to_matrix(&self) -> DMat4 {
        let rotation = DQuat::from_euler(
            EulerRot::XYZ,
            self.rotate_rad.x,
            self.rotate_rad.y,
            self.rotate_rad.z,
        );
        DMat4::from_scale_rotation_translation(self.scale, rotation, self.translate)
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A translate/scale/rotate triple as carried by reports, with rotation in
/// Euler degrees (XYZ order).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    /// Translation.
    pub translate: DVec3,
    /// Per-axis scale factors.
    pub scale: DVec3,
    /// Euler rotation (XYZ order) in degrees.
    pub rotate_deg: DVec3,
}

impl Trs {
    /// The identity triple.
    pub const IDENTITY: Self = Self {
        translate: DVec3::ZERO,
        scale: DVec3::ONE,
        rotate_deg: DVec3::ZERO,
    };

    /// Converts a host-native local transform, turning radians into degrees.
    #[must_use]
    pub fn from_local(local: &LocalTransform) -> Self {
        Self {
            translate: local.translate,
            scale: local.scale,
            rotate_deg: DVec3::new(
                local.rotate_rad.x.to_degrees(),
                local.rotate_rad.y.to_degrees(),
                local.rotate_rad.z.to_degrees(),
            ),
        }
    }

    /// Decomposes an affine matrix into a TRS triple.
    ///
    /// Rotation comes out as XYZ Euler degrees. Matrices with shear or zero
    /// scale decompose on a best-effort basis, same as the underlying glam
    /// decomposition.
    #[must_use]
    pub fn from_matrix(matrix: &DMat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        let (rx, ry, rz) = rotation.to_euler(EulerRot::XYZ);
        Self {
            translate: translation,
            scale,
            rotate_deg: DVec3::new(rx.to_degrees(), ry.to_degrees(), rz.to_degrees()),
        }
    }
}

/// The resolved transform of one node at one ancestor level, produced fresh
/// on each relevant attribute change and never cached across events.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSnapshot {
    /// The node this level describes.
    pub node: NodeHandle,
    /// The node's display name at resolution time (empty if unresolvable).
    pub name: String,
    /// Transform relative to the immediate parent.
    pub local: Trs,
    /// Transform relative to the scene root.
    pub world: Trs,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn identity_round_trip() {
        let trs = Trs::from_matrix(&LocalTransform::IDENTITY.to_matrix());
        assert!(approx(trs.translate, DVec3::ZERO));
        assert!(approx(trs.scale, DVec3::ONE));
        assert!(approx(trs.rotate_deg, DVec3::ZERO));
    }

    #[test]
    fn translation_round_trip() {
        let local = LocalTransform::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let trs = Trs::from_matrix(&local.to_matrix());
        assert!(approx(trs.translate, DVec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn radians_convert_to_degrees() {
        let local = LocalTransform {
            rotate_rad: DVec3::new(core::f64::consts::FRAC_PI_2, 0.0, 0.0),
            ..LocalTransform::IDENTITY
        };
        let trs = Trs::from_local(&local);
        assert!((trs.rotate_deg.x - 90.0).abs() < EPS);
    }

    #[test]
    fn single_axis_rotation_decomposes() {
        let local = LocalTransform {
            rotate_rad: DVec3::new(0.0, 0.0, core::f64::consts::FRAC_PI_2),
            ..LocalTransform::IDENTITY
        };
        let trs = Trs::from_matrix(&local.to_matrix());
        assert!((trs.rotate_deg.z - 90.0).abs() < 1e-6);
        assert!(trs.rotate_deg.x.abs() < 1e-6);
        assert!(trs.rotate_deg.y.abs() < 1e-6);
    }

    #[test]
    fn scale_decomposes() {
        let local = LocalTransform {
            scale: DVec3::new(2.0, 3.0, 4.0),
            ..LocalTransform::IDENTITY
        };
        let trs = Trs::from_matrix(&local.to_matrix());
        assert!(approx(trs.scale, DVec3::new(2.0, 3.0, 4.0)));
    }

    #[test]
    fn chain_composition_sums_translations() {
        // Composing (1,0,0), (0,1,0), (0,0,1) root-to-leaf with identity
        // rotations lands the leaf at (1,1,1) in world space.
        let root = LocalTransform::from_translation(DVec3::X);
        let mid = LocalTransform::from_translation(DVec3::Y);
        let leaf = LocalTransform::from_translation(DVec3::Z);
        let world = root.to_matrix() * mid.to_matrix() * leaf.to_matrix();
        let trs = Trs::from_matrix(&world);
        assert!(approx(trs.translate, DVec3::new(1.0, 1.0, 1.0)));
    }
}
