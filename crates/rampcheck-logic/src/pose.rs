//! Rigid-body pose values: 3D translation plus unit-quaternion rotation.
//!
//! A [`Pose`] is the one geometric currency exchanged with the host layer.
//! Tracking hands the core world poses; the core hands back anchor poses
//! for slot centers and suggestions. Internally it wraps
//! [`nalgebra::Isometry3`], so composition and inversion are exact
//! rigid-body operations rather than hand-rolled matrix math.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A rigid-body transform in world or ramp-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose(Isometry3<f32>);

impl Pose {
    /// Origin with no rotation.
    pub fn identity() -> Self {
        Self(Isometry3::identity())
    }

    /// Pose from a translation only (identity rotation).
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self(Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::identity(),
        ))
    }

    /// Pose from a translation and a rotation.
    pub fn from_parts(translation: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self(Isometry3::from_parts(translation.into(), rotation))
    }

    /// Pose from raw components as trackers report them: translation plus
    /// quaternion `(x, y, z, w)`. The quaternion is renormalized, so a
    /// slightly drifted sensor value is still a valid rotation.
    pub fn from_raw(tx: f32, ty: f32, tz: f32, qx: f32, qy: f32, qz: f32, qw: f32) -> Self {
        let rotation = UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(qw, qx, qy, qz));
        Self(Isometry3::from_parts(Translation3::new(tx, ty, tz), rotation))
    }

    /// This pose followed by `other` (`self * other`).
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose(self.0 * other.0)
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Pose {
        Pose(self.0.inverse())
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.0.translation.vector
    }

    pub fn rotation(&self) -> UnitQuaternion<f32> {
        self.0.rotation
    }

    /// Map a point from this pose's local space into the parent space.
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.0.transform_point(point)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
