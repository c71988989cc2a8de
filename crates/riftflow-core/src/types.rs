use glam::{Vec3A, Mat3A, Quat};
use serde::{Deserialize, Serialize};
use crate::{Scalar, EPS};

pub type Vec3 = Vec3A;
pub type Mat3 = Mat3A;

#[inline] pub fn vec3(x: Scalar, y: Scalar, z: Scalar) -> Vec3 { Vec3::new(x, y, z) }

fn unit_scale() -> Vec3 { Vec3::ONE }

/// Position, orientation and per-axis scale of an object in the global frame.
///
/// Point transforms apply scale; direction transforms are rotation only.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Vec3,
    #[serde(default)]
    pub rot: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self { Self { pos: Vec3::ZERO, rot: Quat::IDENTITY, scale: Vec3::ONE } }
}

impl Pose {
    #[inline] pub fn new(pos: Vec3, rot: Quat) -> Self { Self { pos, rot, scale: Vec3::ONE } }
    #[inline] pub fn from_pos(pos: Vec3) -> Self { Self::new(pos, Quat::IDENTITY) }
    #[inline] pub fn with_scale(mut self, scale: Vec3) -> Self { self.scale = scale; self }

    /// Local point -> global point.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 { self.pos + self.rot * (p * self.scale) }

    /// Global point -> local point. Degenerate scale components are treated as 1.
    #[inline]
    pub fn inverse_transform_point(&self, p: Vec3) -> Vec3 {
        let s = Vec3::select(self.scale.abs().cmpgt(Vec3::splat(EPS)), self.scale, Vec3::ONE);
        (self.rot.inverse() * (p - self.pos)) / s
    }

    #[inline] pub fn transform_direction(&self, d: Vec3) -> Vec3 { self.rot * d }
    #[inline] pub fn inverse_transform_direction(&self, d: Vec3) -> Vec3 { self.rot.inverse() * d }
}

/// Linear + angular velocity, global frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity { pub lin: Vec3, pub ang: Vec3 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn scaled_rotated_round_trip() {
        let pose = Pose::new(vec3(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7)).with_scale(vec3(2.0, 0.5, 1.0));
        let p = vec3(0.3, -1.0, 4.0);
        let back = pose.inverse_transform_point(pose.transform_point(p));
        assert!((back - p).length() < 1e-5);
    }

    #[test] fn directions_ignore_scale() {
        let pose = Pose::from_pos(vec3(5.0, 0.0, 0.0)).with_scale(vec3(3.0, 3.0, 3.0));
        assert_eq!(pose.transform_direction(Vec3::X), Vec3::X);
    }
}
