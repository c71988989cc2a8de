use glam::Mat3A;
use serde::{Deserialize, Serialize};
use riftflow_core::types::{Mat3, Pose, Vec3};
use crate::aabb::Aabb;
use crate::mesh::TriMesh;

/// Region shape of a fluid domain, in domain-local coordinates (before pose scale).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainShape {
    Sphere { r: f32 },
    Box { hx: f32, hy: f32, hz: f32 },
    Capsule { r: f32, hh: f32 }, // half-height along local Y
    Mesh { mesh: TriMesh },
}

impl DomainShape {
    /// Containment of a point already expressed in domain-local coordinates.
    pub fn contains_local(&self, p: Vec3) -> bool {
        match self {
            DomainShape::Sphere { r } => p.length_squared() <= r * r,
            DomainShape::Box { hx, hy, hz } => p.x.abs() <= *hx && p.y.abs() <= *hy && p.z.abs() <= *hz,
            DomainShape::Capsule { r, hh } => {
                let y = p.y.clamp(-hh.abs(), hh.abs());
                (p - Vec3::new(0.0, y, 0.0)).length_squared() <= r * r
            }
            DomainShape::Mesh { mesh } => mesh.contains(p),
        }
    }

    pub fn local_aabb(&self) -> Aabb {
        match self {
            DomainShape::Sphere { r } => Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(*r)),
            DomainShape::Box { hx, hy, hz } => Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(*hx, *hy, *hz)),
            DomainShape::Capsule { r, hh } => {
                Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(*r, hh.abs() + r, *r))
            }
            DomainShape::Mesh { mesh } => mesh.bounds(),
        }
    }

    /// Local height of the top of the shape; a free surface sits here.
    pub fn top(&self) -> f32 { self.local_aabb().max.y }
}

#[inline]
pub fn aabb_of(shape: &DomainShape, xf: &Pose) -> Aabb {
    let local = shape.local_aabb();
    let he = local.half_extents() * xf.scale.abs();
    let rot = Mat3A::from_quat(xf.rot);
    let m = Mat3::from_cols(rot.x_axis.abs(), rot.y_axis.abs(), rot.z_axis.abs());
    let world_he = m * he;
    Aabb::from_center_half_extents(xf.transform_point(local.center()), world_he)
}
