pub mod aabb;
pub mod shape;
pub mod mesh;
pub mod volume;

pub use aabb::Aabb;
pub use shape::{DomainShape, aabb_of};
pub use mesh::TriMesh;
pub use volume::{MassProps, ellipsoid_volume, unit_cap, SphereCap};
