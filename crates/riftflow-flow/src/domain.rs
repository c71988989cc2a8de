use riftflow_core::{DomainId, FluidProps, InteractionRegistry, Pose, ReceiverId, Vec3};
use riftflow_geom::{aabb_of, Aabb, DomainShape};

use crate::field::SourceSet;
use crate::source::{FlowQuery, SourceStore};

/// Plane separating a free-surface domain's fluid from the ambient fluid above it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FluidBoundary {
    pub point: Vec3,
    /// Unit normal pointing out of the fluid.
    pub normal: Vec3,
    pub bounds: Aabb,
    pub fluid: FluidProps,
}

impl FluidBoundary {
    /// Positive above the surface.
    #[inline]
    pub fn signed_height(&self, p: Vec3) -> f32 { self.normal.dot(p - self.point) }

    /// Bounds test with a small tolerance so points on the surface count.
    #[inline]
    pub fn covers(&self, p: Vec3) -> bool { self.bounds.expanded(1.0e-3).contains_point(p) }
}

/// Bounded region with its own fluid and its own sources.
#[derive(Clone, Debug)]
pub struct FluidDomain {
    pub id: DomainId,
    pub shape: DomainShape,
    pub fluid: FluidProps,
    /// Higher wins when a receiver occupies several domains.
    pub priority: i32,
    /// Top of the shape acts as a fluid surface for buoyancy.
    pub free_surface: bool,
    pub sources: SourceSet,
    pose: Pose,
    bounds: Aabb,
    occupants: Vec<ReceiverId>,
}

impl FluidDomain {
    pub fn new(id: DomainId, pose: Pose, shape: DomainShape, fluid: FluidProps) -> Self {
        let bounds = aabb_of(&shape, &pose);
        Self { id, shape, fluid, priority: 0, free_surface: false, sources: SourceSet::new(), pose, bounds, occupants: Vec::new() }
    }

    pub fn with_priority(mut self, priority: i32) -> Self { self.priority = priority; self }
    pub fn with_free_surface(mut self, on: bool) -> Self { self.free_surface = on; self }

    #[inline] pub fn pose(&self) -> &Pose { &self.pose }
    #[inline] pub fn bounds(&self) -> Aabb { self.bounds }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.bounds = aabb_of(&self.shape, &pose);
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.bounds.contains_point(p) && self.shape.contains_local(self.pose.inverse_transform_point(p))
    }

    /// Owned sources not ignored by `receiver`; zero outside the domain.
    pub fn velocity_at(&self, p: Vec3, receiver: ReceiverId, store: &SourceStore, registry: &InteractionRegistry, q: &FlowQuery<'_>) -> Vec3 {
        if !self.contains(p) { return Vec3::ZERO; }
        self.sources.velocity_at(p, receiver, store, registry, q)
    }

    /* ---- occupancy ---- */

    pub fn occupants(&self) -> &[ReceiverId] { &self.occupants }
    pub fn is_occupied_by(&self, r: ReceiverId) -> bool { self.occupants.binary_search(&r).is_ok() }

    /// Returns true on an actual transition.
    pub fn enter(&mut self, r: ReceiverId) -> bool {
        match self.occupants.binary_search(&r) {
            Ok(_) => false,
            Err(at) => { self.occupants.insert(at, r); true }
        }
    }

    pub fn exit(&mut self, r: ReceiverId) -> bool {
        match self.occupants.binary_search(&r) {
            Ok(at) => { self.occupants.remove(at); true }
            Err(_) => false,
        }
    }

    pub fn boundary(&self) -> Option<FluidBoundary> {
        if !self.free_surface { return None; }
        Some(FluidBoundary {
            point: self.pose.transform_point(Vec3::new(0.0, self.shape.top(), 0.0)),
            normal: self.pose.transform_direction(Vec3::Y).normalize_or_zero(),
            bounds: self.bounds,
            fluid: self.fluid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> FluidDomain {
        FluidDomain::new(DomainId(0), Pose::from_pos(Vec3::new(0.0, -1.0, 0.0)), DomainShape::Box { hx: 5.0, hy: 1.0, hz: 5.0 }, FluidProps::WATER)
            .with_free_surface(true)
    }

    #[test] fn contains_and_moves() {
        let mut d = pool();
        assert!(d.contains(Vec3::new(1.0, -0.5, 1.0)));
        assert!(!d.contains(Vec3::new(1.0, 0.5, 1.0)));
        d.set_pose(Pose::from_pos(Vec3::new(0.0, 1.0, 0.0)));
        assert!(d.contains(Vec3::new(1.0, 0.5, 1.0)));
    }

    #[test] fn surface_sits_on_top() {
        let b = pool().boundary().unwrap();
        assert!(b.point.y.abs() < 1e-6);
        assert_eq!(b.normal, Vec3::Y);
        assert!(b.signed_height(Vec3::new(0.0, 2.0, 0.0)) > 0.0);
        assert!(b.covers(Vec3::new(4.0, 0.0, 4.0)));
        assert!(FluidDomain::new(DomainId(1), Pose::default(), DomainShape::Sphere { r: 1.0 }, FluidProps::AIR).boundary().is_none());
    }

    #[test] fn occupancy_transitions() {
        let mut d = pool();
        assert!(d.enter(ReceiverId(3)));
        assert!(!d.enter(ReceiverId(3)));
        assert!(d.enter(ReceiverId(1)));
        assert_eq!(d.occupants(), &[ReceiverId(1), ReceiverId(3)]);
        assert!(d.exit(ReceiverId(3)));
        assert!(!d.exit(ReceiverId(3)));
    }
}
