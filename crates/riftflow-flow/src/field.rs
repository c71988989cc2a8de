use riftflow_core::{DomainId, FluidProps, InteractionRegistry, ReceiverId, SourceId, Vec3};

use crate::domain::FluidDomain;
use crate::source::{FlowQuery, SourceStore};

/// Ordered list of source ids evaluated together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceSet { ids: Vec<SourceId> }

impl SourceSet {
    pub fn new() -> Self { Self::default() }

    /// Keeps id order; duplicates are ignored.
    pub fn insert(&mut self, id: SourceId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(at) => { self.ids.insert(at, id); true }
        }
    }

    pub fn remove(&mut self, id: SourceId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(at) => { self.ids.remove(at); true }
            Err(_) => false,
        }
    }

    #[inline] pub fn contains(&self, id: SourceId) -> bool { self.ids.binary_search(&id).is_ok() }
    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = SourceId> + '_ { self.ids.iter().copied() }

    /// Sum of every member not ignored by `receiver`.
    pub fn velocity_at(
        &self,
        p: Vec3,
        receiver: ReceiverId,
        store: &SourceStore,
        registry: &InteractionRegistry,
        q: &FlowQuery<'_>,
    ) -> Vec3 {
        let mut v = Vec3::ZERO;
        for id in self.iter() {
            if registry.is_ignored(receiver, id) { continue; }
            if let Some(s) = store.get(id) { v += s.velocity_at(p, q); }
        }
        v
    }
}

/// Sources that act everywhere, plus the fluid outside every domain.
#[derive(Clone, Debug, Default)]
pub struct GlobalField {
    pub sources: SourceSet,
    pub fluid: FluidProps,
}

impl GlobalField {
    pub fn new(fluid: FluidProps) -> Self { Self { sources: SourceSet::new(), fluid } }

    pub fn velocity_at(&self, p: Vec3, receiver: ReceiverId, store: &SourceStore, registry: &InteractionRegistry, q: &FlowQuery<'_>) -> Vec3 {
        self.sources.velocity_at(p, receiver, store, registry, q)
    }
}

/// Read-only view of everything that induces velocity during one tick.
#[derive(Copy, Clone)]
pub struct FlowField<'a> {
    pub global: &'a GlobalField,
    pub domains: &'a [Option<FluidDomain>],
    pub store: &'a SourceStore,
    pub registry: &'a InteractionRegistry,
    pub query: FlowQuery<'a>,
}

impl<'a> FlowField<'a> {
    #[inline]
    pub fn domain(&self, id: DomainId) -> Option<&'a FluidDomain> {
        self.domains.get(id.0 as usize).and_then(|d| d.as_ref())
    }

    /// Fluid velocity seen by `receiver` at `p`, given the domains it occupies.
    pub fn receiver_velocity(&self, p: Vec3, receiver: ReceiverId, use_global: bool, occupied: &[DomainId]) -> Vec3 {
        let mut v = if use_global {
            self.global.velocity_at(p, receiver, self.store, self.registry, &self.query)
        } else {
            Vec3::ZERO
        };
        for d in occupied.iter().filter_map(|id| self.domain(*id)) {
            v += d.sources.velocity_at(p, receiver, self.store, self.registry, &self.query);
        }
        v
    }

    /// Unfiltered velocity at an arbitrary point: global field plus every domain containing it.
    pub fn probe(&self, p: Vec3) -> Vec3 {
        let r = ReceiverId::UNASSIGNED;
        let mut v = self.global.velocity_at(p, r, self.store, self.registry, &self.query);
        for d in self.domains.iter().flatten() {
            v += d.velocity_at(p, r, self.store, self.registry, &self.query);
        }
        v
    }

    /// Fluid of the highest-priority occupied domain (ties: lowest id), else the global fluid.
    pub fn fluid_for(&self, occupied: &[DomainId]) -> FluidProps {
        occupied.iter()
            .filter_map(|id| self.domain(*id))
            .max_by(|a, b| a.priority.cmp(&b.priority).then(b.id.cmp(&a.id)))
            .map_or(self.global.fluid, |d| d.fluid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftflow_core::Pose;
    use riftflow_geom::DomainShape;
    use crate::kernels::UniformFlow;
    use crate::source::{FlowKernel, FlowSource};
    use crate::vortex::VortexNodes;

    fn uniform(id: u32, speed: f32) -> FlowSource {
        FlowSource::new(SourceId(id), Pose::default(), FlowKernel::Uniform(UniformFlow::new(speed, 0.0, 0.0)))
    }

    #[test] fn set_is_sorted_and_unique() {
        let mut s = SourceSet::new();
        assert!(s.insert(SourceId(4)));
        assert!(s.insert(SourceId(1)));
        assert!(!s.insert(SourceId(4)));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![SourceId(1), SourceId(4)]);
        assert!(s.remove(SourceId(1)));
        assert!(!s.contains(SourceId(1)));
    }

    #[test] fn composition_and_priority() {
        let mut store = SourceStore::new();
        store.insert(uniform(1, 1.0));
        store.insert(uniform(2, 3.0));
        let mut global = GlobalField::new(FluidProps::AIR);
        global.sources.insert(SourceId(1));

        let mut low = FluidDomain::new(DomainId(0), Pose::default(), DomainShape::Sphere { r: 10.0 }, FluidProps::AIR);
        low.sources.insert(SourceId(2));
        let high = FluidDomain::new(DomainId(1), Pose::default(), DomainShape::Sphere { r: 1.0 }, FluidProps::WATER)
            .with_priority(5);
        let domains = vec![Some(low), Some(high)];

        let mut registry = InteractionRegistry::new();
        let nodes = VortexNodes::new();
        let field = FlowField { global: &global, domains: &domains, store: &store, registry: &registry, query: FlowQuery { nodes: &nodes, time: 0.0 } };

        let occ = [DomainId(0), DomainId(1)];
        assert!((field.receiver_velocity(Vec3::ZERO, ReceiverId(9), true, &occ).z - 4.0).abs() < 1e-6);
        assert!((field.receiver_velocity(Vec3::ZERO, ReceiverId(9), false, &occ).z - 3.0).abs() < 1e-6);
        assert_eq!(field.fluid_for(&occ), FluidProps::WATER);
        assert_eq!(field.fluid_for(&[]), FluidProps::AIR);
        assert!((field.probe(Vec3::new(5.0, 0.0, 0.0)).z - 4.0).abs() < 1e-6);
        assert!((field.probe(Vec3::new(50.0, 0.0, 0.0)).z - 1.0).abs() < 1e-6);

        registry.ignore(ReceiverId(9), SourceId(2));
        let field = FlowField { global: &global, domains: &domains, store: &store, registry: &registry, query: FlowQuery { nodes: &nodes, time: 0.0 } };
        assert!((field.receiver_velocity(Vec3::ZERO, ReceiverId(9), true, &occ).z - 1.0).abs() < 1e-6);
    }
}
