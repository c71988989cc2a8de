use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use riftflow_core::{DomainId, FlowResult, Lifetime, Pose, SourceId, Vec3};

use crate::kernels::{AreaSource, DisplacementBody, LineSource, PointSource, UniformFlow};
use crate::vortex::{VortexFilament, VortexNodes};

/// Who evaluates a source: the global field or exactly one domain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOwner {
    #[default]
    Global,
    Domain(DomainId),
}

/// Closed set of velocity kernels.
#[derive(Clone, Debug)]
pub enum FlowKernel {
    Point(PointSource),
    Line(LineSource),
    Area(AreaSource),
    Uniform(UniformFlow),
    Displacement(DisplacementBody),
    Vortex(VortexFilament),
}

impl FlowKernel {
    pub fn validate(&self) -> FlowResult<()> {
        match self {
            FlowKernel::Point(k) => k.validate(),
            FlowKernel::Line(k) => k.validate(),
            FlowKernel::Area(k) => k.validate(),
            FlowKernel::Uniform(k) => k.validate(),
            FlowKernel::Displacement(k) => k.validate(),
            FlowKernel::Vortex(k) => k.validate(),
        }
    }

    pub fn prepare(&mut self) {
        if let FlowKernel::Uniform(k) = self { k.prepare(); }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowKernel::Point(_) => "point",
            FlowKernel::Line(_) => "line",
            FlowKernel::Area(_) => "area",
            FlowKernel::Uniform(_) => "uniform",
            FlowKernel::Displacement(_) => "displacement",
            FlowKernel::Vortex(_) => "vortex",
        }
    }
}

/// Per-tick context a kernel may need beyond the sample point.
#[derive(Copy, Clone, Debug)]
pub struct FlowQuery<'a> {
    pub nodes: &'a VortexNodes,
    pub time: f32,
}

#[derive(Clone, Debug)]
pub struct FlowSource {
    pub id: SourceId,
    pub pose: Pose,
    /// Multiplies the kernel output; driven by `lifetime` when present.
    pub strength_scale: f32,
    pub kernel: FlowKernel,
    pub lifetime: Option<Lifetime>,
    pub owner: SourceOwner,
}

impl FlowSource {
    pub fn new(id: SourceId, pose: Pose, kernel: FlowKernel) -> Self {
        Self { id, pose, strength_scale: 1.0, kernel, lifetime: None, owner: SourceOwner::Global }
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.strength_scale = lifetime.strength_now();
        self.lifetime = Some(lifetime);
        self
    }

    /// Global-frame velocity induced at `p`.
    pub fn velocity_at(&self, p: Vec3, q: &FlowQuery<'_>) -> Vec3 {
        if self.strength_scale == 0.0 { return Vec3::ZERO; }
        let local = |v: Vec3| self.pose.transform_direction(v);
        let at = || self.pose.inverse_transform_point(p);
        let v = match &self.kernel {
            FlowKernel::Point(k) => local(k.velocity_local(at())),
            FlowKernel::Line(k) => local(k.velocity_local(at())),
            FlowKernel::Area(k) => local(k.velocity_local(at())),
            FlowKernel::Displacement(k) => local(k.velocity_local(at())),
            FlowKernel::Uniform(k) => k.velocity(p, q.time),
            FlowKernel::Vortex(k) => k.velocity(p, q.nodes),
        };
        v * self.strength_scale
    }
}

/// All live sources keyed by id; iteration order is id order.
#[derive(Clone, Debug, Default)]
pub struct SourceStore { map: BTreeMap<SourceId, FlowSource> }

impl SourceStore {
    pub fn new() -> Self { Self::default() }
    pub fn insert(&mut self, s: FlowSource) -> Option<FlowSource> { self.map.insert(s.id, s) }
    pub fn remove(&mut self, id: SourceId) -> Option<FlowSource> { self.map.remove(&id) }
    #[inline] pub fn get(&self, id: SourceId) -> Option<&FlowSource> { self.map.get(&id) }
    #[inline] pub fn get_mut(&mut self, id: SourceId) -> Option<&mut FlowSource> { self.map.get_mut(&id) }
    pub fn contains(&self, id: SourceId) -> bool { self.map.contains_key(&id) }
    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &FlowSource> { self.map.values() }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FlowSource> { self.map.values_mut() }
    pub fn ids(&self) -> Vec<SourceId> { self.map.keys().copied().collect() }
}
