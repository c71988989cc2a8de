//! Scene files: a serde description of a flow world and its bodies, and the
//! builder that turns one into a live [`FlowWorld`] plus reference dynamics.

use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use riftflow_aero::{AeroModel, BodyShape};
use riftflow_core::{DomainId, FlowError, FluidProps, Gravity, Lifetime, Pose, ReceiverId, RigidHandle, SourceId, Vec3, Velocity};
use riftflow_dynamics::{BodyDesc, Bodies};
use riftflow_flow::{AreaSource, FilamentParams, FlowKernel, LineSource, PointSource, SourceOwner, UniformFlow};
use riftflow_geom::{DomainShape, MassProps};
use riftflow_world::{FlowWorld, FlowWorldBuilder};

/// Bump when the layout changes incompatibly.
pub const SCENE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("reading scene: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing scene: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported scene version {0} (expected {SCENE_VERSION})")]
    Version(u32),
    #[error("no domain named {0:?}")]
    UnknownDomain(String),
    #[error("body {body:?} ignores source #{index}, but the scene has {count} sources")]
    SourceIndex { body: String, index: usize, count: usize },
    #[error(transparent)]
    Flow(#[from] FlowError),
}

fn version() -> u32 { SCENE_VERSION }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "version")]
    pub version: u32,
    /// Fluid outside every domain.
    #[serde(default)]
    pub fluid: FluidProps,
    #[serde(default)]
    pub gravity: Gravity,
    #[serde(default)]
    pub domains: Vec<DomainDesc>,
    #[serde(default)]
    pub sources: Vec<SourceDesc>,
    #[serde(default)]
    pub rings: Vec<RingDesc>,
    #[serde(default)]
    pub bodies: Vec<BodyDescJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainDesc {
    pub name: String,
    #[serde(default)]
    pub pose: Pose,
    pub shape: DomainShape,
    pub fluid: FluidProps,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub free_surface: bool,
}

/// Kernels that can be placed directly; vortex filaments come from `rings`
/// and displacement sources from bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KernelDesc {
    Point(PointSource),
    Line(LineSource),
    Area(AreaSource),
    Uniform(UniformFlow),
}

impl KernelDesc {
    fn into_kernel(self) -> FlowKernel {
        match self {
            KernelDesc::Point(k) => FlowKernel::Point(k),
            KernelDesc::Line(k) => FlowKernel::Line(k),
            KernelDesc::Area(k) => FlowKernel::Area(k),
            KernelDesc::Uniform(k) => FlowKernel::Uniform(k),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDesc {
    #[serde(default)]
    pub pose: Pose,
    pub kernel: KernelDesc,
    /// Owning domain by name; global when absent.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub lifetime: Option<Lifetime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingDesc {
    #[serde(default)]
    pub pose: Pose,
    pub radius: f32,
    #[serde(default = "ring_segments")]
    pub segments: u32,
    #[serde(default)]
    pub filament: FilamentParams,
    #[serde(default)]
    pub domain: Option<String>,
}

fn ring_segments() -> u32 { 16 }
fn default_density() -> f32 { 1000.0 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyDescJson {
    pub name: String,
    #[serde(default)]
    pub pose: Pose,
    #[serde(default)]
    pub velocity: Vec3,
    pub shape: BodyShape,
    pub models: Vec<AeroModel>,
    /// Solid ellipsoid density for the reference dynamics, kg/m^3.
    #[serde(default = "default_density")]
    pub density: f32,
    /// Fixed bodies still receive loads but never move.
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub displacement: bool,
    /// Indices into `sources` this body does not feel.
    #[serde(default)]
    pub ignore: Vec<usize>,
}

/// Handles of one scene body inside the built world.
#[derive(Debug, Clone)]
pub struct SceneBody {
    pub name: String,
    pub receiver: ReceiverId,
    pub rigid: RigidHandle,
}

pub struct BuiltScene {
    pub world: FlowWorld,
    pub bodies: Bodies,
    pub handles: Vec<SceneBody>,
    pub gravity: Gravity,
}

impl BuiltScene {
    /// One flow tick followed by one integration step.
    pub fn step(&mut self, dt: f32) -> riftflow_world::StepReport {
        let report = self.world.step(dt, &mut self.bodies);
        self.bodies.integrate_all(&self.gravity, dt);
        report
    }
}

pub fn parse_scene(json: &str) -> Result<Scene, SceneError> {
    let scene: Scene = serde_json::from_str(json)?;
    if scene.version != SCENE_VERSION { return Err(SceneError::Version(scene.version)); }
    Ok(scene)
}

pub fn load_scene(path: &Path) -> Result<Scene, SceneError> {
    let scene = parse_scene(&std::fs::read_to_string(path)?)?;
    info!(
        "loaded scene {}: {} domains, {} sources, {} rings, {} bodies",
        path.display(), scene.domains.len(), scene.sources.len(), scene.rings.len(), scene.bodies.len()
    );
    Ok(scene)
}

fn owner(names: &BTreeMap<String, DomainId>, domain: &Option<String>) -> Result<SourceOwner, SceneError> {
    match domain {
        None => Ok(SourceOwner::Global),
        Some(n) => names.get(n).map(|d| SourceOwner::Domain(*d)).ok_or_else(|| SceneError::UnknownDomain(n.clone())),
    }
}

impl Scene {
    pub fn build(&self) -> Result<BuiltScene, SceneError> {
        let mut world = FlowWorldBuilder::new()
            .with_fluid(self.fluid)
            .with_gravity(self.gravity)
            .with_node_capacity(self.rings.iter().map(|r| r.segments as usize).sum())
            .build()?;

        let mut names = BTreeMap::new();
        for d in &self.domains {
            let id = world.add_domain(d.pose, d.shape.clone(), d.fluid)?;
            let dom = world.domain_mut(id)?;
            dom.priority = d.priority;
            dom.free_surface = d.free_surface;
            names.insert(d.name.clone(), id);
        }

        let mut sources: Vec<SourceId> = Vec::with_capacity(self.sources.len());
        for s in &self.sources {
            let own = owner(&names, &s.domain)?;
            let kernel = s.kernel.clone().into_kernel();
            let id = match s.lifetime {
                Some(l) => world.add_temporal_source(s.pose, kernel, own, l)?,
                None => world.add_source(s.pose, kernel, own)?,
            };
            sources.push(id);
        }

        for r in &self.rings {
            world.add_vortex_ring(r.pose, r.radius, r.segments, r.filament, owner(&names, &r.domain)?)?;
        }

        let mut bodies = Bodies::with_capacity(self.bodies.len());
        let mut handles = Vec::with_capacity(self.bodies.len());
        for b in &self.bodies {
            let dims = (b.shape.dimensions() * b.pose.scale).abs();
            let desc = if b.fixed {
                BodyDesc::fixed(b.pose.pos)
            } else {
                BodyDesc::dynamic(b.pose.pos, MassProps::from_ellipsoid(dims, b.density))
            };
            let rigid = bodies.add(desc.with_rot(b.pose.rot).with_vel(Velocity { lin: b.velocity, ang: Vec3::ZERO }));
            let receiver = world.add_receiver(b.pose, Some(rigid));
            world.add_body(receiver, b.shape.clone(), b.models.clone(), b.displacement)?;
            for &i in &b.ignore {
                let sid = sources.get(i).copied().ok_or_else(|| SceneError::SourceIndex {
                    body: b.name.clone(), index: i, count: sources.len(),
                })?;
                world.ignore(receiver, sid)?;
            }
            handles.push(SceneBody { name: b.name.clone(), receiver, rigid });
        }

        Ok(BuiltScene { world, bodies, handles, gravity: self.gravity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn minimal_scene_uses_defaults() {
        let s = parse_scene("{}").unwrap();
        assert_eq!(s.fluid, FluidProps::AIR);
        assert!(s.bodies.is_empty());
        let built = s.build().unwrap();
        assert_eq!(built.world.source_count(), 0);
    }

    #[test] fn version_is_checked() {
        assert!(matches!(parse_scene(r#"{"version": 7}"#), Err(SceneError::Version(7))));
        assert!(matches!(parse_scene("{"), Err(SceneError::Json(_))));
    }

    #[test] fn unknown_domain_is_named() {
        let s = parse_scene(r#"{"sources":[{"kernel":{"kind":"uniform","speed":1.0},"domain":"lake"}]}"#).unwrap();
        match s.build() {
            Err(SceneError::UnknownDomain(n)) => assert_eq!(n, "lake"),
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("built a scene with a missing domain"),
        }
    }

    #[test] fn bad_parameters_surface_as_flow_errors() {
        let s = parse_scene(r#"{"rings":[{"radius":1.0,"segments":2}]}"#).unwrap();
        assert!(matches!(s.build(), Err(SceneError::Flow(FlowError::InvalidParameter { .. }))));
    }
}
