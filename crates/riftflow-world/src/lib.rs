mod recorder;
mod report;

pub use recorder::ScheduleRecorder;
pub use report::StepReport;

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use riftflow_aero::{AeroBody, AeroModel, BodyShape};
use riftflow_core::{
    hash_f32, hash_pose, hash_quat, hash_vec3, DomainId, FlowError, FlowResult, FluidProps, Gravity, InteractionRegistry,
    Lifetime, Pose, ReceiverId, RigidBodies, RigidHandle, SourceId, StepCtx, StepHasher, StepStage, Vec3, Velocity,
};
use riftflow_flow::{
    DisplacementBody, FilamentParams, FlowField, FlowKernel, FlowQuery, FlowReceiver, FlowSource, FluidBoundary,
    FluidDomain, GlobalField, NodeHandle, SourceOwner, SourceSet, SourceStore, VortexNodes,
};
use riftflow_geom::DomainShape;

/* ---------------- Builder ---------------- */
pub struct FlowWorldBuilder {
    pub fluid: FluidProps,
    pub gravity: Gravity,
    /// Expected vortex node count; sizes the node table and the advection scratch.
    pub nodes: usize,
}

impl Default for FlowWorldBuilder { fn default() -> Self { Self::new() } }

impl FlowWorldBuilder {
    pub fn new() -> Self { Self { fluid: FluidProps::AIR, gravity: Gravity::default(), nodes: 64 } }
    pub fn with_fluid(mut self, fluid: FluidProps) -> Self { self.fluid = fluid; self }
    pub fn with_gravity(mut self, gravity: Gravity) -> Self { self.gravity = gravity; self }
    pub fn with_node_capacity(mut self, nodes: usize) -> Self { self.nodes = nodes; self }

    pub fn build(self) -> FlowResult<FlowWorld> {
        self.fluid.validate()?;
        Ok(FlowWorld::new(self.fluid, self.gravity, self.nodes))
    }
}

/* ---------------- World ---------------- */

/// Explicit simulation context: every source, domain, receiver and body, plus
/// the tick pipeline that turns them into loads on the host's rigid bodies.
pub struct FlowWorld {
    registry: InteractionRegistry,
    global: GlobalField,
    domains: Vec<Option<FluidDomain>>,
    sources: SourceStore,
    nodes: VortexNodes,
    receivers: BTreeMap<ReceiverId, FlowReceiver>,
    bodies: BTreeMap<ReceiverId, AeroBody>,
    warned_unapplied: BTreeSet<ReceiverId>,
    gravity: Gravity,
    schedule: ScheduleRecorder,
    tick: u64,
    time: f32,

    // scratch, reused every tick
    expired: Vec<SourceId>,
    advect: Vec<(NodeHandle, Vec3)>,
}

impl FlowWorld {
    fn new(fluid: FluidProps, gravity: Gravity, nodes: usize) -> Self {
        Self {
            registry: InteractionRegistry::new(),
            global: GlobalField::new(fluid),
            domains: Vec::new(),
            sources: SourceStore::new(),
            nodes: VortexNodes::with_capacity(nodes),
            receivers: BTreeMap::new(),
            bodies: BTreeMap::new(),
            warned_unapplied: BTreeSet::new(),
            gravity,
            schedule: ScheduleRecorder::new(),
            tick: 0,
            time: 0.0,
            expired: Vec::new(),
            advect: Vec::with_capacity(nodes),
        }
    }

    /* ---------- read-only access ---------- */
    #[inline] pub fn tick_index(&self) -> u64 { self.tick }
    #[inline] pub fn time(&self) -> f32 { self.time }
    pub fn gravity(&self) -> &Gravity { &self.gravity }
    pub fn set_gravity(&mut self, g: Gravity) { self.gravity = g; }
    pub fn global(&self) -> &GlobalField { &self.global }
    pub fn registry(&self) -> &InteractionRegistry { &self.registry }
    pub fn nodes(&self) -> &VortexNodes { &self.nodes }
    pub fn source(&self, id: SourceId) -> Option<&FlowSource> { self.sources.get(id) }
    pub fn source_count(&self) -> usize { self.sources.len() }
    /// Sources in id order.
    pub fn sources(&self) -> impl Iterator<Item = &FlowSource> { self.sources.iter() }
    pub fn domains(&self) -> impl Iterator<Item = &FluidDomain> { self.domains.iter().flatten() }
    pub fn domain(&self, id: DomainId) -> Option<&FluidDomain> { self.domains.get(id.0 as usize).and_then(|d| d.as_ref()) }
    pub fn receiver(&self, id: ReceiverId) -> Option<&FlowReceiver> { self.receivers.get(&id) }
    pub fn body(&self, id: ReceiverId) -> Option<&AeroBody> { self.bodies.get(&id) }
    pub fn body_mut(&mut self, id: ReceiverId) -> Option<&mut AeroBody> { self.bodies.get_mut(&id) }
    pub fn bodies(&self) -> impl Iterator<Item = &AeroBody> { self.bodies.values() }
    pub fn schedule(&self) -> &ScheduleRecorder { &self.schedule }

    fn field(&self) -> FlowField<'_> {
        FlowField {
            global: &self.global,
            domains: &self.domains,
            store: &self.sources,
            registry: &self.registry,
            query: FlowQuery { nodes: &self.nodes, time: self.time },
        }
    }

    /// Fluid velocity at an arbitrary point, no ignore filtering.
    pub fn velocity_at(&self, p: Vec3) -> Vec3 { self.field().probe(p) }

    /* ---------- domains ---------- */

    pub fn add_domain(&mut self, pose: Pose, shape: DomainShape, fluid: FluidProps) -> FlowResult<DomainId> {
        fluid.validate()?;
        let id = DomainId(self.domains.len() as u32);
        self.domains.push(Some(FluidDomain::new(id, pose, shape, fluid)));
        Ok(id)
    }

    pub fn domain_mut(&mut self, id: DomainId) -> FlowResult<&mut FluidDomain> {
        self.domains.get_mut(id.0 as usize).and_then(|d| d.as_mut()).ok_or(FlowError::UnknownDomain(id))
    }

    /// Destroys the domain's own sources with it.
    pub fn remove_domain(&mut self, id: DomainId) -> FlowResult<()> {
        let dom = self.domains.get_mut(id.0 as usize).and_then(|d| d.take()).ok_or(FlowError::UnknownDomain(id))?;
        for sid in dom.sources.iter() { self.destroy_source(sid); }
        for r in self.receivers.values_mut() { r.domains.retain(|d| *d != id); }
        Ok(())
    }

    /* ---------- sources ---------- */

    fn check_owner(&self, owner: SourceOwner) -> FlowResult<()> {
        match owner {
            SourceOwner::Domain(d) if self.domain(d).is_none() => Err(FlowError::UnknownDomain(d)),
            _ => Ok(()),
        }
    }

    fn owner_set(&mut self, owner: SourceOwner) -> Option<&mut SourceSet> {
        match owner {
            SourceOwner::Global => Some(&mut self.global.sources),
            SourceOwner::Domain(d) => self.domains.get_mut(d.0 as usize).and_then(|x| x.as_mut()).map(|x| &mut x.sources),
        }
    }

    fn insert_source(&mut self, pose: Pose, mut kernel: FlowKernel, owner: SourceOwner, lifetime: Option<Lifetime>) -> SourceId {
        let id = self.registry.issue_source_id();
        kernel.prepare();
        let mut s = FlowSource::new(id, pose, kernel);
        s.owner = owner;
        if let Some(l) = lifetime { s = s.with_lifetime(l); }
        if let FlowKernel::Displacement(k) = &s.kernel { self.registry.ignore(k.body, id); }
        self.sources.insert(s);
        if let Some(set) = self.owner_set(owner) { set.insert(id); }
        id
    }

    /// Register a source with an explicit owner. Vortex kernels take a
    /// reference on both endpoint nodes.
    pub fn add_source(&mut self, pose: Pose, kernel: FlowKernel, owner: SourceOwner) -> FlowResult<SourceId> {
        self.add_source_with_lifetime(pose, kernel, owner, None)
    }

    /// Like `add_source`; the source is destroyed once its lifetime runs out.
    pub fn add_temporal_source(&mut self, pose: Pose, kernel: FlowKernel, owner: SourceOwner, lifetime: Lifetime) -> FlowResult<SourceId> {
        self.add_source_with_lifetime(pose, kernel, owner, Some(lifetime))
    }

    fn add_source_with_lifetime(&mut self, pose: Pose, kernel: FlowKernel, owner: SourceOwner, lifetime: Option<Lifetime>) -> FlowResult<SourceId> {
        kernel.validate()?;
        self.check_owner(owner)?;
        if let Some(l) = &lifetime {
            if !(l.span > 0.0) { return Err(FlowError::invalid("lifetime span", l.span, "> 0")); }
        }
        if let FlowKernel::Vortex(f) = &kernel {
            for n in [f.start, f.end] {
                if !self.nodes.is_live(n) { return Err(FlowError::DeadNode(n.index)); }
            }
            self.nodes.connect(f.start, f.dynamic)?;
            self.nodes.connect(f.end, f.dynamic)?;
        }
        Ok(self.insert_source(pose, kernel, owner, lifetime))
    }

    pub fn set_source_owner(&mut self, id: SourceId, owner: SourceOwner) -> FlowResult<()> {
        self.check_owner(owner)?;
        let old = self.sources.get(id).map(|s| s.owner).ok_or(FlowError::UnknownSource(id))?;
        if old == owner { return Ok(()); }
        if let Some(set) = self.owner_set(old) { set.remove(id); }
        if let Some(set) = self.owner_set(owner) { set.insert(id); }
        if let Some(s) = self.sources.get_mut(id) { s.owner = owner; }
        Ok(())
    }

    pub fn set_source_pose(&mut self, id: SourceId, pose: Pose) -> FlowResult<()> {
        let s = self.sources.get_mut(id).ok_or(FlowError::UnknownSource(id))?;
        s.pose = pose;
        Ok(())
    }

    /// Manual strength scale; overwritten each tick for sources with a lifetime.
    pub fn set_source_strength(&mut self, id: SourceId, scale: f32) -> FlowResult<()> {
        let s = self.sources.get_mut(id).ok_or(FlowError::UnknownSource(id))?;
        s.strength_scale = scale;
        Ok(())
    }

    pub fn set_source_lifetime(&mut self, id: SourceId, lifetime: Lifetime) -> FlowResult<()> {
        if !(lifetime.span > 0.0) { return Err(FlowError::invalid("lifetime span", lifetime.span, "> 0")); }
        let s = self.sources.get_mut(id).ok_or(FlowError::UnknownSource(id))?;
        s.strength_scale = lifetime.strength_now();
        s.lifetime = Some(lifetime);
        Ok(())
    }

    pub fn remove_source(&mut self, id: SourceId) -> FlowResult<()> {
        self.destroy_source(id).map(|_| ()).ok_or(FlowError::UnknownSource(id))
    }

    fn destroy_source(&mut self, id: SourceId) -> Option<FlowSource> {
        let s = self.sources.remove(id)?;
        if let Some(set) = self.owner_set(s.owner) { set.remove(id); }
        self.registry.forget_source(id);
        match &s.kernel {
            FlowKernel::Vortex(f) => {
                self.nodes.disconnect(f.start, f.dynamic);
                self.nodes.disconnect(f.end, f.dynamic);
            }
            FlowKernel::Displacement(k) => {
                if let Some(b) = self.bodies.get_mut(&k.body) {
                    if b.displacement == Some(id) { b.displacement = None; }
                }
            }
            _ => {}
        }
        Some(s)
    }

    /* ---------- vortex filaments ---------- */

    /// New filament between two fresh nodes.
    pub fn add_filament(&mut self, a: Vec3, b: Vec3, params: FilamentParams, owner: SourceOwner) -> FlowResult<(SourceId, NodeHandle, NodeHandle)> {
        params.validate()?;
        self.check_owner(owner)?;
        let na = self.nodes.spawn_connected(a, params.dynamic);
        let nb = self.nodes.spawn_connected(b, params.dynamic);
        let id = self.insert_source(Pose::default(), FlowKernel::Vortex(params.between(na, nb)), owner, None);
        Ok((id, na, nb))
    }

    /// New filament from an existing node to a fresh one.
    pub fn extend_filament(&mut self, from: NodeHandle, to: Vec3, params: FilamentParams, owner: SourceOwner) -> FlowResult<(SourceId, NodeHandle)> {
        params.validate()?;
        self.check_owner(owner)?;
        self.nodes.connect(from, params.dynamic)?;
        let nb = self.nodes.spawn_connected(to, params.dynamic);
        let id = self.insert_source(Pose::default(), FlowKernel::Vortex(params.between(from, nb)), owner, None);
        Ok((id, nb))
    }

    /// New filament between two existing nodes (closes chains into loops).
    pub fn connect_filament(&mut self, a: NodeHandle, b: NodeHandle, params: FilamentParams, owner: SourceOwner) -> FlowResult<SourceId> {
        self.add_source(Pose::default(), FlowKernel::Vortex(params.between(a, b)), owner)
    }

    /// Closed ring of `segments` filaments in the pose's local XY plane; positive
    /// circulation drives flow through the ring along local +Z.
    pub fn add_vortex_ring(&mut self, pose: Pose, radius: f32, segments: u32, params: FilamentParams, owner: SourceOwner) -> FlowResult<Vec<SourceId>> {
        if segments < 3 { return Err(FlowError::invalid("ring segments", segments as f32, ">= 3")); }
        if !(radius > 0.0) { return Err(FlowError::invalid("ring radius", radius, "> 0")); }
        params.validate()?;
        self.check_owner(owner)?;

        let point = |i: u32| {
            let t = i as f32 / segments as f32 * std::f32::consts::TAU;
            pose.transform_point(Vec3::new(t.cos() * radius, t.sin() * radius, 0.0))
        };
        let mut ids = Vec::with_capacity(segments as usize);
        let (first, n0, mut prev) = self.add_filament(point(0), point(1), params, owner)?;
        ids.push(first);
        for i in 2..segments {
            let (id, n) = self.extend_filament(prev, point(i), params, owner)?;
            ids.push(id);
            prev = n;
        }
        ids.push(self.connect_filament(prev, n0, params, owner)?);
        Ok(ids)
    }

    /* ---------- receivers + bodies ---------- */

    pub fn add_receiver(&mut self, pose: Pose, rigid: Option<RigidHandle>) -> ReceiverId {
        let id = self.registry.issue_receiver_id();
        let mut r = FlowReceiver::new(id, pose);
        r.rigid = rigid;
        r.fluid = self.global.fluid;
        self.receivers.insert(id, r);
        id
    }

    /// Opt a receiver out of (or back into) the global field.
    pub fn set_use_global(&mut self, id: ReceiverId, on: bool) -> FlowResult<()> {
        self.receivers.get_mut(&id).ok_or(FlowError::UnknownReceiver(id))?.use_global = on;
        Ok(())
    }

    /// Host-driven pose for kinematic receivers; rigid-bound ones are overwritten each tick.
    pub fn set_pose(&mut self, id: ReceiverId, pose: Pose) -> FlowResult<()> {
        self.receivers.get_mut(&id).ok_or(FlowError::UnknownReceiver(id))?.pose = pose;
        Ok(())
    }

    /// Attach aerodynamics to an existing receiver. With `displacement` the body
    /// also pushes fluid aside for everyone else.
    pub fn add_body(&mut self, id: ReceiverId, shape: BodyShape, models: Vec<AeroModel>, displacement: bool) -> FlowResult<()> {
        let pose = self.receivers.get(&id).map(|r| r.pose).ok_or(FlowError::UnknownReceiver(id))?;
        if self.bodies.contains_key(&id) { return Err(FlowError::DuplicateBody(id)); }
        let mut body = AeroBody::new(id, shape, models);
        body.set_pose_scale(pose.scale);
        if displacement {
            let semi = body.scaled_dimensions() * 0.5;
            let kernel = FlowKernel::Displacement(DisplacementBody::new(id, semi));
            kernel.validate()?;
            body.displacement = Some(self.insert_source(Pose::new(pose.pos, pose.rot), kernel, SourceOwner::Global, None));
        }
        self.bodies.insert(id, body);
        Ok(())
    }

    pub fn remove_body(&mut self, id: ReceiverId) -> FlowResult<()> {
        let body = self.bodies.remove(&id).ok_or(FlowError::UnknownReceiver(id))?;
        if let Some(sid) = body.displacement { self.destroy_source(sid); }
        self.warned_unapplied.remove(&id);
        Ok(())
    }

    pub fn remove_receiver(&mut self, id: ReceiverId) -> FlowResult<()> {
        self.receivers.remove(&id).ok_or(FlowError::UnknownReceiver(id))?;
        if self.bodies.contains_key(&id) { self.remove_body(id)?; }
        self.registry.remove_receiver(id);
        for d in self.domains.iter_mut().flatten() { d.exit(id); }
        Ok(())
    }

    /// Directional: `receiver` stops seeing `source`; nobody else is affected.
    pub fn ignore(&mut self, receiver: ReceiverId, source: SourceId) -> FlowResult<()> {
        if !self.receivers.contains_key(&receiver) { return Err(FlowError::UnknownReceiver(receiver)); }
        if !self.sources.contains(source) { return Err(FlowError::UnknownSource(source)); }
        self.registry.ignore(receiver, source);
        Ok(())
    }

    pub fn is_ignored(&self, receiver: ReceiverId, source: SourceId) -> bool { self.registry.is_ignored(receiver, source) }

    /* ---------- Step ---------- */

    pub fn step<R: RigidBodies>(&mut self, dt: f32, rigid: &mut R) -> StepReport {
        self.schedule.clear();
        self.tick = self.tick.wrapping_add(1);
        let ctx = StepCtx::new(dt, self.tick, self.time);
        let mut report = StepReport { tick: ctx.tick, dt, ..StepReport::default() };

        self.schedule.push(StepStage::Occupancy);
        self.update_occupancy(rigid);

        self.schedule.push(StepStage::Receivers);
        self.update_receivers(&ctx, rigid);

        self.schedule.push(StepStage::Aerodynamics);
        report.load_sum = self.compute_loads(&ctx, rigid);

        self.schedule.push(StepStage::ApplyLoads);
        report.unapplied = self.apply_loads(rigid);

        self.schedule.push(StepStage::Displacement);
        self.update_displacement();

        self.schedule.push(StepStage::Advect);
        self.advect_nodes(&ctx);

        self.schedule.push(StepStage::Lifetimes);
        report.expired = self.advance_lifetimes(dt);

        self.schedule.push(StepStage::Compact);
        let freed = self.nodes.compact();
        if freed > 0 { debug!("compacted {freed} vortex node slots"); }
        report.compacted = freed as u32;

        self.time += dt;
        report.receivers = self.receivers.len() as u32;
        report.bodies = self.bodies.len() as u32;
        report.sources = self.sources.len() as u32;
        report.live_nodes = self.nodes.live_count() as u32;
        report.hash = self.step_hash();
        report
    }

    fn update_occupancy<R: RigidBodies>(&mut self, rigid: &R) {
        for r in self.receivers.values_mut() {
            if let Some((pos, rot)) = r.rigid.and_then(|h| rigid.pose(h)) {
                r.pose.pos = pos;
                r.pose.rot = rot;
            }
            r.domains.clear();
            for d in self.domains.iter_mut().flatten() {
                if d.contains(r.pose.pos) {
                    if d.enter(r.id) { debug!("receiver {} entered domain {}", r.id, d.id); }
                    r.domains.push(d.id);
                } else if d.exit(r.id) {
                    debug!("receiver {} left domain {}", r.id, d.id);
                }
            }
        }
    }

    fn update_receivers<R: RigidBodies>(&mut self, ctx: &StepCtx, rigid: &R) {
        let field = FlowField {
            global: &self.global,
            domains: &self.domains,
            store: &self.sources,
            registry: &self.registry,
            query: FlowQuery { nodes: &self.nodes, time: ctx.time },
        };
        for r in self.receivers.values_mut() {
            let v = field.receiver_velocity(r.pose.pos, r.id, r.use_global, &r.domains);
            r.fluid = field.fluid_for(&r.domains);
            let own = r.rigid
                .filter(|h| rigid.pose(*h).is_some())
                .map(|h| Velocity { lin: rigid.velocity_at_point(h, r.pose.pos), ang: rigid.angular_velocity(h) });
            r.update_velocity(v, own, ctx.dt);
        }
    }

    fn compute_loads<R: RigidBodies>(&mut self, ctx: &StepCtx, rigid: &R) -> f32 {
        let mut sum = 0.0;
        for body in self.bodies.values_mut() {
            let Some(r) = self.receivers.get(&body.receiver) else { continue };
            body.set_pose_scale(r.pose.scale);
            let g = self.gravity.at(r.pose.pos);
            let mass = r.rigid.and_then(|h| rigid.mass(h)).unwrap_or(0.0);
            let boundary = free_surface(&self.domains, r.pose.pos, body.scaled_dimensions().max_element() * 0.5);
            body.sync(r, self.global.fluid, g, mass, ctx.dt, boundary);
            sum += body.compute_loads().force.length();
        }
        sum
    }

    fn apply_loads<R: RigidBodies>(&mut self, rigid: &mut R) -> u32 {
        let mut unapplied = 0;
        for body in self.bodies.values() {
            let Some(r) = self.receivers.get(&body.receiver) else { continue };
            match r.rigid.filter(|h| rigid.pose(*h).is_some()) {
                Some(h) => {
                    rigid.add_force_at_point(h, body.net_global.force, r.pose.pos);
                    rigid.add_torque(h, body.net_global.moment);
                }
                None => {
                    unapplied += 1;
                    if self.warned_unapplied.insert(body.receiver) {
                        warn!("body {} has no rigid body; its aerodynamic load is not applied", body.receiver);
                    }
                }
            }
        }
        unapplied
    }

    fn update_displacement(&mut self) {
        for body in self.bodies.values() {
            let Some(sid) = body.displacement else { continue };
            let (Some(r), Some(src)) = (self.receivers.get(&body.receiver), self.sources.get_mut(sid)) else { continue };
            src.pose = Pose::new(r.pose.pos, r.pose.rot);
            if let FlowKernel::Displacement(k) = &mut src.kernel {
                k.semi_axes = body.dimensions() * 0.5;
                k.strength = -r.relative_velocity_local;
            }
        }
    }

    fn advect_nodes(&mut self, ctx: &StepCtx) {
        self.advect.clear();
        {
            let field = FlowField {
                global: &self.global,
                domains: &self.domains,
                store: &self.sources,
                registry: &self.registry,
                query: FlowQuery { nodes: &self.nodes, time: ctx.time },
            };
            for (h, p) in self.nodes.dynamic_nodes() {
                self.advect.push((h, p + field.probe(p) * ctx.dt));
            }
        }
        for (h, p) in self.advect.drain(..) {
            let moved = self.nodes.set_position(h, p);
            debug_assert!(moved.is_ok(), "advected node {h:?} is not live");
        }
    }

    fn advance_lifetimes(&mut self, dt: f32) -> u32 {
        let mut expired = std::mem::take(&mut self.expired);
        expired.clear();
        for s in self.sources.iter_mut() {
            let Some(l) = &mut s.lifetime else { continue };
            match l.advance(dt) {
                Some(k) => s.strength_scale = k,
                None => expired.push(s.id),
            }
        }
        for id in &expired {
            if let Some(s) = self.destroy_source(*id) {
                debug!("{} source {} expired", s.kernel.kind_name(), id);
            }
        }
        let n = expired.len() as u32;
        self.expired = expired;
        n
    }

    /// Digest of everything observable after the last tick.
    pub fn step_hash(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        h.update_u64(self.tick);
        h.update_bytes(&self.schedule.digest());
        for r in self.receivers.values() {
            h.update_u32(r.id.0);
            hash_pose(&mut h, &r.pose);
            hash_vec3(&mut h, &r.relative_velocity);
            for d in &r.domains { h.update_u32(d.0); }
        }
        for b in self.bodies.values() {
            h.update_u32(b.receiver.0);
            hash_vec3(&mut h, &b.net.force);
            hash_vec3(&mut h, &b.net.moment);
        }
        for s in self.sources.iter() {
            h.update_u32(s.id.0);
            hash_f32(&mut h, s.strength_scale);
            hash_vec3(&mut h, &s.pose.pos);
            hash_quat(&mut h, &s.pose.rot);
        }
        for (n, p) in self.nodes.live_nodes() {
            h.update_u32(n.index);
            hash_vec3(&mut h, &p);
        }
        h.finalize()
    }
}

/// Surface of the highest-priority free-surface domain near `p` (ties: lowest id).
fn free_surface(domains: &[Option<FluidDomain>], p: Vec3, reach: f32) -> Option<FluidBoundary> {
    domains.iter().flatten()
        .filter(|d| d.free_surface && d.bounds().expanded(reach).contains_point(p))
        .max_by(|a, b| a.priority.cmp(&b.priority).then(b.id.cmp(&a.id)))
        .and_then(|d| d.boundary())
}
