use riftflow_core::types::{Mat3, Velocity, Vec3};
use riftflow_core::{Gravity, Quat, RigidBodies, RigidHandle, Scalar};
use riftflow_geom::MassProps;

/// Input descriptor when creating a body.
#[derive(Copy, Clone, Debug)]
pub struct BodyDesc {
    pub pos: Vec3,
    pub rot: Quat,
    pub vel: Velocity,
    pub mass: MassProps,
    pub dynamic: bool,
}

impl BodyDesc {
    pub fn dynamic(pos: Vec3, mass: MassProps) -> Self {
        Self { pos, rot: Quat::IDENTITY, vel: Velocity::default(), mass, dynamic: true }
    }
    pub fn fixed(pos: Vec3) -> Self {
        Self { pos, rot: Quat::IDENTITY, vel: Velocity::default(), mass: MassProps::infinite(), dynamic: false }
    }
    pub fn with_rot(mut self, rot: Quat) -> Self { self.rot = rot; self }
    pub fn with_vel(mut self, vel: Velocity) -> Self { self.vel = vel; self }
}

/// SoA body storage with deterministic handle = index semantics.
///
/// Forces and torques accumulate between `integrate_all` calls and are
/// cleared by it.
pub struct Bodies {
    pos: Vec<Vec3>,
    rot: Vec<Quat>,
    linvel: Vec<Vec3>,
    angvel: Vec<Vec3>,
    mass: Vec<Scalar>,
    inv_mass: Vec<Scalar>,
    dynamic: Vec<bool>,
    inv_inertia_local: Vec<Mat3>,
    force: Vec<Vec3>,
    torque: Vec<Vec3>,
}

impl Bodies {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            pos:     Vec::with_capacity(cap),
            rot:     Vec::with_capacity(cap),
            linvel:  Vec::with_capacity(cap),
            angvel:  Vec::with_capacity(cap),
            mass:    Vec::with_capacity(cap),
            inv_mass: Vec::with_capacity(cap),
            dynamic: Vec::with_capacity(cap),
            inv_inertia_local: Vec::with_capacity(cap),
            force:   Vec::with_capacity(cap),
            torque:  Vec::with_capacity(cap),
        }
    }

    pub fn add(&mut self, desc: BodyDesc) -> RigidHandle {
        let dynamic = desc.dynamic && desc.mass.inv_mass > 0.0;
        self.pos.push(desc.pos);
        self.rot.push(desc.rot.normalize());
        self.linvel.push(desc.vel.lin);
        self.angvel.push(desc.vel.ang);
        self.mass.push(desc.mass.mass);
        self.inv_mass.push(if dynamic { desc.mass.inv_mass } else { 0.0 });
        self.dynamic.push(dynamic);
        let inv_i = if dynamic && desc.mass.inertia.determinant().abs() > 0.0 { desc.mass.inertia.inverse() } else { Mat3::ZERO };
        self.inv_inertia_local.push(inv_i);
        self.force.push(Vec3::ZERO);
        self.torque.push(Vec3::ZERO);
        RigidHandle((self.pos.len() as u32) - 1)
    }

    #[inline] pub fn len(&self) -> usize { self.pos.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.pos.is_empty() }
    #[inline] fn idx(&self, h: RigidHandle) -> Option<usize> { let i = h.0 as usize; (i < self.len()).then_some(i) }

    /// Semi-implicit Euler; clears the accumulators.
    pub fn integrate_all(&mut self, gravity: &Gravity, dt: Scalar) {
        for i in 0..self.len() {
            let (f, t) = (self.force[i], self.torque[i]);
            self.force[i] = Vec3::ZERO;
            self.torque[i] = Vec3::ZERO;
            if !self.dynamic[i] { continue; }

            self.linvel[i] += (gravity.at(self.pos[i]) + f * self.inv_mass[i]) * dt;
            self.pos[i]    += self.linvel[i] * dt;

            let inv_i_w = self.inv_inertia_world(i);
            self.angvel[i] += inv_i_w * t * dt;
            self.apply_orientation_delta(i, self.angvel[i] * dt);
        }
    }

    // -------- Accessors used by tests/demo/CLI --------
    pub fn position(&self, h: RigidHandle) -> Option<Vec3> { self.idx(h).map(|i| self.pos[i]) }
    pub fn rotation(&self, h: RigidHandle) -> Option<Quat> { self.idx(h).map(|i| self.rot[i]) }

    pub fn vel(&self, h: RigidHandle) -> Velocity {
        self.idx(h).map_or(Velocity::default(), |i| Velocity { lin: self.linvel[i], ang: self.angvel[i] })
    }
    pub fn set_vel(&mut self, h: RigidHandle, v: Velocity) {
        if let Some(i) = self.idx(h) { self.linvel[i] = v.lin; self.angvel[i] = v.ang; }
    }
    pub fn set_pose(&mut self, h: RigidHandle, pos: Vec3, rot: Quat) {
        if let Some(i) = self.idx(h) { self.pos[i] = pos; self.rot[i] = rot.normalize(); }
    }

    /// Accumulated force and torque since the last integration.
    pub fn pending_load(&self, h: RigidHandle) -> Option<(Vec3, Vec3)> {
        self.idx(h).map(|i| (self.force[i], self.torque[i]))
    }

    #[inline] pub fn is_dynamic(&self, h: RigidHandle) -> bool { self.idx(h).map_or(false, |i| self.dynamic[i]) }

    /// World-space inverse inertia: R * I^-1_local * R^T.
    fn inv_inertia_world(&self, i: usize) -> Mat3 {
        if self.inv_mass[i] == 0.0 { return Mat3::ZERO; }
        let r = Mat3::from_quat(self.rot[i]);
        r * self.inv_inertia_local[i] * r.transpose()
    }

    /// Small-angle orientation update (world space).
    fn apply_orientation_delta(&mut self, i: usize, dtheta_world: Vec3) {
        if dtheta_world.length_squared() <= 0.0 { return; }
        let dq = Quat::from_xyzw(dtheta_world.x * 0.5, dtheta_world.y * 0.5, dtheta_world.z * 0.5, 1.0).normalize();
        self.rot[i] = (dq * self.rot[i]).normalize();
    }

    // Stable order for hashing/printing
    pub fn handles(&self) -> impl ExactSizeIterator<Item = RigidHandle> + '_ {
        (0..self.len() as u32).map(RigidHandle)
    }
}

impl Default for Bodies {
    fn default() -> Self { Self::with_capacity(0) }
}

impl RigidBodies for Bodies {
    fn pose(&self, h: RigidHandle) -> Option<(Vec3, Quat)> { self.idx(h).map(|i| (self.pos[i], self.rot[i])) }

    fn velocity_at_point(&self, h: RigidHandle, p: Vec3) -> Vec3 {
        self.idx(h).map_or(Vec3::ZERO, |i| self.linvel[i] + self.angvel[i].cross(p - self.pos[i]))
    }

    fn angular_velocity(&self, h: RigidHandle) -> Vec3 { self.idx(h).map_or(Vec3::ZERO, |i| self.angvel[i]) }

    fn add_force_at_point(&mut self, h: RigidHandle, force: Vec3, p: Vec3) {
        if let Some(i) = self.idx(h) {
            self.force[i] += force;
            self.torque[i] += (p - self.pos[i]).cross(force);
        }
    }

    fn add_torque(&mut self, h: RigidHandle, torque: Vec3) {
        if let Some(i) = self.idx(h) { self.torque[i] += torque; }
    }

    fn mass(&self, h: RigidHandle) -> Option<f32> { self.idx(h).map(|i| self.mass[i]) }
}
