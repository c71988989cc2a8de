use riftflow_core::{DomainId, FluidProps, Pose, Quat, ReceiverId, RigidHandle, Vec3, Velocity, EPS};

/// Anything that samples the flow. Holds the velocity bookkeeping the
/// aerodynamic models read each tick.
#[derive(Clone, Debug)]
pub struct FlowReceiver {
    pub id: ReceiverId,
    pub pose: Pose,
    pub rigid: Option<RigidHandle>,
    /// Sample global sources in addition to occupied domains.
    pub use_global: bool,
    /// Occupied domains, sorted by id.
    pub domains: Vec<DomainId>,
    pub fluid: FluidProps,

    pub fluid_velocity: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Own velocity minus fluid velocity, global frame.
    pub relative_velocity: Vec3,
    pub relative_velocity_local: Vec3,
    pub angular_velocity_local: Vec3,

    prev_pose: Option<Pose>,
}

impl FlowReceiver {
    pub fn new(id: ReceiverId, pose: Pose) -> Self {
        Self {
            id, pose, rigid: None, use_global: true, domains: Vec::new(), fluid: FluidProps::AIR,
            fluid_velocity: Vec3::ZERO, velocity: Vec3::ZERO, angular_velocity: Vec3::ZERO,
            relative_velocity: Vec3::ZERO, relative_velocity_local: Vec3::ZERO, angular_velocity_local: Vec3::ZERO,
            prev_pose: None,
        }
    }

    pub fn with_rigid(mut self, h: RigidHandle) -> Self { self.rigid = Some(h); self }
    pub fn with_global(mut self, on: bool) -> Self { self.use_global = on; self }

    /// Refresh velocities from this tick's fluid sample.
    ///
    /// Own motion comes from the rigid body when one is attached, otherwise
    /// from the pose change since the previous call.
    pub fn update_velocity(&mut self, fluid_velocity: Vec3, rigid: Option<Velocity>, dt: f32) {
        let (lin, ang) = match (rigid, self.prev_pose) {
            (Some(v), _) => (v.lin, v.ang),
            (None, Some(prev)) if dt > EPS => finite_difference(&prev, &self.pose, dt),
            _ => (Vec3::ZERO, Vec3::ZERO),
        };
        self.fluid_velocity = fluid_velocity;
        self.velocity = lin;
        self.angular_velocity = ang;
        self.relative_velocity = lin - fluid_velocity;
        self.relative_velocity_local = self.pose.inverse_transform_direction(self.relative_velocity);
        self.angular_velocity_local = self.pose.inverse_transform_direction(ang);
        self.prev_pose = Some(self.pose);
    }

    /// Point on the receiver in global frame, rotation and translation only.
    #[inline]
    pub fn point_global(&self, local: Vec3) -> Vec3 { self.pose.pos + self.pose.rot * local }
}

fn finite_difference(prev: &Pose, now: &Pose, dt: f32) -> (Vec3, Vec3) {
    let lin = (now.pos - prev.pos) / dt;
    let mut dq: Quat = now.rot * prev.rot.inverse();
    if dq.w < 0.0 { dq = -dq; }
    let (axis, angle) = dq.to_axis_angle();
    let ang = if angle.abs() > EPS { Vec3::from(axis) * (angle / dt) } else { Vec3::ZERO };
    (lin, ang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn relative_velocity_from_rigid_body() {
        let mut r = FlowReceiver::new(ReceiverId(1), Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)));
        r.update_velocity(Vec3::new(0.0, 0.0, 5.0), Some(Velocity { lin: Vec3::new(0.0, 0.0, 2.0), ang: Vec3::ZERO }), 0.01);
        assert!((r.relative_velocity - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-6);
        // global -Z is local +X after a quarter turn about Y
        assert!((r.relative_velocity_local - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test] fn kinematic_receiver_uses_pose_history() {
        let mut r = FlowReceiver::new(ReceiverId(1), Pose::default());
        r.update_velocity(Vec3::ZERO, None, 0.1);
        assert_eq!(r.velocity, Vec3::ZERO);
        r.pose = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_z(0.1));
        r.update_velocity(Vec3::ZERO, None, 0.1);
        assert!((r.velocity - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
        assert!((r.angular_velocity - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-3);
        assert!((r.relative_velocity - r.velocity).length() < 1e-6);
    }
}
