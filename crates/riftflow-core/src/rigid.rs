use glam::Quat;
use crate::ids::RigidHandle;
use crate::types::Vec3;

/// The host's rigid-body store as seen by the flow world.
///
/// Receivers bound to a handle read pose and velocity from here; aerodynamic
/// bodies push their net load back through `add_force_at_point`/`add_torque`.
/// All vectors are global frame.
pub trait RigidBodies {
    fn pose(&self, h: RigidHandle) -> Option<(Vec3, Quat)>;
    fn velocity_at_point(&self, h: RigidHandle, p: Vec3) -> Vec3;
    fn angular_velocity(&self, h: RigidHandle) -> Vec3;
    fn add_force_at_point(&mut self, h: RigidHandle, force: Vec3, p: Vec3);
    fn add_torque(&mut self, h: RigidHandle, torque: Vec3);
    fn mass(&self, h: RigidHandle) -> Option<f32>;
}

/// No rigid bodies at all: every receiver is posed kinematically.
#[derive(Copy, Clone, Debug, Default)]
pub struct Kinematic;

impl RigidBodies for Kinematic {
    fn pose(&self, _h: RigidHandle) -> Option<(Vec3, Quat)> { None }
    fn velocity_at_point(&self, _h: RigidHandle, _p: Vec3) -> Vec3 { Vec3::ZERO }
    fn angular_velocity(&self, _h: RigidHandle) -> Vec3 { Vec3::ZERO }
    fn add_force_at_point(&mut self, _h: RigidHandle, _force: Vec3, _p: Vec3) {}
    fn add_torque(&mut self, _h: RigidHandle, _torque: Vec3) {}
    fn mass(&self, _h: RigidHandle) -> Option<f32> { None }
}
