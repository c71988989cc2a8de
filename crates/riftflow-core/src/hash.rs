use blake3::Hasher;
use glam::Quat;
use crate::types::{Pose, Vec3};

/// Incremental blake3 digest over the observable state of a tick.
pub struct StepHasher(Hasher);

impl Default for StepHasher { fn default() -> Self { Self::new() } }

impl StepHasher {
    pub fn new() -> Self { StepHasher(Hasher::new()) }
    pub fn update_bytes(&mut self, bytes: &[u8]) { self.0.update(bytes); }
    pub fn update_u32(&mut self, v: u32) { self.0.update(&v.to_le_bytes()); }
    pub fn update_u64(&mut self, v: u64) { self.0.update(&v.to_le_bytes()); }
    pub fn finalize(self) -> [u8; 32] { *self.0.finalize().as_bytes() }
}

#[inline]
pub fn hash_f32(h: &mut StepHasher, v: f32) { h.update_bytes(&v.to_le_bytes()); }

#[inline]
pub fn hash_vec3(h: &mut StepHasher, v: &Vec3) {
    for c in [v.x, v.y, v.z] { hash_f32(h, c); }
}

#[inline]
pub fn hash_quat(h: &mut StepHasher, q: &Quat) {
    for c in [q.x, q.y, q.z, q.w] { hash_f32(h, c); }
}

#[inline]
pub fn hash_pose(h: &mut StepHasher, p: &Pose) {
    hash_vec3(h, &p.pos);
    hash_quat(h, &p.rot);
    hash_vec3(h, &p.scale);
}
