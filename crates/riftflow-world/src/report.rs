use serde::Serialize;

/// Minimal per-step summary.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StepReport {
    pub tick: u64,
    pub dt: f32,
    pub receivers: u32,
    pub bodies: u32,
    pub sources: u32,
    pub live_nodes: u32,
    /// Sources destroyed at end of life this tick.
    pub expired: u32,
    /// Vortex node slots recycled this tick.
    pub compacted: u32,
    /// Bodies whose load could not be applied (no rigid body).
    pub unapplied: u32,
    /// Sum of |net force| over all bodies, N.
    pub load_sum: f32,
    pub hash: [u8; 32],
}
