/// Per-tick context handed to kernels that depend on time.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepCtx {
    pub dt: f32,
    pub tick: u64,
    /// Simulation time at the start of the tick (s).
    pub time: f32,
}

impl StepCtx {
    pub fn new(dt: f32, tick: u64, time: f32) -> Self { Self { dt, tick, time } }
}
