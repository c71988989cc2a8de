use riftflow_core::{schedule_digest, StepStage};

/// Stages executed during the current tick, in order.
#[derive(Clone, Debug, Default)]
pub struct ScheduleRecorder { stages: Vec<StepStage> }

impl ScheduleRecorder {
    pub fn new() -> Self { Self { stages: Vec::with_capacity(8) } }
    pub fn push(&mut self, s: StepStage) { self.stages.push(s); }
    pub fn clear(&mut self) { self.stages.clear(); }
    pub fn stages(&self) -> &[StepStage] { &self.stages }
    pub fn digest(&self) -> [u8; 32] { schedule_digest(&self.stages) }
}
