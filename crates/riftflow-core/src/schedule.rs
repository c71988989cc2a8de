use crate::StepHasher;

/// Ordered stages of one flow tick. Sources and domains are settled before any
/// receiver samples velocity; force consumers run last.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepStage {
    Occupancy = 1,
    Receivers = 2,
    Aerodynamics = 3,
    ApplyLoads = 4,
    Displacement = 5,
    Advect = 6,
    Lifetimes = 7,
    Compact = 8,
}

pub fn schedule_digest(stages: &[StepStage]) -> [u8; 32] {
    let mut h = StepHasher::new();
    for s in stages { h.update_bytes(&[*s as u8]); }
    h.finalize()
}
