pub type Scalar = f32;

/// Magnitudes below this are treated as zero by every per-tick kernel.
pub const EPS: Scalar = 1.0e-6;
