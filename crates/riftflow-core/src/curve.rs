use serde::{Deserialize, Serialize};

/// Strength-over-life curve, evaluated on normalised age `t` in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrengthCurve {
    Constant,
    /// 1 -> 0.
    FadeOut,
    /// 0 -> 1 -> 0 (half sine).
    FadeInOut,
    /// Polynomial c0 + c1 t + ... + c4 t^4.
    Custom { coeffs: [f32; 5] },
}

impl Default for StrengthCurve { fn default() -> Self { StrengthCurve::Constant } }

impl StrengthCurve {
    pub fn eval(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            StrengthCurve::Constant => 1.0,
            StrengthCurve::FadeOut => 1.0 - t,
            StrengthCurve::FadeInOut => (core::f32::consts::PI * t).sin(),
            StrengthCurve::Custom { coeffs: p } => { // Horner
                (((p[4]*t + p[3])*t + p[2])*t + p[1])*t + p[0]
            }
        }
    }
}

/// Finite life of a temporal source.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    /// Seconds.
    pub span: f32,
    #[serde(default)]
    pub age: f32,
    #[serde(default)]
    pub curve: StrengthCurve,
}

impl Lifetime {
    pub fn new(span: f32, curve: StrengthCurve) -> Self { Self { span, age: 0.0, curve } }

    /// Advance by `dt`; returns the new strength scale, or `None` once expired.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        self.age += dt;
        if self.age > self.span { return None; }
        let t = if self.span > 0.0 { self.age / self.span } else { 1.0 };
        Some(self.curve.eval(t))
    }

    pub fn strength_now(&self) -> f32 {
        let t = if self.span > 0.0 { self.age / self.span } else { 1.0 };
        self.curve.eval(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn fade_out_runs_to_expiry() {
        let mut l = Lifetime::new(1.0, StrengthCurve::FadeOut);
        let s = l.advance(0.25).unwrap();
        assert!((s - 0.75).abs() < 1e-6);
        assert!(l.advance(0.5).is_some());
        assert!(l.advance(0.5).is_none());
    }

    #[test] fn custom_poly_is_clamped_in_t() {
        let c = StrengthCurve::Custom { coeffs: [0.0, 1.0, 0.0, 0.0, 0.0] };
        assert_eq!(c.eval(2.0), 1.0);
        assert_eq!(c.eval(-1.0), 0.0);
    }
}
