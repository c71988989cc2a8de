use std::fmt;

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use riftflow_core::{FlowError, FlowResult, ReceiverId, Vec3, XorShift64, EPS};

/// Distance falloff shared by point, line and area sources.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    #[default]
    Constant,
    Inverse,
    InverseSquare,
}

impl Falloff {
    pub fn exponent(self) -> i32 {
        match self { Falloff::Constant => 0, Falloff::Inverse => 1, Falloff::InverseSquare => 2 }
    }

    /// `strength / r^n`; callers clamp `r` away from zero.
    #[inline]
    pub fn apply(self, strength: f32, r: f32) -> f32 {
        match self {
            Falloff::Constant => strength,
            Falloff::Inverse => strength / r,
            Falloff::InverseSquare => strength / (r * r),
        }
    }
}

fn default_core() -> f32 { 0.1 }
fn full_sphere() -> f32 { 180.0 }
fn default_fade() -> f32 { 1.0 }

/* ---------------- point ---------------- */

/// Radial flow out of (or into, for negative strength) the local origin,
/// optionally restricted to a cone about local +Z.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    pub strength: f32,
    #[serde(default)]
    pub falloff: Falloff,
    #[serde(default = "default_core")]
    pub core_radius: f32,
    #[serde(default = "full_sphere")]
    pub semi_angle_deg: f32,
}

impl PointSource {
    pub fn new(strength: f32, falloff: Falloff) -> Self {
        Self { strength, falloff, core_radius: default_core(), semi_angle_deg: full_sphere() }
    }
    pub fn with_cone(mut self, semi_angle_deg: f32) -> Self { self.semi_angle_deg = semi_angle_deg; self }

    pub fn validate(&self) -> FlowResult<()> {
        if !(self.core_radius > 0.0) {
            return Err(FlowError::invalid("point core_radius", self.core_radius, "> 0"));
        }
        if !(0.0..=180.0).contains(&self.semi_angle_deg) {
            return Err(FlowError::invalid("point semi_angle_deg", self.semi_angle_deg, "0..=180"));
        }
        Ok(())
    }

    pub fn velocity_local(&self, p: Vec3) -> Vec3 {
        let r = p.length();
        if r <= EPS { return Vec3::ZERO; }
        let dir = p / r;
        if self.semi_angle_deg < 180.0 && dir.z < self.semi_angle_deg.to_radians().cos() {
            return Vec3::ZERO;
        }
        dir * self.falloff.apply(self.strength, r.max(self.core_radius))
    }
}

/* ---------------- line ---------------- */

/// Radial flow away from a segment of `length` centred on the origin along local Z.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSource {
    pub strength: f32,
    #[serde(default)]
    pub falloff: Falloff,
    #[serde(default = "default_core")]
    pub core_radius: f32,
    pub length: f32,
}

impl LineSource {
    pub fn validate(&self) -> FlowResult<()> {
        if !(self.core_radius > 0.0) {
            return Err(FlowError::invalid("line core_radius", self.core_radius, "> 0"));
        }
        if !(self.length >= 0.0) {
            return Err(FlowError::invalid("line length", self.length, ">= 0"));
        }
        Ok(())
    }

    pub fn velocity_local(&self, p: Vec3) -> Vec3 {
        if p.z.abs() > self.length * 0.5 { return Vec3::ZERO; }
        let radial = Vec3::new(p.x, p.y, 0.0);
        let r = radial.length();
        if r <= EPS { return Vec3::ZERO; }
        (radial / r) * self.falloff.apply(self.strength, r.max(self.core_radius))
    }
}

/* ---------------- area ---------------- */

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AreaShape {
    Disc { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl AreaShape {
    #[inline]
    fn covers(&self, x: f32, y: f32) -> bool {
        match *self {
            AreaShape::Disc { radius } => x * x + y * y <= radius * radius,
            AreaShape::Rect { width, height } => x.abs() <= width * 0.5 && y.abs() <= height * 0.5,
        }
    }
}

/// Directed flow along local +Z from a disc or rectangle in the local XY plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaSource {
    pub strength: f32,
    pub shape: AreaShape,
    #[serde(default)]
    pub falloff: Falloff,
    #[serde(default = "default_fade")]
    pub fade_length: f32,
}

impl AreaSource {
    pub fn validate(&self) -> FlowResult<()> {
        if !(self.fade_length > 0.0) {
            return Err(FlowError::invalid("area fade_length", self.fade_length, "> 0"));
        }
        match self.shape {
            AreaShape::Disc { radius } if !(radius > 0.0) =>
                Err(FlowError::invalid("area disc radius", radius, "> 0")),
            AreaShape::Rect { width, height } if !(width > 0.0 && height > 0.0) =>
                Err(FlowError::invalid("area rect size", width.min(height), "> 0")),
            _ => Ok(()),
        }
    }

    pub fn velocity_local(&self, p: Vec3) -> Vec3 {
        if p.z < 0.0 || !self.shape.covers(p.x, p.y) { return Vec3::ZERO; }
        let fade = self.falloff.apply(1.0, 1.0 + p.z / self.fade_length);
        Vec3::Z * (self.strength * fade)
    }
}

/* ---------------- uniform + turbulence ---------------- */

/// One Perlin field per velocity axis.
#[derive(Clone)]
pub struct TurbulenceNoise([Perlin; 3]);

impl TurbulenceNoise {
    pub fn new(seed: u32) -> Self {
        let [a, b, c] = XorShift64::axis_seeds(seed);
        Self([Perlin::new(a), Perlin::new(b), Perlin::new(c)])
    }
}

impl fmt::Debug for TurbulenceNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("TurbulenceNoise") }
}

/// Coherent noise layered on top of a uniform flow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turbulence {
    pub amplitude: Vec3,
    /// Metres per noise period.
    pub spatial_scale: f32,
    /// Noise periods per second.
    pub time_scale: f32,
    #[serde(default)]
    pub seed: u32,
    /// When set, the component along this normal is removed.
    #[serde(default)]
    pub plane_normal: Option<Vec3>,
    #[serde(skip)]
    noise: Option<TurbulenceNoise>,
}

impl Turbulence {
    pub fn new(amplitude: Vec3, spatial_scale: f32, time_scale: f32, seed: u32) -> Self {
        Self { amplitude, spatial_scale, time_scale, seed, plane_normal: None, noise: Some(TurbulenceNoise::new(seed)) }
    }

    pub fn in_plane(mut self, normal: Vec3) -> Self { self.plane_normal = Some(normal); self }

    /// Builds the noise tables; needed after deserialisation.
    pub fn prepare(&mut self) {
        if self.noise.is_none() { self.noise = Some(TurbulenceNoise::new(self.seed)); }
    }

    pub fn validate(&self) -> FlowResult<()> {
        if !(self.spatial_scale > 0.0) {
            return Err(FlowError::invalid("turbulence spatial_scale", self.spatial_scale, "> 0"));
        }
        if !(self.time_scale >= 0.0) {
            return Err(FlowError::invalid("turbulence time_scale", self.time_scale, ">= 0"));
        }
        Ok(())
    }

    pub fn sample(&self, p: Vec3, time: f32) -> Vec3 {
        let Some(TurbulenceNoise(axes)) = &self.noise else { return Vec3::ZERO };
        let s = self.spatial_scale as f64;
        let q = [p.x as f64 / s, p.y as f64 / s, p.z as f64 / s, (time * self.time_scale) as f64];
        let raw = Vec3::new(axes[0].get(q) as f32, axes[1].get(q) as f32, axes[2].get(q) as f32);
        let v = raw * self.amplitude;
        match self.plane_normal.map(|n| n.normalize_or_zero()) {
            Some(n) if n != Vec3::ZERO => v - n * v.dot(n),
            _ => v,
        }
    }
}

/// Spatially constant flow. Direction from azimuth (about +Y, from +Z toward +X)
/// and elevation (toward +Y).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UniformFlow {
    pub speed: f32,
    #[serde(default)]
    pub azimuth_deg: f32,
    #[serde(default)]
    pub elevation_deg: f32,
    #[serde(default)]
    pub turbulence: Option<Turbulence>,
}

impl UniformFlow {
    pub fn new(speed: f32, azimuth_deg: f32, elevation_deg: f32) -> Self {
        Self { speed, azimuth_deg, elevation_deg, turbulence: None }
    }
    pub fn with_turbulence(mut self, t: Turbulence) -> Self { self.turbulence = Some(t); self }

    pub fn direction(&self) -> Vec3 {
        let (az, el) = (self.azimuth_deg.to_radians(), self.elevation_deg.to_radians());
        Vec3::new(el.cos() * az.sin(), el.sin(), el.cos() * az.cos())
    }

    pub fn validate(&self) -> FlowResult<()> {
        match &self.turbulence { Some(t) => t.validate(), None => Ok(()) }
    }

    pub fn prepare(&mut self) {
        if let Some(t) = &mut self.turbulence { t.prepare(); }
    }

    /// Global-frame velocity; ignores the owning source's pose.
    pub fn velocity(&self, p: Vec3, time: f32) -> Vec3 {
        let base = self.direction() * self.speed;
        match &self.turbulence {
            Some(t) => base + t.sample(p, time),
            None => base,
        }
    }
}

/* ---------------- displacement ---------------- */

/// Potential-flow doublet approximating the flow pushed aside by a moving
/// ellipsoid. Evaluated in the body frame scaled by `semi_axes` so the surface
/// is the unit sphere; zero inside.
///
/// `strength` is rewritten every tick from the body's local relative velocity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplacementBody {
    pub body: ReceiverId,
    pub semi_axes: Vec3,
    #[serde(default)]
    pub strength: Vec3,
}

impl DisplacementBody {
    pub fn new(body: ReceiverId, semi_axes: Vec3) -> Self { Self { body, semi_axes, strength: Vec3::ZERO } }

    pub fn validate(&self) -> FlowResult<()> {
        let m = self.semi_axes.min_element();
        if !(m > 0.0) { return Err(FlowError::invalid("displacement semi_axes", m, "> 0")); }
        Ok(())
    }

    pub fn velocity_local(&self, p: Vec3) -> Vec3 {
        if self.semi_axes.min_element() <= EPS { return Vec3::ZERO; }
        let q = p / self.semi_axes;
        let r2_total = q.length_squared();
        if r2_total < 1.0 { return Vec3::ZERO; }
        let den = r2_total * r2_total;
        let mut v = Vec3::ZERO;
        for (i, axis) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().enumerate() {
            let s = self.strength[i];
            if s == 0.0 { continue; }
            let x = q[i];
            let radial = q - axis * x;
            let r2 = radial.length_squared();
            let u = (r2 - x * x) / den;
            let w = -2.0 * x / den;
            v += (axis * u + radial * w) * s;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool { (a - b).length() < 1e-4 }

    #[test] fn point_falloff_and_core() {
        let k = PointSource::new(2.0, Falloff::InverseSquare);
        assert!(close(k.velocity_local(Vec3::new(2.0, 0.0, 0.0)), Vec3::new(0.5, 0.0, 0.0)));
        // inside the core the distance is clamped
        let v = k.velocity_local(Vec3::new(0.0, 0.01, 0.0));
        assert!((v.y - 2.0 / (0.1 * 0.1)).abs() < 1e-2);
        assert_eq!(k.velocity_local(Vec3::ZERO), Vec3::ZERO);
    }

    #[test] fn point_cone_cuts_off() {
        let k = PointSource::new(1.0, Falloff::Constant).with_cone(30.0);
        assert!(k.velocity_local(Vec3::new(0.0, 0.0, 3.0)).z > 0.0);
        assert_eq!(k.velocity_local(Vec3::new(3.0, 0.0, 0.1)), Vec3::ZERO);
        assert_eq!(k.velocity_local(Vec3::new(0.0, 0.0, -3.0)), Vec3::ZERO);
    }

    #[test] fn line_is_radial_and_bounded() {
        let k = LineSource { strength: 1.0, falloff: Falloff::Inverse, core_radius: 0.1, length: 2.0 };
        assert!(close(k.velocity_local(Vec3::new(0.0, 2.0, 0.5)), Vec3::new(0.0, 0.5, 0.0)));
        assert_eq!(k.velocity_local(Vec3::new(0.0, 2.0, 1.5)), Vec3::ZERO);
    }

    #[test] fn area_only_in_front_of_footprint() {
        let k = AreaSource { strength: 3.0, shape: AreaShape::Disc { radius: 1.0 }, falloff: Falloff::Inverse, fade_length: 2.0 };
        assert!(close(k.velocity_local(Vec3::new(0.0, 0.0, 0.0)), Vec3::new(0.0, 0.0, 3.0)));
        assert!(close(k.velocity_local(Vec3::new(0.5, 0.0, 2.0)), Vec3::new(0.0, 0.0, 1.5)));
        assert_eq!(k.velocity_local(Vec3::new(0.0, 0.0, -0.1)), Vec3::ZERO);
        assert_eq!(k.velocity_local(Vec3::new(1.5, 0.0, 1.0)), Vec3::ZERO);
        assert!(k.validate().is_ok());
        let bad = AreaSource { fade_length: 0.0, ..k };
        assert!(bad.validate().is_err());
    }

    #[test] fn uniform_direction_convention() {
        assert!(close(UniformFlow::new(1.0, 0.0, 0.0).direction(), Vec3::Z));
        assert!(close(UniformFlow::new(1.0, 90.0, 0.0).direction(), Vec3::X));
        assert!(close(UniformFlow::new(1.0, 0.0, 90.0).direction(), Vec3::Y));
    }

    #[test] fn turbulence_is_deterministic_and_planar() {
        let t = Turbulence::new(Vec3::splat(2.0), 3.0, 0.5, 42).in_plane(Vec3::Y);
        let p = Vec3::new(1.3, 0.7, -2.1);
        let a = t.sample(p, 1.25);
        let b = Turbulence::new(Vec3::splat(2.0), 3.0, 0.5, 42).in_plane(Vec3::Y).sample(p, 1.25);
        assert_eq!(a, b);
        assert!(a.y.abs() < 1e-6);
    }

    #[test] fn displacement_cancels_normal_velocity_at_surface() {
        // body moving +X at 2 m/s through still fluid: relative velocity +2 X, strength -2 X
        let mut k = DisplacementBody::new(ReceiverId(1), Vec3::new(2.0, 1.0, 1.0));
        k.strength = Vec3::new(-2.0, 0.0, 0.0);
        let nose = k.velocity_local(Vec3::new(2.0, 0.0, 0.0));
        assert!(close(nose, Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(k.velocity_local(Vec3::new(0.5, 0.0, 0.0)), Vec3::ZERO);
        let far = k.velocity_local(Vec3::new(200.0, 0.0, 0.0));
        assert!(far.length() < 1e-3);
    }
}
