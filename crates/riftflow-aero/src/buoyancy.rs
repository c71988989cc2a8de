use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use riftflow_core::{Vec3, EPS};
use riftflow_geom::{ellipsoid_volume, unit_cap};

use crate::body::BodyState;
use crate::load::AeroLoad;

const UNIT_SPHERE_VOLUME: f32 = 4.0 / 3.0 * PI;

/// Archimedes force on the whole ellipsoid in the body's current fluid.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Buoyancy {
    #[serde(skip)]
    volume: f32,
}

impl Buoyancy {
    pub fn update_dimensions(&mut self, s: &BodyState) { self.volume = ellipsoid_volume(s.dimensions); }
    pub fn volume(&self) -> f32 { self.volume }

    pub fn get_load(&mut self, s: &BodyState) -> AeroLoad {
        AeroLoad::force(-s.gravity * (s.fluid.density * self.volume))
    }
}

/// One side of the free surface: volume (m^3) and centroid (body-local).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Portion { volume: f32, centroid: Vec3 }

/// Buoyancy of an ellipsoid cut by a free surface, with added-mass drag on
/// each portion as it grows.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedBuoyancy {
    /// Weight of the previous load when the wet side switches between cap and remainder.
    pub flip_blend: f32,
    #[serde(skip)]
    semi_axes: Vec3,
    #[serde(skip)]
    volume_scale: f32,
    #[serde(skip)]
    prev: Option<(f32, f32)>,
    #[serde(skip)]
    prev_cap_wet: Option<bool>,
    #[serde(skip)]
    prev_load: AeroLoad,
    /// Wet volume of the last pass, m^3.
    #[serde(skip)]
    pub wet_volume: f32,
    #[serde(skip)]
    pub dry_volume: f32,
}

impl Default for AdvancedBuoyancy {
    fn default() -> Self {
        Self {
            flip_blend: 0.5, semi_axes: Vec3::ZERO, volume_scale: 0.0, prev: None, prev_cap_wet: None,
            prev_load: AeroLoad::ZERO, wet_volume: 0.0, dry_volume: 0.0,
        }
    }
}

impl AdvancedBuoyancy {
    pub fn update_dimensions(&mut self, s: &BodyState) {
        self.semi_axes = s.dimensions * 0.5;
        self.volume_scale = self.semi_axes.x * self.semi_axes.y * self.semi_axes.z;
        self.prev = None;
    }

    /// Split the ellipsoid into (wet, dry) portions plus whether the wet side is the cap.
    fn split(&self, s: &BodyState) -> (Portion, Portion, Option<bool>) {
        let total = UNIT_SPHERE_VOLUME * self.volume_scale;
        let whole = |wet: bool| {
            let all = Portion { volume: total, centroid: Vec3::ZERO };
            if wet { (all, Portion::default(), None) } else { (Portion::default(), all, None) }
        };
        let Some(b) = s.boundary else { return whole(true) };
        if self.semi_axes.min_element() <= EPS { return whole(false); }

        let inv = s.rotation.inverse();
        let p0 = (inv * (b.point - s.position)) / self.semi_axes;
        let n = (inv * b.normal * self.semi_axes).normalize_or_zero();
        let h = -n.dot(p0);
        let contact = s.position + s.rotation * ((-n * h) * self.semi_axes);
        if n == Vec3::ZERO || h.abs() >= 1.0 || !b.covers(contact) {
            return whole(b.signed_height(s.position) < 0.0 && b.covers(s.position));
        }

        // h >= 0: centre above the surface, the submerged cap has height 1 - h
        let cap_wet = h >= 0.0;
        let cap = unit_cap(if cap_wet { 1.0 - h } else { 1.0 + h });
        let cap_dir = if cap_wet { -n } else { n };
        let cap_c = cap_dir * cap.centroid;
        let rest_v = UNIT_SPHERE_VOLUME - cap.volume;
        let rest_c = if rest_v > EPS { -cap_c * (cap.volume / rest_v) } else { Vec3::ZERO };
        let cap_p = Portion { volume: cap.volume * self.volume_scale, centroid: cap_c * self.semi_axes };
        let rest_p = Portion { volume: rest_v * self.volume_scale, centroid: rest_c * self.semi_axes };
        if cap_wet { (cap_p, rest_p, Some(true)) } else { (rest_p, cap_p, Some(false)) }
    }

    /// Largest added-mass drag that cannot reverse the body within one tick.
    /// Unbounded when the mass is unknown (zero).
    pub fn added_mass_limit(s: &BodyState) -> f32 {
        if s.mass <= EPS || s.dt <= EPS { return f32::INFINITY; }
        s.mass * s.velocity.length() / s.dt
    }

    fn portion_load(p: &Portion, density: f32, s: &BodyState, grow_rate: f32) -> AeroLoad {
        if p.volume <= 0.0 { return AeroLoad::ZERO; }
        let added = (-s.velocity * (density * grow_rate.max(0.0))).clamp_length_max(Self::added_mass_limit(s));
        let f = -s.gravity * (density * p.volume) + added;
        AeroLoad::new(f, p.centroid.cross(f))
    }

    pub fn get_load(&mut self, s: &BodyState) -> AeroLoad {
        let (wet, dry, cap_wet) = self.split(s);
        let wet_density = s.boundary.map_or(s.fluid.density, |b| b.fluid.density);
        let dry_density = s.ambient.density;

        let (wet_rate, dry_rate) = match self.prev {
            Some((pw, pd)) if s.dt > EPS => ((wet.volume - pw) / s.dt, (dry.volume - pd) / s.dt),
            _ => (0.0, 0.0),
        };
        let mut load = Self::portion_load(&wet, wet_density, s, wet_rate)
            + Self::portion_load(&dry, dry_density, s, dry_rate);

        if let (Some(now), Some(before)) = (cap_wet, self.prev_cap_wet) {
            if now != before { load = load.lerp(&self.prev_load, self.flip_blend); }
        }

        self.prev = Some((wet.volume, dry.volume));
        if cap_wet.is_some() { self.prev_cap_wet = cap_wet; }
        self.prev_load = load;
        self.wet_volume = wet.volume;
        self.dry_volume = dry.volume;
        load
    }
}
