use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};
use riftflow_core::{Vec3, EPS};

use crate::body::BodyState;
use crate::load::AeroLoad;

/// Values of the last lift pass, for inspection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct LiftDiagnostics {
    pub alpha: f32,
    pub beta: f32,
    pub aspect_ratio: f32,
    pub slope: f32,
    pub stall_angle: f32,
    pub cl: f32,
    pub cdi: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct WingConsts { span: f32, chord: f32, area: f32, thickness_corr: f32, camber: f32 }

/// Thin-aerofoil lift with aspect-ratio correction, blended into a
/// normal-force model past stall.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Lift {
    /// Degrees.
    pub stall_min_deg: f32,
    /// Degrees.
    pub stall_max_deg: f32,
    pub stall_decay: f32,
    pub cz_max: f32,
    pub thickness_k: f32,
    pub blend_sharpness: f32,
    #[serde(skip)]
    wing: WingConsts,
    #[serde(skip)]
    pub diagnostics: LiftDiagnostics,
}

impl Default for Lift {
    fn default() -> Self {
        Self {
            stall_min_deg: 15.0, stall_max_deg: 45.0, stall_decay: 0.5, cz_max: 2.0, thickness_k: 2.0, blend_sharpness: 40.0,
            wing: WingConsts::default(), diagnostics: LiftDiagnostics::default(),
        }
    }
}

#[inline] fn sigmoid(x: f32) -> f32 { 1.0 / (1.0 + (-x).exp()) }

/// Below this aspect ratio the pre-stall branch is dropped entirely.
const MIN_ATTACHED_AR: f32 = 0.35;

impl Lift {
    pub fn update_dimensions(&mut self, s: &BodyState) {
        let d = s.dimensions;
        let (span, thickness, chord) = (d[s.axes.span], d[s.axes.thickness], d[s.axes.chord]);
        let tc = if chord > EPS { thickness / chord } else { 0.0 };
        let e_thick = s.axes.from_wing().col(1);
        self.wing = WingConsts {
            span, chord,
            area: FRAC_PI_4 * span * chord,
            thickness_corr: (-self.thickness_k * tc * tc).exp(),
            camber: s.shape.camber.dot(e_thick),
        };
    }

    /// Lift-curve slope (per radian) for aspect ratio `ar`.
    pub fn slope(&self, ar: f32) -> f32 {
        let ar_corr = if ar < 2.0 { ar / 4.0 } else { ar / (2.0 + ar) };
        2.0 * PI * ar_corr * self.wing.thickness_corr
    }

    pub fn get_load(&mut self, s: &BodyState) -> AeroLoad {
        let w = self.wing;
        let v = s.axes.to_wing * s.velocity;
        let speed = v.length();
        if speed <= EPS || w.area <= EPS {
            self.diagnostics = LiftDiagnostics::default();
            return AeroLoad::ZERO;
        }

        // in-plane flow direction (span/chord plane) and sideslip
        let inplane = Vec3::new(v.x, 0.0, v.z);
        let ip = inplane.length();
        let f = if ip > EPS { inplane / ip } else { Vec3::Z };
        let beta = f.x.atan2(f.z);
        let c_eff = ((w.chord * f.z).powi(2) + (w.span * f.x).powi(2)).sqrt().max(EPS);
        let s_eff = w.span * w.chord / c_eff;
        let span_dir = Vec3::new(f.z, 0.0, -f.x);

        let mut alpha = (-v.y).atan2(ip) + 2.0 * w.camber / c_eff;
        let mut slat = 0.0;
        for c in &s.shape.control_surfaces {
            if c.is_downstream(f.z) {
                alpha += c.flap_effectiveness() * c.deflection * f.z.abs();
            } else {
                slat += c.chord_fraction.clamp(0.0, 1.0) * c.deflection.abs() * f.z.abs();
            }
        }

        let ar = s_eff.max(s.shape.group_span) * 4.0 / (PI * c_eff);
        let slope = self.slope(ar);
        let (smin, smax) = (self.stall_min_deg.to_radians(), self.stall_max_deg.to_radians());
        let stall = smin + (smax - smin) * (-self.stall_decay * ar).exp() + slat;

        let pre = slope * alpha;
        let post = 0.5 * self.cz_max * w.thickness_corr * (2.0 * alpha).sin();
        let k = self.blend_sharpness;
        let weight = if ar < MIN_ATTACHED_AR { 0.0 } else { sigmoid(k * (alpha + stall)) * sigmoid(k * (stall - alpha)) };
        let cl = weight * pre + (1.0 - weight) * post;
        let cdi = if ar > EPS { cl * cl / (PI * ar) } else { 0.0 };

        self.diagnostics = LiftDiagnostics { alpha, beta, aspect_ratio: ar, slope, stall_angle: stall, cl, cdi };

        let vhat = v / speed;
        let lift_dir = vhat.cross(span_dir).normalize_or_zero();
        let drag_dir = -vhat;
        let area = w.area;
        let force_w = (lift_dir * cl + drag_dir * cdi).normalize_or_zero() * (cl.abs() * s.dynamic_pressure * area);

        // camber pitching moment pre-stall, plus the lift acting a quarter chord ahead
        let cm = -FRAC_PI_2 * (w.camber / c_eff) * weight;
        let camber_moment = -span_dir * (cm * s.dynamic_pressure * area * c_eff);
        let r_ac = f * (0.25 * c_eff * weight);
        let moment_w = camber_moment + r_ac.cross(force_w);

        let back = s.axes.from_wing();
        AeroLoad::new(back * force_w, back * moment_w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyShape;

    /// 4 m span along x, 1 m chord along z, thin along y; flying toward +z.
    fn wing_state(alpha_deg: f32, speed: f32) -> BodyState {
        let mut s = BodyState::new(BodyShape::from_dimensions(Vec3::new(4.0, 0.05, 1.0)));
        let a = alpha_deg.to_radians();
        // air arrives from below-front: relative velocity = own - fluid
        s.velocity = Vec3::new(0.0, -a.sin(), a.cos()) * speed;
        s.dynamic_pressure = 0.5 * s.fluid.density * speed * speed;
        s
    }

    fn lift_at(alpha_deg: f32) -> (f32, LiftDiagnostics) {
        let s = wing_state(alpha_deg, 20.0);
        let mut l = Lift::default();
        l.update_dimensions(&s);
        let load = l.get_load(&s);
        (load.force.y, l.diagnostics)
    }

    #[test] fn zero_velocity_zero_load() {
        let s = wing_state(5.0, 0.0);
        let mut l = Lift::default();
        l.update_dimensions(&s);
        assert_eq!(l.get_load(&s), AeroLoad::ZERO);
    }

    #[test] fn small_alpha_lifts_up_proportionally() {
        let (f2, d2) = lift_at(2.0);
        let (f4, _) = lift_at(4.0);
        assert!(f2 > 0.0);
        assert!((d2.alpha - 2f32.to_radians()).abs() < 1e-4);
        assert!((d2.cl - d2.slope * d2.alpha).abs() / d2.cl < 0.02);
        assert!((f4 / f2 - 2.0).abs() < 0.1);
    }

    #[test] fn monotonic_until_stall() {
        let (_, d) = lift_at(1.0);
        let stall_deg = d.stall_angle.to_degrees();
        let mut prev = 0.0;
        let mut a = 1.0;
        while a < stall_deg - 3.0 {
            let (f, _) = lift_at(a);
            assert!(f > prev, "lift fell at {a} deg");
            prev = f;
            a += 1.0;
        }
    }

    #[test] fn tiny_aspect_ratio_uses_normal_force() {
        // flow running along the span: effective chord is the span
        let mut s = BodyState::new(BodyShape::from_dimensions(Vec3::new(4.0, 0.05, 0.2)));
        s.velocity = Vec3::new(1.0, -0.2, 0.0);
        s.dynamic_pressure = 0.6;
        let mut l = Lift::default();
        l.update_dimensions(&s);
        l.get_load(&s);
        let d = l.diagnostics;
        assert!(d.aspect_ratio < MIN_ATTACHED_AR);
        let post = 0.5 * l.cz_max * l.wing.thickness_corr * (2.0 * d.alpha).sin();
        assert!((d.cl - post).abs() < 1e-6);
    }

    #[test] fn group_span_only_ever_lengthens_the_wing() {
        let run = |group_span: f32| {
            let mut s = wing_state(4.0, 20.0);
            s.shape.group_span = group_span;
            let mut l = Lift::default();
            l.update_dimensions(&s);
            let f = l.get_load(&s).force.y;
            (f, l.diagnostics)
        };
        let (f_alone, alone) = run(0.0);
        assert!((alone.aspect_ratio - 16.0 / PI).abs() < 1e-4);

        let (f_group, group) = run(10.0);
        assert!((group.aspect_ratio - 40.0 / PI).abs() < 1e-4);
        assert!(group.slope > alone.slope);
        assert!(f_group > f_alone);

        // shorter than the panel's own span: ignored
        let (f_short, short) = run(2.0);
        assert_eq!(short.aspect_ratio, alone.aspect_ratio);
        assert_eq!(short.slope, alone.slope);
        assert_eq!(f_short, f_alone);
    }

    #[test] fn arc_camber_lifts_the_same_way_in_reversed_flow() {
        let cambered = |speed: f32| {
            let mut s = wing_state(0.0, speed);
            s.shape.camber = Vec3::new(0.0, 0.02, 0.0);
            let mut l = Lift::default();
            l.update_dimensions(&s);
            let f = l.get_load(&s).force.y;
            (f, l.diagnostics.alpha)
        };
        let (ahead, a_ahead) = cambered(20.0);
        let (behind, a_behind) = cambered(-20.0);
        assert!(ahead > 0.0);
        assert!((a_ahead - 0.04).abs() < 1e-5);
        assert_eq!(a_ahead, a_behind);
        assert!((ahead - behind).abs() < 1e-3 * ahead);
    }

    #[test] fn flap_adds_alpha() {
        let mut s = wing_state(0.0, 20.0);
        s.shape.control_surfaces.push(crate::body::ControlSurface { chord_fraction: 0.25, deflection: 0.1, edge: crate::body::ChordEnd::Negative });
        let mut l = Lift::default();
        l.update_dimensions(&s);
        l.get_load(&s);
        assert!(l.diagnostics.alpha > 0.05);
    }
}
