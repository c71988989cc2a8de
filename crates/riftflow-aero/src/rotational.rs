use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use riftflow_core::{Vec3, EPS};

use crate::body::BodyState;
use crate::drag::skin_friction_coefficient;
use crate::load::AeroLoad;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct SpinAxis { length: f32, major: f32, minor: f32 }

/// Torque opposing spin about each body axis: pressure on the out-of-round
/// part of the cross-section plus skin friction on the lateral surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationalDamping {
    pub cd_plate: f32,
    #[serde(skip)]
    axes: [SpinAxis; 3],
}

impl Default for RotationalDamping {
    fn default() -> Self { Self { cd_plate: 1.2, axes: [SpinAxis::default(); 3] } }
}

impl RotationalDamping {
    pub fn update_dimensions(&mut self, s: &BodyState) {
        let d = s.dimensions;
        for i in 0..3 {
            let (a, b) = (d[(i + 1) % 3], d[(i + 2) % 3]);
            self.axes[i] = SpinAxis { length: d[i], major: a.max(b), minor: a.min(b) };
        }
    }

    /// Damping torque magnitude about axis `i` at spin rate `omega`.
    pub fn axis_torque(&self, i: usize, omega: f32, s: &BodyState) -> f32 {
        let SpinAxis { length: l, major: dd, minor: d } = self.axes[i];
        let rho = s.fluid.density;
        let w = omega.abs();
        let pressure = rho * self.cd_plate * l * (dd - d) * dd.powi(3) * w * w / 64.0;
        let re = rho * w * dd * dd / (2.0 * s.fluid.viscosity.max(EPS));
        let rim = w * dd * 0.5;
        let friction = 0.5 * rho * skin_friction_coefficient(re) * rim * rim * (PI * dd * l) * (dd * 0.5);
        pressure + friction
    }

    pub fn get_load(&mut self, s: &BodyState) -> AeroLoad {
        let w = s.angular_velocity;
        if w.length_squared() <= EPS * EPS { return AeroLoad::ZERO; }
        let mut m = Vec3::ZERO;
        for i in 0..3 {
            if w[i] != 0.0 { m[i] = -w[i].signum() * self.axis_torque(i, w[i], s); }
        }
        AeroLoad::new(Vec3::ZERO, m)
    }
}

/// Magnus force of a spinning body moving through the fluid.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationalLift {
    pub efficiency: f32,
    #[serde(skip)]
    coeff: Vec3,
}

impl Default for RotationalLift {
    fn default() -> Self { Self { efficiency: 1.0, coeff: Vec3::ZERO } }
}

impl RotationalLift {
    pub fn update_dimensions(&mut self, s: &BodyState) {
        let d = s.dimensions;
        for i in 0..3 {
            let r = (d[(i + 1) % 3] + d[(i + 2) % 3]) * 0.25;
            self.coeff[i] = 2.0 * PI * r * r * d[i];
        }
    }

    pub fn get_load(&mut self, s: &BodyState) -> AeroLoad {
        let spin = self.coeff * s.angular_velocity * self.efficiency;
        AeroLoad::force(spin.cross(s.velocity) * s.fluid.density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyShape;

    fn cylinder() -> BodyState { BodyState::new(BodyShape::from_dimensions(Vec3::new(0.2, 0.2, 1.0))) }

    #[test] fn damping_opposes_spin() {
        let mut s = cylinder();
        s.angular_velocity = Vec3::new(3.0, 0.0, -2.0);
        let mut m = RotationalDamping::default();
        m.update_dimensions(&s);
        let l = m.get_load(&s);
        assert!(l.moment.x < 0.0);
        assert!(l.moment.z > 0.0);
        assert_eq!(l.force, Vec3::ZERO);
        // round section about its own axis: friction only
        let round = m.axis_torque(2, 2.0, &s);
        let expected = {
            let re = s.fluid.density * 2.0 * 0.04 / (2.0 * s.fluid.viscosity);
            0.5 * s.fluid.density * skin_friction_coefficient(re) * 0.2f32.powi(2) * (PI * 0.2) * 0.1
        };
        assert!((round - expected).abs() < 1e-7);
    }

    #[test] fn magnus_is_perpendicular() {
        let mut s = BodyState::new(BodyShape::from_dimensions(Vec3::splat(0.22)));
        s.angular_velocity = Vec3::new(0.0, 0.0, 20.0);
        s.velocity = Vec3::new(10.0, 0.0, 0.0);
        let mut m = RotationalLift::default();
        m.update_dimensions(&s);
        let f = m.get_load(&s).force;
        // spin about +z moving +x: force along +y
        assert!(f.y > 0.0);
        assert!(f.x.abs() < 1e-6 && f.z.abs() < 1e-6);
    }

    #[test] fn still_body_no_rotational_load() {
        let s = cylinder();
        let mut d = RotationalDamping::default();
        let mut l = RotationalLift::default();
        d.update_dimensions(&s);
        l.update_dimensions(&s);
        assert_eq!(d.get_load(&s), AeroLoad::ZERO);
        assert_eq!(l.get_load(&s), AeroLoad::ZERO);
    }
}
