use std::f32::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};
use riftflow_core::{Vec3, EPS};

use crate::body::BodyState;
use crate::load::AeroLoad;

/// Pressure drag coefficient for thickness-to-chord ratio `tau`.
///
/// Rises linearly to `cd_sphere` at tau = 1, then tends to `cd_plate` as the
/// body becomes a plate facing the flow.
#[inline]
pub fn pressure_drag_coefficient(tau: f32, cd_sphere: f32, cd_plate: f32) -> f32 {
    if tau <= 1.0 { cd_sphere * tau.max(0.0) } else { cd_plate + (cd_sphere - cd_plate) / tau }
}

/// Turbulent flat-plate skin friction, 0.027 / Re^(1/7); zero at Re ~ 0.
#[inline]
pub fn skin_friction_coefficient(re: f32) -> f32 {
    if re <= EPS { 0.0 } else { 0.027 / re.powf(1.0 / 7.0) }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct AxisConsts { chord: f32, frontal: f32, planform: f32, cd_pressure: f32 }

/// Shape-dependent drag resolved over the three body axes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Drag {
    pub cd_sphere: f32,
    pub cd_plate: f32,
    #[serde(skip)]
    axes: [AxisConsts; 3],
    /// Resolved area (m^2) of the last pass.
    #[serde(skip)]
    pub last_area: f32,
}

impl Default for Drag {
    fn default() -> Self { Self { cd_sphere: 0.5, cd_plate: 1.2, axes: [AxisConsts::default(); 3], last_area: 0.0 } }
}

impl Drag {
    pub fn update_dimensions(&mut self, s: &BodyState) {
        let mut dims = s.dimensions;
        dims[s.axes.thickness] += s.deflection_thickness();
        for i in 0..3 {
            let (j, k) = ((i + 1) % 3, (i + 2) % 3);
            let chord = dims[i];
            let thickness = dims[j].min(dims[k]);
            let tau = if chord > EPS { thickness / chord } else { f32::INFINITY };
            self.axes[i] = AxisConsts {
                chord,
                frontal: FRAC_PI_4 * dims[j] * dims[k],
                planform: FRAC_PI_4 * chord * dims[j].max(dims[k]),
                cd_pressure: if tau.is_finite() { pressure_drag_coefficient(tau, self.cd_sphere, self.cd_plate) } else { self.cd_plate },
            };
        }
    }

    /// Drag area CD*S for flow along axis `i` at speed `speed`.
    pub fn axis_area(&self, i: usize, s: &BodyState, speed: f32) -> f32 {
        let a = &self.axes[i];
        let re = s.fluid.density * speed * a.chord / s.fluid.viscosity.max(EPS);
        a.cd_pressure * a.frontal + 2.0 * skin_friction_coefficient(re) * a.planform
    }

    pub fn get_load(&mut self, s: &BodyState) -> AeroLoad {
        let speed = s.velocity.length();
        if speed <= EPS { self.last_area = 0.0; return AeroLoad::ZERO; }
        let d = s.velocity / speed;
        let area = (0..3).map(|i| self.axis_area(i, s, speed) * d[i] * d[i]).sum::<f32>();
        self.last_area = area;
        AeroLoad::force(-d * (s.dynamic_pressure * area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyShape;

    #[test] fn pressure_coefficient_shape() {
        assert!((pressure_drag_coefficient(1.0, 0.5, 1.2) - 0.5).abs() < 1e-6);
        assert!(pressure_drag_coefficient(1e-4, 0.5, 1.2) < 1e-3);
        assert!((pressure_drag_coefficient(1e4, 0.5, 1.2) - 1.2).abs() < 1e-3);
        // no Reynolds dependence in the pressure part
        let mut d = Drag::default();
        let mut s = BodyState::new(BodyShape::from_dimensions(Vec3::ONE));
        d.update_dimensions(&s);
        s.fluid.viscosity = 1.0;
        let slow = d.axis_area(2, &s, 0.0);
        assert!((slow - 0.5 * FRAC_PI_4).abs() < 1e-6);
    }

    #[test] fn zero_velocity_zero_load() {
        let s = BodyState::new(BodyShape::from_dimensions(Vec3::new(1.0, 0.2, 3.0)));
        let mut d = Drag::default();
        d.update_dimensions(&s);
        assert_eq!(d.get_load(&s), AeroLoad::ZERO);
    }

    #[test] fn deflection_inflates_thickness() {
        let mut shape = BodyShape::from_dimensions(Vec3::new(4.0, 0.1, 1.0));
        shape.control_surfaces.push(crate::body::ControlSurface { chord_fraction: 0.3, deflection: 0.5, edge: crate::body::ChordEnd::Negative });
        let s = BodyState::new(shape.clone());
        let mut flapped = Drag::default();
        flapped.update_dimensions(&s);
        let mut clean = Drag::default();
        clean.update_dimensions(&BodyState::new(BodyShape::from_dimensions(Vec3::new(4.0, 0.1, 1.0))));
        // flow along the chord sees a thicker section
        assert!(flapped.axis_area(2, &s, 0.0) > clean.axis_area(2, &s, 0.0));
    }
}
