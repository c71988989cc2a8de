use std::ops::{Add, AddAssign};

use glam::Quat;
use serde::Serialize;
use riftflow_core::Vec3;

/// Force + moment about the body origin. Body-local unless stated otherwise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct AeroLoad {
    pub force: Vec3,
    pub moment: Vec3,
}

impl AeroLoad {
    pub const ZERO: AeroLoad = AeroLoad { force: Vec3::ZERO, moment: Vec3::ZERO };

    #[inline] pub fn new(force: Vec3, moment: Vec3) -> Self { Self { force, moment } }
    #[inline] pub fn force(force: Vec3) -> Self { Self { force, moment: Vec3::ZERO } }

    /// Rotate local force and moment into the global frame.
    #[inline]
    pub fn to_global(&self, rot: Quat) -> AeroLoad {
        AeroLoad { force: rot * self.force, moment: rot * self.moment }
    }

    #[inline]
    pub fn lerp(&self, other: &AeroLoad, t: f32) -> AeroLoad {
        AeroLoad { force: self.force.lerp(other.force, t), moment: self.moment.lerp(other.moment, t) }
    }

    pub fn is_finite(&self) -> bool { self.force.is_finite() && self.moment.is_finite() }
}

impl Add for AeroLoad {
    type Output = AeroLoad;
    #[inline] fn add(self, o: AeroLoad) -> AeroLoad { AeroLoad { force: self.force + o.force, moment: self.moment + o.moment } }
}

impl AddAssign for AeroLoad {
    #[inline] fn add_assign(&mut self, o: AeroLoad) { self.force += o.force; self.moment += o.moment; }
}
