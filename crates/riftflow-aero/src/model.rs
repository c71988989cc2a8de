use serde::{Deserialize, Serialize};

use crate::body::BodyState;
use crate::buoyancy::{AdvancedBuoyancy, Buoyancy};
use crate::drag::Drag;
use crate::lift::Lift;
use crate::load::AeroLoad;
use crate::rotational::{RotationalDamping, RotationalLift};

/// Closed set of load models. Each caches shape constants in
/// `update_dimensions` and computes a body-local load in `get_load`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum AeroModel {
    Drag(Drag),
    Lift(Lift),
    RotationalDamping(RotationalDamping),
    RotationalLift(RotationalLift),
    Buoyancy(Buoyancy),
    AdvancedBuoyancy(AdvancedBuoyancy),
}

impl AeroModel {
    pub fn drag() -> Self { AeroModel::Drag(Drag::default()) }
    pub fn lift() -> Self { AeroModel::Lift(Lift::default()) }
    pub fn rotational_damping() -> Self { AeroModel::RotationalDamping(RotationalDamping::default()) }
    pub fn rotational_lift() -> Self { AeroModel::RotationalLift(RotationalLift::default()) }
    pub fn buoyancy() -> Self { AeroModel::Buoyancy(Buoyancy::default()) }
    pub fn advanced_buoyancy() -> Self { AeroModel::AdvancedBuoyancy(AdvancedBuoyancy::default()) }

    pub fn name(&self) -> &'static str {
        match self {
            AeroModel::Drag(_) => "drag",
            AeroModel::Lift(_) => "lift",
            AeroModel::RotationalDamping(_) => "rotational_damping",
            AeroModel::RotationalLift(_) => "rotational_lift",
            AeroModel::Buoyancy(_) => "buoyancy",
            AeroModel::AdvancedBuoyancy(_) => "advanced_buoyancy",
        }
    }

    pub fn update_dimensions(&mut self, s: &BodyState) {
        match self {
            AeroModel::Drag(m) => m.update_dimensions(s),
            AeroModel::Lift(m) => m.update_dimensions(s),
            AeroModel::RotationalDamping(m) => m.update_dimensions(s),
            AeroModel::RotationalLift(m) => m.update_dimensions(s),
            AeroModel::Buoyancy(m) => m.update_dimensions(s),
            AeroModel::AdvancedBuoyancy(m) => m.update_dimensions(s),
        }
    }

    pub fn get_load(&mut self, s: &BodyState) -> AeroLoad {
        match self {
            AeroModel::Drag(m) => m.get_load(s),
            AeroModel::Lift(m) => m.get_load(s),
            AeroModel::RotationalDamping(m) => m.get_load(s),
            AeroModel::RotationalLift(m) => m.get_load(s),
            AeroModel::Buoyancy(m) => m.get_load(s),
            AeroModel::AdvancedBuoyancy(m) => m.get_load(s),
        }
    }
}
