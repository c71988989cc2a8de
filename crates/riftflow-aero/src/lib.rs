// riftflow-aero/src/lib.rs
mod load;
mod body;
mod drag;
mod lift;
mod rotational;
mod buoyancy;
mod model;

pub use load::AeroLoad;
pub use body::{AeroBody, BodyShape, BodyState, ChordEnd, ControlSurface, WingAxes};
pub use drag::{Drag, pressure_drag_coefficient, skin_friction_coefficient};
pub use lift::{Lift, LiftDiagnostics};
pub use rotational::{RotationalDamping, RotationalLift};
pub use buoyancy::{Buoyancy, AdvancedBuoyancy};
pub use model::AeroModel;
