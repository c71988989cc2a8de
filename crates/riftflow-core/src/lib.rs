pub mod scalar;
pub mod ids;
pub mod types;
pub mod hash;
pub mod schedule;
pub mod step_ctx;
pub mod rng;
pub mod registry;
pub mod curve;
pub mod gravity;
pub mod fluid;
pub mod error;
pub mod rigid;

pub use scalar::{Scalar, EPS};
pub use ids::{SourceId, ReceiverId, DomainId, RigidHandle};
pub use types::{Vec3, Mat3, Pose, Velocity, vec3};
pub use hash::{StepHasher, hash_vec3, hash_quat, hash_f32, hash_pose};
pub use schedule::{StepStage, schedule_digest};
pub use step_ctx::StepCtx;
pub use rng::XorShift64;
pub use registry::InteractionRegistry;
pub use curve::{StrengthCurve, Lifetime};
pub use gravity::Gravity;
pub use fluid::{FluidProps, Isa};
pub use error::{FlowError, FlowResult};
pub use rigid::{RigidBodies, Kinematic};
pub use glam::Quat;
