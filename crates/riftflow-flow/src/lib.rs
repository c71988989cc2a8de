//! Flow composition: what is the fluid velocity at a point?
//!
//! Sources (`FlowKernel` variants) live in a `SourceStore` and are owned either by
//! the `GlobalField` or by one `FluidDomain`. A `FlowField` is the read-only view
//! of all of them for one tick; `FlowReceiver`s sample it and derive their
//! velocity relative to the fluid.

pub mod kernels;
pub mod vortex;
pub mod source;
pub mod field;
pub mod domain;
pub mod receiver;

pub use kernels::{Falloff, PointSource, LineSource, AreaSource, AreaShape, UniformFlow, Turbulence, DisplacementBody};
pub use vortex::{NodeHandle, VortexNodes, VortexFilament, FilamentParams, biot_savart, MIN_FILAMENT_LENGTH};
pub use source::{FlowKernel, FlowSource, FlowQuery, SourceOwner, SourceStore};
pub use field::{SourceSet, GlobalField, FlowField};
pub use domain::{FluidDomain, FluidBoundary};
pub use receiver::FlowReceiver;
