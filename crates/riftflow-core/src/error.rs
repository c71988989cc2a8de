use thiserror::Error;
use crate::ids::{DomainId, ReceiverId, SourceId};

/// Configuration-time failures. Per-tick evaluation never returns these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    #[error("invalid {what}: {value} (expected {expected})")]
    InvalidParameter { what: &'static str, value: f32, expected: &'static str },

    #[error("unknown source {0}")]
    UnknownSource(SourceId),

    #[error("unknown receiver {0}")]
    UnknownReceiver(ReceiverId),

    #[error("unknown domain {0}")]
    UnknownDomain(DomainId),

    #[error("vortex node {0} is not live")]
    DeadNode(u32),

    #[error("receiver {0} already carries an aerodynamic body")]
    DuplicateBody(ReceiverId),
}

pub type FlowResult<T> = Result<T, FlowError>;

impl FlowError {
    pub fn invalid(what: &'static str, value: f32, expected: &'static str) -> Self {
        FlowError::InvalidParameter { what, value, expected }
    }
}
