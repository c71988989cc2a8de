use core::fmt;
use serde::{Deserialize, Serialize};

/// Flow source identity. `0` means "unassigned".
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);
impl fmt::Display for SourceId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "SourceId({})", self.0) } }

/// Flow receiver identity (aero bodies are receivers too). `0` means "unassigned".
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ReceiverId(pub u32);
impl fmt::Display for ReceiverId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ReceiverId({})", self.0) } }

/// Index of a fluid domain inside a world.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DomainId(pub u32);
impl fmt::Display for DomainId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "DomainId({})", self.0) } }

/// Handle into the host's rigid-body store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RigidHandle(pub u32);
impl fmt::Display for RigidHandle { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "RigidHandle({})", self.0) } }

impl SourceId {
    pub const UNASSIGNED: SourceId = SourceId(0);
    #[inline] pub fn is_assigned(self) -> bool { self.0 != 0 }
}

impl ReceiverId {
    pub const UNASSIGNED: ReceiverId = ReceiverId(0);
    #[inline] pub fn is_assigned(self) -> bool { self.0 != 0 }
}
