use crate::model::{BookingId, ResourceId};

#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    InvalidCapacity(i64),
    UnknownResource(ResourceId),
    UnknownBooking(ResourceId, BookingId),
    InvalidDuration(i64),
    LimitExceeded(&'static str),
    /// Insert attempted on a full resource. Unreachable through the engine;
    /// seeing this means the capacity check was bypassed.
    CapacityExceeded(u32),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidCapacity(cap) => {
                write!(f, "invalid capacity: {cap} (must be at least 1)")
            }
            EngineError::UnknownResource(id) => write!(f, "unknown resource: {id}"),
            EngineError::UnknownBooking(rid, bid) => {
                write!(f, "unknown booking {bid} on resource {rid}")
            }
            EngineError::InvalidDuration(days) => {
                write!(f, "invalid duration: {days} days (must be at least 1)")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::CapacityExceeded(cap) => {
                write!(f, "capacity {cap} exceeded: all slots occupied")
            }
        }
    }
}

impl std::error::Error for EngineError {}
