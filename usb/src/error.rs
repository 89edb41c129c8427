use crate::request::{TargetUnit, MAX_PAYLOAD};

/// An OS enumeration, negotiation or transfer call failed. Carries the call
/// that failed alongside the OS-provided code and description.
#[derive(thiserror::Error, Debug)]
#[error("{call}: {source}")]
pub struct ResourceError {
    pub call: &'static str,
    #[source]
    pub source: rusb::Error,
}

impl ResourceError {
    pub fn new(call: &'static str, source: rusb::Error) -> Self {
        Self { call, source }
    }

    /// Whether this failure marks an enumeration entry as unusable rather
    /// than fatal. Entries failing plugin creation this way are skipped.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self.source, rusb::Error::NoMem)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    #[error("No Logitech Orbit AF found")]
    Device,

    #[error("No video control interface found")]
    VideoInterface,

    #[error("The {0} extension unit was not advertised by the camera")]
    Unit(TargetUnit),
}

/// A defect in request construction, not a runtime condition.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("control payload of {0} bytes exceeds the {MAX_PAYLOAD} byte limit")]
    PayloadTooLong(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
