//! Unified error type for Huddle.

use huddle_protocol::ProtocolError;
use huddle_room::RoomError;

/// Top-level error wrapping every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    /// Encoding or decoding failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The room ignored the operation.
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl HuddleError {
    /// HTTP-style status code for a signaling error reply.
    ///
    /// 400 for anything that failed to decode, 404 when the target
    /// doesn't exist, 409 when it exists but is in the wrong state.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Protocol(_) => 400,
            Self::Room(e) if e.is_not_found() => 404,
            Self::Room(_) => 409,
        }
    }
}
