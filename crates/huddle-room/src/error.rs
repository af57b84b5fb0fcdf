//! Error types for the room layer.
//!
//! None of these are failures of the room itself. They report that an
//! operation was IGNORED because the room's state didn't allow it, so
//! callers and tests can tell "accepted" from "dropped" without
//! counting notifications.

use huddle_protocol::{ParticipantId, RoomName};

/// Why a room operation had no effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The participant is not (or no longer) in the room.
    #[error("participant {0} not found in room {1}")]
    ParticipantNotFound(ParticipantId, RoomName),

    /// The participant is present but has no pending admission request,
    /// either because they never asked or because a moderator already
    /// answered.
    #[error("participant {0} is not waiting for a moderator in room {1}")]
    GuestNotWaiting(ParticipantId, RoomName),

    /// The requested recording state is already the current one.
    #[error("recording in room {room} is already {state}")]
    RecordingUnchanged {
        room: RoomName,
        state: crate::RecordingState,
    },

    /// A listener with this name is already registered. The existing
    /// registration was kept.
    #[error("listener {0:?} is already registered")]
    ListenerAlreadyRegistered(String),

    /// No listener with this name is registered.
    #[error("listener {0:?} is not registered")]
    ListenerNotFound(String),
}

impl RoomError {
    /// Returns `true` for the "no such thing" kinds, as opposed to
    /// "that thing is in the wrong state".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ParticipantNotFound(..) | Self::ListenerNotFound(_)
        )
    }
}
