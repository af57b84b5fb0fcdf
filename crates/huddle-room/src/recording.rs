//! Recording state machine.
//!
//! ```text
//!   NotRecording ──(change_recording_status(p, true))──→ Recording
//!        ↑                                                   │
//!        ├──────────(change_recording_status(p, false))──────┤
//!        └──────────(last participant leaves)────────────────┘
//! ```
//!
//! A request for the state the room is already in is refused, so a
//! transition is notified exactly once no matter how many moderators
//! click the button.

use std::fmt;

use huddle_protocol::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};

use crate::sync::lock;
use crate::{Room, RoomError};

/// Whether a room is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordingState {
    #[default]
    NotRecording,
    Recording,
}

impl RecordingState {
    pub fn is_recording(self) -> bool {
        matches!(self, Self::Recording)
    }

    /// Switches to `desired`. Returns `None` (and leaves `self` alone)
    /// when already there.
    pub fn transition_to(&mut self, desired: Self) -> Option<Self> {
        if *self == desired {
            return None;
        }
        *self = desired;
        Some(desired)
    }

    /// Unconditionally stops. Returns `true` if this was a transition.
    pub(crate) fn force_stop(&mut self) -> bool {
        self.transition_to(Self::NotRecording).is_some()
    }
}

impl From<bool> for RecordingState {
    fn from(recording: bool) -> Self {
        if recording {
            Self::Recording
        } else {
            Self::NotRecording
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecording => write!(f, "off"),
            Self::Recording => write!(f, "on"),
        }
    }
}

impl Room {
    /// Turns recording on or off at `requester`'s request.
    ///
    /// The requester must be in the room. Attendance and the flag are
    /// locked together (attendance first), so the requester can't leave
    /// halfway and an emptied room can't be switched back on.
    ///
    /// # Errors
    /// - [`RoomError::ParticipantNotFound`] — `requester` is not in the room
    /// - [`RoomError::RecordingUnchanged`] — already in the desired state
    pub fn change_recording_status(
        &self,
        requester: &ParticipantId,
        recording: bool,
    ) -> Result<(), RoomError> {
        let desired = RecordingState::from(recording);
        let participant = {
            let attendance = lock(&self.attendance);
            let participant = attendance
                .participants
                .get(requester)
                .cloned()
                .ok_or_else(|| self.not_found(requester))?;
            let mut state = lock(&self.recording);
            if state.transition_to(desired).is_none() {
                tracing::debug!(
                    room = %self.name(),
                    participant = %requester,
                    state = %desired,
                    "recording change ignored, already in state"
                );
                return Err(RoomError::RecordingUnchanged {
                    room: self.name().clone(),
                    state: desired,
                });
            }
            participant
        };

        tracing::info!(
            room = %self.name(),
            participant = %requester,
            state = %desired,
            "recording status changed"
        );
        self.notify_recording(&participant, desired);
        Ok(())
    }

    pub fn recording_state(&self) -> RecordingState {
        *lock(&self.recording)
    }

    pub fn is_recording(&self) -> bool {
        self.recording_state().is_recording()
    }

    pub(crate) fn notify_recording(&self, participant: &Participant, state: RecordingState) {
        let recording = state.is_recording();
        self.broadcast("recording_status_change", |l| {
            l.recording_status_change(participant, recording)
        });
    }
}
