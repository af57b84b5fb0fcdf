//! `RoomEvent` — the listener contract as data.
//!
//! Room listeners receive plain method calls. Anything that has to leave
//! the process (a message bus bridge, a websocket push, a test probe)
//! wants the same information as a value it can queue and serialize.
//! Each variant here corresponds to exactly one listener callback.

use serde::{Deserialize, Serialize};

use crate::{GuestPolicy, Participant, ParticipantId, PendingGuest, StatusValue};

/// One notification emitted by a room.
///
/// Internally tagged, like the rest of the wire types:
/// `{ "type": "GuestResponse", "participant": {...}, "approved": true }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomEvent {
    // -- Membership --
    ParticipantJoined {
        participant: Participant,
    },
    ParticipantLeft {
        participant: Participant,
    },
    ParticipantStatusChange {
        participant: Participant,
        key: String,
        value: StatusValue,
    },
    ParticipantRoleChange {
        participant: Participant,
        role: String,
    },

    // -- Guest admission --
    /// A guest knocked and is now waiting for a moderator.
    GuestEntrance {
        participant: Participant,
    },
    /// Refresh of the whole waiting list, requested by `caller`.
    GuestWaitingForModerator {
        caller: ParticipantId,
        pending: Vec<PendingGuest>,
    },
    GuestResponse {
        participant: Participant,
        approved: bool,
    },
    GuestPolicyChanged {
        policy: GuestPolicy,
    },

    // -- Session-wide --
    EndAndKickAll,
    AssignPresenter {
        presenters: Vec<ParticipantId>,
    },
    /// `participant` is who asked for the change, or for the automatic
    /// stop on an emptied room, who left last.
    RecordingStatusChange {
        participant: Participant,
        recording: bool,
    },
}

impl RoomEvent {
    /// A static name for the event, handy as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParticipantJoined { .. } => "participant_joined",
            Self::ParticipantLeft { .. } => "participant_left",
            Self::ParticipantStatusChange { .. } => "participant_status_change",
            Self::ParticipantRoleChange { .. } => "participant_role_change",
            Self::GuestEntrance { .. } => "guest_entrance",
            Self::GuestWaitingForModerator { .. } => "guest_waiting_for_moderator",
            Self::GuestResponse { .. } => "guest_response",
            Self::GuestPolicyChanged { .. } => "guest_policy_changed",
            Self::EndAndKickAll => "end_and_kick_all",
            Self::AssignPresenter { .. } => "assign_presenter",
            Self::RecordingStatusChange { .. } => "recording_status_change",
        }
    }

    /// The participant this event is about, if it is about one.
    pub fn participant(&self) -> Option<&Participant> {
        match self {
            Self::ParticipantJoined { participant }
            | Self::ParticipantLeft { participant }
            | Self::ParticipantStatusChange { participant, .. }
            | Self::ParticipantRoleChange { participant, .. }
            | Self::GuestEntrance { participant }
            | Self::GuestResponse { participant, .. }
            | Self::RecordingStatusChange { participant, .. } => Some(participant),
            Self::GuestWaitingForModerator { .. }
            | Self::GuestPolicyChanged { .. }
            | Self::EndAndKickAll
            | Self::AssignPresenter { .. } => None,
        }
    }
}
