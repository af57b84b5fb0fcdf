//! Inbound signaling commands and their replies.
//!
//! The transport layer (not part of Huddle) decodes whatever arrives on
//! a user's signaling channel into a [`SignalCommand`], hands it to the
//! dispatcher, and sends the [`SignalReply`] back. One variant per
//! inbound room operation.

use serde::{Deserialize, Serialize};

use crate::{GuestPolicy, Participant, ParticipantId, PendingGuest, RoomInfo, StatusValue};

/// A request to mutate or query a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SignalCommand {
    // -- Membership --
    Join {
        participant: Participant,
    },
    Leave {
        id: ParticipantId,
    },
    ChangeStatus {
        id: ParticipantId,
        key: String,
        value: StatusValue,
    },
    SetRole {
        id: ParticipantId,
        role: String,
    },

    // -- Guest admission --
    AskModerator {
        id: ParticipantId,
    },
    /// Ask the room to rebroadcast the whole waiting list.
    GuestWaiting {
        caller: ParticipantId,
    },
    RespondToGuest {
        id: ParticipantId,
        approved: bool,
    },
    RespondToAllGuests {
        approved: bool,
    },
    ChangeGuestPolicy {
        policy: GuestPolicy,
    },

    // -- Session-wide --
    AssignPresenter {
        presenters: Vec<ParticipantId>,
    },
    ChangeRecording {
        requester: ParticipantId,
        recording: bool,
    },
    EndAndKickAll,
    GetInfo,
}

/// The answer to a [`SignalCommand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SignalReply {
    /// The command was applied and has nothing to report.
    Ok,

    /// A join replaced an existing entry with the same id.
    Replaced { previous: Participant },

    /// A leave removed this participant.
    Left { participant: Participant },

    /// The waiting list that was just broadcast.
    Pending { guests: Vec<PendingGuest> },

    /// Guests answered by a bulk response.
    Answered { guests: Vec<ParticipantId> },

    Info(RoomInfo),

    /// The command was rejected or ignored.
    /// `code` follows HTTP conventions: 400 bad request, 404 not found,
    /// 409 conflict with the current state.
    Error { code: u16, message: String },
}
