//! Signaling dispatch: inbound commands → room operations.
//!
//! The transport that carries a user's signaling channel is not part of
//! Huddle. Whatever it is, it ends up with bytes (or an already decoded
//! [`SignalCommand`]) and a reference to the session's [`Room`]; these
//! two functions do the rest.
//!
//! ```text
//! bytes ──decode──→ SignalCommand ──dispatch──→ Room op ──→ SignalReply ──encode──→ bytes
//!                                                  │
//!                                                  └──→ RoomListener fan-out
//! ```

use huddle_protocol::{Codec, SignalCommand, SignalReply};
use huddle_room::Room;

use crate::HuddleError;

/// Applies one command to the room.
///
/// # Errors
/// [`HuddleError::Room`] when the room ignored the command (unknown
/// participant, guest already answered, recording unchanged).
pub fn dispatch(room: &Room, command: SignalCommand) -> Result<SignalReply, HuddleError> {
    let reply = match command {
        SignalCommand::Join { participant } => match room.add_participant(participant) {
            Some(previous) => SignalReply::Replaced { previous },
            None => SignalReply::Ok,
        },
        SignalCommand::Leave { id } => SignalReply::Left {
            participant: room.remove_participant(&id)?,
        },
        SignalCommand::ChangeStatus { id, key, value } => {
            room.change_participant_status(&id, key, value)?;
            SignalReply::Ok
        }
        SignalCommand::SetRole { id, role } => {
            room.set_participant_role(&id, role)?;
            SignalReply::Ok
        }
        SignalCommand::AskModerator { id } => {
            room.ask_moderator(&id)?;
            SignalReply::Ok
        }
        SignalCommand::GuestWaiting { caller } => SignalReply::Pending {
            guests: room.guest_waiting(&caller),
        },
        SignalCommand::RespondToGuest { id, approved } => {
            room.response_to_guest(&id, approved)?;
            SignalReply::Ok
        }
        SignalCommand::RespondToAllGuests { approved } => SignalReply::Answered {
            guests: room.response_to_all_guests(approved),
        },
        SignalCommand::ChangeGuestPolicy { policy } => {
            room.change_guest_policy(policy);
            SignalReply::Ok
        }
        SignalCommand::AssignPresenter { presenters } => {
            room.assign_presenter(presenters);
            SignalReply::Ok
        }
        SignalCommand::ChangeRecording { requester, recording } => {
            room.change_recording_status(&requester, recording)?;
            SignalReply::Ok
        }
        SignalCommand::EndAndKickAll => {
            room.end_and_kick_all();
            SignalReply::Ok
        }
        SignalCommand::GetInfo => SignalReply::Info(room.info()),
    };
    Ok(reply)
}

/// Decodes a command, applies it, and encodes the reply.
///
/// Never fails: decode errors and ignored commands come back as an
/// encoded [`SignalReply::Error`]. Only if the codec can't even encode
/// the reply is the result empty.
pub fn dispatch_bytes<C: Codec>(room: &Room, codec: &C, data: &[u8]) -> Vec<u8> {
    let reply = codec
        .decode::<SignalCommand>(data)
        .map_err(HuddleError::from)
        .and_then(|command| dispatch(room, command))
        .unwrap_or_else(|e| {
            tracing::debug!(room = %room.name(), error = %e, "signaling command rejected");
            SignalReply::Error {
                code: e.status_code(),
                message: e.to_string(),
            }
        });

    match codec.encode(&reply) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(room = %room.name(), error = %e, "failed to encode signaling reply");
            Vec::new()
        }
    }
}
