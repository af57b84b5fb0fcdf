//! Shared vocabulary for Huddle rooms.
//!
//! - **Types** ([`Participant`], [`ParticipantId`], [`GuestPolicy`],
//!   [`PendingGuest`], [`RoomInfo`]) — what a room is made of.
//! - **Events** ([`RoomEvent`]) — the listener contract as values.
//! - **Signaling** ([`SignalCommand`], [`SignalReply`]) — what callers
//!   ask a room to do, and what they get back.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — bytes in, bytes out.
//!
//! ```text
//! Signaling transport (bytes) → Protocol (SignalCommand) → Room core
//! Room core → RoomListener → Protocol (RoomEvent) → bus / sockets
//! ```

mod codec;
mod error;
mod event;
mod signal;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use event::RoomEvent;
pub use signal::{SignalCommand, SignalReply};
pub use types::{
    GuestPolicy, Participant, ParticipantId, PendingGuest, RoomInfo, RoomName,
    StatusValue, ROLE_MODERATOR, ROLE_VIEWER,
};
