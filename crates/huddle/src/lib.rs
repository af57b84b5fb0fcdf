//! # Huddle
//!
//! Concurrent shared state for one real-time conference session: the
//! participant registry, guest admission, recording and presenter state,
//! and synchronous change notification to every registered listener.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use huddle::prelude::*;
//!
//! let room = Arc::new(Room::new("weekly-sync"));
//! let (forwarder, mut events) = EventForwarder::channel("bus");
//! room.add_listener(Arc::new(forwarder)).unwrap();
//!
//! room.add_participant(Participant::new("u-1", "Ada").with_moderator(true));
//! room.add_participant(Participant::new("u-2", "Bo"));
//! room.ask_moderator(&ParticipantId::from("u-2")).unwrap();
//! room.response_to_guest(&ParticipantId::from("u-2"), true).unwrap();
//!
//! assert_eq!(room.moderator_count(), 1);
//! assert_eq!(events.try_recv().unwrap().kind(), "participant_joined");
//! ```

mod dispatch;
mod error;
pub mod telemetry;

pub use dispatch::{dispatch, dispatch_bytes};
pub use error::HuddleError;

pub use huddle_protocol as protocol;
pub use huddle_room as room;

/// Everything a typical embedder needs.
pub mod prelude {
    pub use crate::{dispatch, dispatch_bytes, HuddleError};
    pub use huddle_protocol::{
        Codec, GuestPolicy, JsonCodec, Participant, ParticipantId, PendingGuest, RoomEvent,
        RoomInfo, RoomName, SignalCommand, SignalReply, StatusValue,
    };
    pub use huddle_room::{
        EventForwarder, RecordingState, Room, RoomConfig, RoomError, RoomListener,
        TracingListener,
    };
}
