//! Shared room state for Huddle sessions.
//!
//! A [`Room`] holds everything a session's signaling tasks share: who is
//! present, who is waiting for a moderator, who presents, whether the
//! session is recorded. Any number of threads call into it at once.
//! Every accepted change is then delivered to each registered
//! [`RoomListener`] before the call returns.
//!
//! # Key types
//!
//! - [`Room`] — the state container and all its operations
//! - [`RoomListener`] — the observer trait, one method per notification
//! - [`ListenerRegistry`] — the name-unique listener set behind a room
//! - [`RecordingState`] — the on/off recording state machine
//! - [`RoomConfig`] — initial guest policy, slow-listener threshold
//! - [`EventForwarder`], [`TracingListener`] — ready-made listeners
//!
//! # Outcomes
//!
//! Operations that can be ignored (unknown participant, guest already
//! answered, recording already in the requested state) return a
//! [`RoomError`] saying so. An `Err` never means partial work: the room
//! state is untouched and nobody was notified.

mod config;
mod error;
mod forward;
mod guests;
mod listener;
mod recording;
mod room;
mod sync;

pub use config::RoomConfig;
pub use error::RoomError;
pub use forward::{EventForwarder, TracingListener};
pub use listener::{ListenerRegistry, RoomListener};
pub use recording::RecordingState;
pub use room::Room;
