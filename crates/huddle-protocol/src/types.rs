//! Core value types shared by every Huddle layer.
//!
//! These are the things a room talks ABOUT: who a participant is, what
//! the guest policy says, who is waiting at the door. None of them know
//! anything about locking or listeners — that lives in `huddle-room`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A participant's identifier, unique within one room.
///
/// Newtype over `String` so a participant id can't be confused with a
/// display name or a role, even though all three are strings underneath.
/// `#[serde(transparent)]` keeps the JSON form a plain string:
/// `ParticipantId("u-1")` is `"u-1"` on the wire, not `{"0":"u-1"}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The immutable name of a room (one real-time session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(pub String);

impl RoomName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for RoomName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// Value stored under a participant status key.
///
/// Status entries are opaque to the room ("raised hand", "presenter",
/// "hasStream", ...), so any JSON value is accepted.
pub type StatusValue = serde_json::Value;

/// Conventional role for participants with moderator rights.
pub const ROLE_MODERATOR: &str = "MODERATOR";

/// Conventional role for everyone else. This is the default role.
pub const ROLE_VIEWER: &str = "VIEWER";

/// A connected user as the room sees them.
///
/// The room hands out clones of this struct to listeners and readers;
/// the authoritative copy only changes through the room's operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable, room-scoped identifier. The registry key.
    pub id: ParticipantId,

    /// Display name.
    pub name: String,

    /// Whether this participant counts as a moderator.
    #[serde(default)]
    pub moderator: bool,

    /// Free-form role string. See [`ROLE_MODERATOR`] and [`ROLE_VIEWER`].
    #[serde(default = "default_role")]
    pub role: String,

    /// Arbitrary per-participant status entries.
    ///
    /// `BTreeMap` rather than `HashMap` so snapshots serialize in a
    /// stable key order.
    #[serde(default)]
    pub status: BTreeMap<String, StatusValue>,
}

fn default_role() -> String {
    ROLE_VIEWER.to_owned()
}

impl Participant {
    /// Creates a non-moderator viewer with an empty status map.
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            moderator: false,
            role: default_role(),
            status: BTreeMap::new(),
        }
    }

    /// Builder-style setter for the moderator flag.
    pub fn with_moderator(mut self, moderator: bool) -> Self {
        self.moderator = moderator;
        self
    }

    /// Builder-style setter for the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn is_moderator(&self) -> bool {
        self.moderator
    }

    /// Inserts or replaces one status entry.
    pub fn set_status(&mut self, key: impl Into<String>, value: StatusValue) {
        self.status.insert(key.into(), value);
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.role = role.into();
    }

    /// Looks up one status entry.
    pub fn status(&self, key: &str) -> Option<&StatusValue> {
        self.status.get(key)
    }
}

// ---------------------------------------------------------------------------
// Guest admission
// ---------------------------------------------------------------------------

/// The room's guest policy.
///
/// This is an OPEN set: the room stores and broadcasts whatever string
/// the caller sets, and only the signaling layer interprets it. The
/// associated constants name the policies every client understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestPolicy(pub String);

impl GuestPolicy {
    /// Guests wait until a moderator accepts or denies them.
    pub const ASK_MODERATOR: &'static str = "ASK_MODERATOR";
    /// Guests are let in without asking.
    pub const ALWAYS_ACCEPT: &'static str = "ALWAYS_ACCEPT";
    /// Guests are turned away without asking.
    pub const ALWAYS_DENY: &'static str = "ALWAYS_DENY";

    pub fn new(policy: impl Into<String>) -> Self {
        Self(policy.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if guests must be admitted by a moderator.
    pub fn is_ask_moderator(&self) -> bool {
        self.0 == Self::ASK_MODERATOR
    }
}

impl Default for GuestPolicy {
    fn default() -> Self {
        Self::new(Self::ASK_MODERATOR)
    }
}

impl fmt::Display for GuestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the guest waiting list: an id and the display name the
/// guest had when they asked to be let in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGuest {
    pub id: ParticipantId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// RoomInfo
// ---------------------------------------------------------------------------

/// A point-in-time summary of a room's read state.
///
/// Every field is read under the room's own locks, but not all under the
/// SAME lock, so a concurrent mutation may land between two fields.
/// Good enough for status pages and admin queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub name: RoomName,
    pub participant_count: usize,
    pub moderator_count: usize,
    pub recording: bool,
    pub guest_policy: GuestPolicy,
    /// `None` until a presenter has been assigned.
    pub presenter: Option<Vec<ParticipantId>>,
    pub guests_waiting: Vec<PendingGuest>,
}

// =========================================================================
// Tests
// =========================================================================
