//! Room configuration.

use std::time::Duration;

use huddle_protocol::GuestPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for a room instance.
///
/// Everything has a sensible default; override only what you need:
///
/// ```rust
/// use std::time::Duration;
/// use huddle_room::RoomConfig;
///
/// let config = RoomConfig {
///     slow_listener_threshold: Duration::from_millis(5),
///     ..RoomConfig::default()
/// };
/// assert!(config.default_guest_policy.is_ask_moderator());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// The guest policy a fresh room starts with.
    pub default_guest_policy: GuestPolicy,

    /// A single listener callback taking longer than this is logged at
    /// `warn`. Listeners run on the caller's thread, so a slow one holds
    /// up whoever triggered the notification. Delivery is never aborted.
    pub slow_listener_threshold: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            default_guest_policy: GuestPolicy::default(),
            slow_listener_threshold: Duration::from_millis(50),
        }
    }
}
