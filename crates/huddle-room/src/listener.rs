//! The `RoomListener` trait and the registry that holds a room's listeners.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use huddle_protocol::{GuestPolicy, Participant, ParticipantId, PendingGuest, StatusValue};

use crate::sync::{read, write};
use crate::RoomError;

/// An observer of one room.
///
/// The room calls these methods after every accepted change, on the
/// thread of whoever made the change, with no room lock held. That last
/// part means a listener may call straight back into the same room
/// without deadlocking. It also means a listener may see state that a
/// concurrent caller has already changed again; treat the arguments as
/// the truth for this event, not the room's current state.
///
/// Every callback has a no-op default, so an implementation overrides
/// only what it cares about. Listeners should be quick: a slow callback
/// stalls the caller that triggered it.
pub trait RoomListener: Send + Sync {
    /// Unique name within a room. Registering a second listener under
    /// the same name is refused.
    fn name(&self) -> &str;

    fn participant_joined(&self, _participant: &Participant) {}

    fn participant_left(&self, _participant: &Participant) {}

    /// `participant` asked to be let in and is now on the waiting list.
    fn guest_entrance(&self, _participant: &Participant) {}

    /// The whole waiting list, rebroadcast because `caller` asked.
    fn guest_waiting_for_moderator(&self, _caller: &ParticipantId, _pending: &[PendingGuest]) {}

    /// A moderator answered `participant`'s admission request.
    fn guest_response(&self, _participant: &Participant, _approved: bool) {}

    fn participant_status_change(&self, _participant: &Participant, _key: &str, _value: &StatusValue) {}

    fn participant_role_change(&self, _participant: &Participant, _role: &str) {}

    fn guest_policy_changed(&self, _policy: &GuestPolicy) {}

    /// The session is over. The room itself does not remove anyone;
    /// reacting to this (kicking clients, tearing down state) is up to
    /// the listener.
    fn end_and_kick_all(&self) {}

    fn assign_presenter(&self, _presenters: &[ParticipantId]) {}

    /// Recording switched on or off. `participant` is who asked, or,
    /// for the automatic stop when the room empties, who left last.
    fn recording_status_change(&self, _participant: &Participant, _recording: bool) {}
}

// ---------------------------------------------------------------------------
// ListenerRegistry
// ---------------------------------------------------------------------------

/// A thread-safe set of listeners, unique by name.
///
/// Fan-out never iterates the registry directly. It takes a
/// [`snapshot`](Self::snapshot) (cheap `Arc` clones) and lets go of the
/// lock before calling anyone, so listeners can add or remove listeners
/// from inside a callback.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<String, Arc<dyn RoomListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener under its [`name`](RoomListener::name).
    ///
    /// # Errors
    /// [`RoomError::ListenerAlreadyRegistered`] if the name is taken.
    /// The existing registration is kept, not replaced.
    pub fn add(&self, listener: Arc<dyn RoomListener>) -> Result<(), RoomError> {
        let mut listeners = write(&self.listeners);
        match listeners.entry(listener.name().to_owned()) {
            Entry::Occupied(entry) => Err(RoomError::ListenerAlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(listener);
                Ok(())
            }
        }
    }

    /// Unregisters the listener with this name.
    ///
    /// # Errors
    /// [`RoomError::ListenerNotFound`] if nothing is registered under it.
    pub fn remove(&self, name: &str) -> Result<Arc<dyn RoomListener>, RoomError> {
        write(&self.listeners)
            .remove(name)
            .ok_or_else(|| RoomError::ListenerNotFound(name.to_owned()))
    }

    /// The listeners registered right now. Order is unspecified.
    pub fn snapshot(&self) -> Vec<Arc<dyn RoomListener>> {
        read(&self.listeners).values().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        read(&self.listeners).contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.listeners).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        read(&self.listeners).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.listeners).is_empty()
    }
}
