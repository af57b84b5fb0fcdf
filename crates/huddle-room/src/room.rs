//! The room: shared state for one real-time session.
//!
//! A `Room` is shared (usually behind an `Arc`) by every signaling task
//! of the session. Each of those tasks calls into it concurrently, so the
//! state is split into lock groups that match what has to change
//! together:
//!
//! ```text
//! attendance  Mutex   participants + guest waiting list (coupled: a
//!                     departure must also clear the guest entry)
//! recording   Mutex   on/off flag; always locked AFTER attendance
//! policy      RwLock  guest policy string
//! presenter   RwLock  last assigned presenter list
//! listeners   RwLock  (inside ListenerRegistry)
//! ```
//!
//! Every mutating operation follows the same shape: change state inside
//! the smallest critical section that keeps it consistent, take owned
//! snapshots of whatever the notification needs, release every lock, then
//! call each listener. Listeners can therefore re-enter the room freely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use huddle_protocol::{
    GuestPolicy, Participant, ParticipantId, PendingGuest, RoomInfo, RoomName, StatusValue,
};

use crate::sync::{lock, read, write};
use crate::{ListenerRegistry, RecordingState, RoomConfig, RoomError, RoomListener};

/// Participants and the guests among them waiting for a moderator.
#[derive(Debug, Default)]
pub(crate) struct Attendance {
    pub(crate) participants: HashMap<ParticipantId, Participant>,

    /// Kept in the order guests asked. Unique by id.
    pub(crate) guests_waiting: Vec<PendingGuest>,
}

impl Attendance {
    /// Adds a guest to the waiting list, or refreshes the name of one
    /// already on it without changing their place in line.
    pub(crate) fn put_waiting(&mut self, id: &ParticipantId, name: &str) {
        match self.guests_waiting.iter_mut().find(|g| &g.id == id) {
            Some(guest) => guest.name = name.to_owned(),
            None => self.guests_waiting.push(PendingGuest {
                id: id.clone(),
                name: name.to_owned(),
            }),
        }
    }

    /// Drops a guest from the waiting list. Returns whether they were on it.
    pub(crate) fn remove_waiting(&mut self, id: &ParticipantId) -> bool {
        let before = self.guests_waiting.len();
        self.guests_waiting.retain(|g| &g.id != id);
        self.guests_waiting.len() != before
    }
}

/// Shared state of one session, plus its listeners.
pub struct Room {
    name: RoomName,
    config: RoomConfig,
    pub(crate) attendance: Mutex<Attendance>,
    pub(crate) recording: Mutex<RecordingState>,
    guest_policy: RwLock<GuestPolicy>,
    presenter: RwLock<Option<Vec<ParticipantId>>>,
    listeners: ListenerRegistry,
}

impl Room {
    /// Creates an empty room with the default configuration.
    pub fn new(name: impl Into<RoomName>) -> Self {
        Self::with_config(name, RoomConfig::default())
    }

    /// Creates an empty room with the given configuration.
    pub fn with_config(name: impl Into<RoomName>, config: RoomConfig) -> Self {
        let name = name.into();
        tracing::info!(room = %name, "room created");
        Self {
            guest_policy: RwLock::new(config.default_guest_policy.clone()),
            name,
            config,
            attendance: Mutex::new(Attendance::default()),
            recording: Mutex::new(RecordingState::NotRecording),
            presenter: RwLock::new(None),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn name(&self) -> &RoomName {
        &self.name
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    // =====================================================================
    // Listeners
    // =====================================================================

    /// Registers a listener. Idempotent by name: a second listener with
    /// a name already in use is refused and the first one stays.
    ///
    /// # Errors
    /// [`RoomError::ListenerAlreadyRegistered`] if the name is taken.
    pub fn add_listener(&self, listener: Arc<dyn RoomListener>) -> Result<(), RoomError> {
        let name = listener.name().to_owned();
        self.listeners.add(listener)?;
        tracing::debug!(room = %self.name, listener = %name, "room listener added");
        Ok(())
    }

    /// Unregisters the listener with this name.
    ///
    /// # Errors
    /// [`RoomError::ListenerNotFound`] if no such listener is registered.
    pub fn remove_listener(&self, name: &str) -> Result<(), RoomError> {
        self.listeners.remove(name)?;
        tracing::debug!(room = %self.name, listener = %name, "room listener removed");
        Ok(())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_names(&self) -> Vec<String> {
        self.listeners.names()
    }

    /// Calls `notify` on every listener registered right now.
    ///
    /// Must be called with NO room lock held. Each call is timed against
    /// `config.slow_listener_threshold`; an overrun is logged, nothing
    /// more.
    pub(crate) fn broadcast(&self, event: &'static str, notify: impl Fn(&dyn RoomListener)) {
        let listeners = self.listeners.snapshot();
        tracing::debug!(
            room = %self.name,
            event,
            listeners = listeners.len(),
            "informing room listeners"
        );

        for listener in &listeners {
            let started = Instant::now();
            notify(listener.as_ref());
            let elapsed = started.elapsed();
            if elapsed > self.config.slow_listener_threshold {
                tracing::warn!(
                    room = %self.name,
                    listener = listener.name(),
                    event,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "slow room listener"
                );
            }
        }
    }

    // =====================================================================
    // Participant registry
    // =====================================================================

    /// Adds a participant, or replaces the one with the same id.
    ///
    /// Always succeeds and always notifies `participant_joined`, also on
    /// replacement. Returns the entry that was replaced, if any.
    pub fn add_participant(&self, participant: Participant) -> Option<Participant> {
        let previous = lock(&self.attendance)
            .participants
            .insert(participant.id.clone(), participant.clone());

        tracing::info!(
            room = %self.name,
            participant = %participant.id,
            replaced = previous.is_some(),
            "participant added"
        );

        self.broadcast("participant_joined", |l| l.participant_joined(&participant));
        previous
    }

    /// Removes a participant, and any admission request they had pending.
    ///
    /// If this empties a room that is recording, recording is stopped in
    /// the same critical section, and after `participant_left` listeners
    /// also get `recording_status_change(departed, false)`.
    ///
    /// # Errors
    /// [`RoomError::ParticipantNotFound`] if `id` is not in the room.
    /// Nothing is notified in that case.
    pub fn remove_participant(&self, id: &ParticipantId) -> Result<Participant, RoomError> {
        let (removed, stopped_recording) = {
            let mut attendance = lock(&self.attendance);
            attendance.remove_waiting(id);
            let removed = attendance.participants.remove(id);
            let stopped = removed.is_some()
                && attendance.participants.is_empty()
                && lock(&self.recording).force_stop();
            (removed, stopped)
        };

        let Some(participant) = removed else {
            tracing::debug!(room = %self.name, participant = %id, "remove ignored, not present");
            return Err(self.not_found(id));
        };

        tracing::info!(room = %self.name, participant = %id, "participant removed");
        self.broadcast("participant_left", |l| l.participant_left(&participant));

        if stopped_recording {
            tracing::info!(
                room = %self.name,
                participant = %id,
                "last participant left, recording stopped"
            );
            self.notify_recording(&participant, RecordingState::NotRecording);
        }

        Ok(participant)
    }

    /// Sets one status entry of a participant.
    ///
    /// # Errors
    /// [`RoomError::ParticipantNotFound`] if `id` is not in the room.
    pub fn change_participant_status(
        &self,
        id: &ParticipantId,
        key: impl Into<String>,
        value: StatusValue,
    ) -> Result<(), RoomError> {
        let key = key.into();
        let participant = {
            let mut attendance = lock(&self.attendance);
            let participant = attendance
                .participants
                .get_mut(id)
                .ok_or_else(|| self.not_found(id))?;
            participant.set_status(key.clone(), value.clone());
            participant.clone()
        };

        tracing::debug!(room = %self.name, participant = %id, %key, "participant status changed");
        self.broadcast("participant_status_change", |l| {
            l.participant_status_change(&participant, &key, &value)
        });
        Ok(())
    }

    /// Changes a participant's role.
    ///
    /// # Errors
    /// [`RoomError::ParticipantNotFound`] if `id` is not in the room.
    pub fn set_participant_role(
        &self,
        id: &ParticipantId,
        role: impl Into<String>,
    ) -> Result<(), RoomError> {
        let role = role.into();
        let participant = {
            let mut attendance = lock(&self.attendance);
            let participant = attendance
                .participants
                .get_mut(id)
                .ok_or_else(|| self.not_found(id))?;
            participant.set_role(role.clone());
            participant.clone()
        };

        tracing::info!(room = %self.name, participant = %id, %role, "participant role changed");
        self.broadcast("participant_role_change", |l| {
            l.participant_role_change(&participant, &role)
        });
        Ok(())
    }

    pub fn participant_count(&self) -> usize {
        lock(&self.attendance).participants.len()
    }

    /// Counts participants with the moderator flag. Derived on every
    /// call, never cached.
    pub fn moderator_count(&self) -> usize {
        lock(&self.attendance)
            .participants
            .values()
            .filter(|p| p.is_moderator())
            .count()
    }

    /// A snapshot of everyone in the room, in no particular order.
    pub fn participants(&self) -> Vec<Participant> {
        lock(&self.attendance).participants.values().cloned().collect()
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<Participant> {
        lock(&self.attendance).participants.get(id).cloned()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        lock(&self.attendance).participants.contains_key(id)
    }

    /// Returns `true` if nobody is in the room. Whoever owns the room
    /// uses this to decide when to drop it.
    pub fn is_empty(&self) -> bool {
        lock(&self.attendance).participants.is_empty()
    }

    // =====================================================================
    // Presenter & guest policy
    // =====================================================================

    /// Replaces the presenter list wholesale. The ids are not checked
    /// against the participant registry.
    pub fn assign_presenter(&self, presenters: Vec<ParticipantId>) {
        *write(&self.presenter) = Some(presenters.clone());
        tracing::info!(room = %self.name, presenters = ?presenters, "presenter assigned");
        self.broadcast("assign_presenter", |l| l.assign_presenter(&presenters));
    }

    /// The last assigned presenter list, or `None` if never assigned.
    pub fn current_presenter(&self) -> Option<Vec<ParticipantId>> {
        read(&self.presenter).clone()
    }

    pub fn change_guest_policy(&self, policy: GuestPolicy) {
        *write(&self.guest_policy) = policy.clone();
        tracing::info!(room = %self.name, %policy, "guest policy changed");
        self.broadcast("guest_policy_changed", |l| l.guest_policy_changed(&policy));
    }

    pub fn guest_policy(&self) -> GuestPolicy {
        read(&self.guest_policy).clone()
    }

    /// Tells every listener the session is over.
    ///
    /// Participants are NOT removed here; the listeners reacting to
    /// this are expected to do that.
    pub fn end_and_kick_all(&self) {
        tracing::info!(room = %self.name, "ending session");
        self.broadcast("end_and_kick_all", |l| l.end_and_kick_all());
    }

    // =====================================================================
    // Snapshot
    // =====================================================================

    /// Everything readable about the room in one value.
    pub fn info(&self) -> RoomInfo {
        let (participant_count, moderator_count, guests_waiting) = {
            let attendance = lock(&self.attendance);
            (
                attendance.participants.len(),
                attendance.participants.values().filter(|p| p.is_moderator()).count(),
                attendance.guests_waiting.clone(),
            )
        };
        RoomInfo {
            name: self.name.clone(),
            participant_count,
            moderator_count,
            recording: self.is_recording(),
            guest_policy: self.guest_policy(),
            presenter: self.current_presenter(),
            guests_waiting,
        }
    }

    pub(crate) fn not_found(&self, id: &ParticipantId) -> RoomError {
        RoomError::ParticipantNotFound(id.clone(), self.name.clone())
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("name", &self.name)
            .field("participants", &self.participant_count())
            .field("recording", &self.is_recording())
            .field("listeners", &self.listener_names())
            .finish()
    }
}
