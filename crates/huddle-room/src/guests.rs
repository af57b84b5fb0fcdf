//! Guest admission workflow.
//!
//! Per guest:
//!
//! ```text
//! NotWaiting ──ask_moderator──→ Waiting ──response_to_guest──→ answered (entry gone)
//!                                  │
//!                                  ├──response_to_all_guests──→ answered (entry gone)
//!                                  └──remove_participant──────→ dropped  (entry gone)
//! ```
//!
//! Nothing here runs on a timer; only the public operations move a guest.
//! Admission itself (letting the client in or kicking it) is the job of
//! whoever listens to `guest_response`.

use huddle_protocol::{Participant, ParticipantId, PendingGuest};

use crate::sync::lock;
use crate::{Room, RoomError};

impl Room {
    /// Puts a participant on the waiting list and announces them with
    /// `guest_entrance`. Asking again while already waiting refreshes
    /// the stored name and announces again.
    ///
    /// # Errors
    /// [`RoomError::ParticipantNotFound`] if `id` is not in the room.
    pub fn ask_moderator(&self, id: &ParticipantId) -> Result<(), RoomError> {
        let participant = {
            let mut attendance = lock(&self.attendance);
            let participant = attendance
                .participants
                .get(id)
                .cloned()
                .ok_or_else(|| self.not_found(id))?;
            attendance.put_waiting(id, &participant.name);
            participant
        };

        tracing::info!(room = %self.name(), participant = %id, "guest waiting for moderator");
        self.broadcast("guest_entrance", |l| l.guest_entrance(&participant));
        Ok(())
    }

    /// Rebroadcasts the whole waiting list with
    /// `guest_waiting_for_moderator(caller, list)` and returns the list
    /// that was sent. `caller` is whoever asked for the refresh.
    pub fn guest_waiting(&self, caller: &ParticipantId) -> Vec<PendingGuest> {
        let pending = self.guests_waiting();
        tracing::debug!(
            room = %self.name(),
            caller = %caller,
            pending = pending.len(),
            "broadcasting guest waiting list"
        );
        self.broadcast("guest_waiting_for_moderator", |l| {
            l.guest_waiting_for_moderator(caller, &pending)
        });
        pending
    }

    /// Answers one guest. The entry is removed and `guest_response` is
    /// sent exactly once.
    ///
    /// # Errors
    /// - [`RoomError::ParticipantNotFound`] — the guest left before the
    ///   answer arrived
    /// - [`RoomError::GuestNotWaiting`] — nothing pending for this id,
    ///   e.g. another moderator answered first
    pub fn response_to_guest(&self, id: &ParticipantId, approved: bool) -> Result<(), RoomError> {
        let participant = {
            let mut attendance = lock(&self.attendance);
            let participant = attendance
                .participants
                .get(id)
                .cloned()
                .ok_or_else(|| self.not_found(id))?;
            if !attendance.remove_waiting(id) {
                return Err(RoomError::GuestNotWaiting(id.clone(), self.name().clone()));
            }
            participant
        };

        tracing::info!(room = %self.name(), participant = %id, approved, "guest answered");
        self.broadcast("guest_response", |l| l.guest_response(&participant, approved));
        Ok(())
    }

    /// Answers every waiting guest at once and empties the waiting list.
    ///
    /// Entries whose participant is no longer in the room are dropped
    /// without a notification. Returns the ids that were answered, in
    /// the order they asked.
    pub fn response_to_all_guests(&self, approved: bool) -> Vec<ParticipantId> {
        let answered: Vec<Participant> = {
            let mut attendance = lock(&self.attendance);
            let waiting = std::mem::take(&mut attendance.guests_waiting);
            waiting
                .iter()
                .filter_map(|guest| attendance.participants.get(&guest.id).cloned())
                .collect()
        };

        tracing::info!(
            room = %self.name(),
            approved,
            answered = answered.len(),
            "all waiting guests answered"
        );
        for participant in &answered {
            self.broadcast("guest_response", |l| l.guest_response(participant, approved));
        }

        answered.into_iter().map(|p| p.id).collect()
    }

    /// The current waiting list, in the order guests asked.
    pub fn guests_waiting(&self) -> Vec<PendingGuest> {
        lock(&self.attendance).guests_waiting.clone()
    }

    /// Returns `true` if `id` is waiting for a moderator.
    pub fn is_guest_waiting(&self, id: &ParticipantId) -> bool {
        lock(&self.attendance).guests_waiting.iter().any(|g| &g.id == id)
    }
}
