//! Stock listeners: one that logs, one that turns callbacks into events.

use std::sync::atomic::{AtomicBool, Ordering};

use huddle_protocol::{
    GuestPolicy, Participant, ParticipantId, PendingGuest, RoomEvent, RoomName, StatusValue,
};
use tokio::sync::mpsc;

use crate::RoomListener;

// ---------------------------------------------------------------------------
// EventForwarder
// ---------------------------------------------------------------------------

/// A listener that converts every callback into a [`RoomEvent`] and
/// pushes it into an unbounded tokio channel.
///
/// This is the bridge between the room's synchronous callbacks and
/// async code: a task on the receiving end can publish to a bus, write
/// to sockets, or (in tests) just collect. The channel is unbounded
/// because a callback must never block on a slow consumer.
///
/// ```rust
/// use std::sync::Arc;
/// use huddle_protocol::{Participant, RoomEvent};
/// use huddle_room::{EventForwarder, Room};
///
/// let room = Room::new("R1");
/// let (forwarder, mut events) = EventForwarder::channel("bus");
/// room.add_listener(Arc::new(forwarder)).unwrap();
///
/// room.add_participant(Participant::new("u-1", "Ada"));
///
/// let event = events.try_recv().unwrap();
/// assert_eq!(event.kind(), "participant_joined");
/// ```
#[derive(Debug)]
pub struct EventForwarder {
    name: String,
    sender: mpsc::UnboundedSender<RoomEvent>,
    /// Set once the receiver is gone, so the drop is logged only once.
    closed: AtomicBool,
}

impl EventForwarder {
    pub fn new(name: impl Into<String>, sender: mpsc::UnboundedSender<RoomEvent>) -> Self {
        Self {
            name: name.into(),
            sender,
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a forwarder together with the receiving end of its channel.
    pub fn channel(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<RoomEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(name, tx), rx)
    }

    fn forward(&self, event: RoomEvent) {
        if let Err(mpsc::error::SendError(event)) = self.sender.send(event) {
            if !self.closed.swap(true, Ordering::Relaxed) {
                tracing::debug!(
                    listener = %self.name,
                    event = event.kind(),
                    "event receiver dropped, discarding events"
                );
            }
        }
    }
}

impl RoomListener for EventForwarder {
    fn name(&self) -> &str {
        &self.name
    }

    fn participant_joined(&self, participant: &Participant) {
        self.forward(RoomEvent::ParticipantJoined {
            participant: participant.clone(),
        });
    }

    fn participant_left(&self, participant: &Participant) {
        self.forward(RoomEvent::ParticipantLeft {
            participant: participant.clone(),
        });
    }

    fn guest_entrance(&self, participant: &Participant) {
        self.forward(RoomEvent::GuestEntrance {
            participant: participant.clone(),
        });
    }

    fn guest_waiting_for_moderator(&self, caller: &ParticipantId, pending: &[PendingGuest]) {
        self.forward(RoomEvent::GuestWaitingForModerator {
            caller: caller.clone(),
            pending: pending.to_vec(),
        });
    }

    fn guest_response(&self, participant: &Participant, approved: bool) {
        self.forward(RoomEvent::GuestResponse {
            participant: participant.clone(),
            approved,
        });
    }

    fn participant_status_change(&self, participant: &Participant, key: &str, value: &StatusValue) {
        self.forward(RoomEvent::ParticipantStatusChange {
            participant: participant.clone(),
            key: key.to_owned(),
            value: value.clone(),
        });
    }

    fn participant_role_change(&self, participant: &Participant, role: &str) {
        self.forward(RoomEvent::ParticipantRoleChange {
            participant: participant.clone(),
            role: role.to_owned(),
        });
    }

    fn guest_policy_changed(&self, policy: &GuestPolicy) {
        self.forward(RoomEvent::GuestPolicyChanged {
            policy: policy.clone(),
        });
    }

    fn end_and_kick_all(&self) {
        self.forward(RoomEvent::EndAndKickAll);
    }

    fn assign_presenter(&self, presenters: &[ParticipantId]) {
        self.forward(RoomEvent::AssignPresenter {
            presenters: presenters.to_vec(),
        });
    }

    fn recording_status_change(&self, participant: &Participant, recording: bool) {
        self.forward(RoomEvent::RecordingStatusChange {
            participant: participant.clone(),
            recording,
        });
    }
}

// ---------------------------------------------------------------------------
// TracingListener
// ---------------------------------------------------------------------------

/// Logs every notification at `debug`. Registered as `"tracing"`.
#[derive(Debug, Clone)]
pub struct TracingListener {
    room: RoomName,
}

impl TracingListener {
    pub const NAME: &'static str = "tracing";

    pub fn new(room: RoomName) -> Self {
        Self { room }
    }
}

impl RoomListener for TracingListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn participant_joined(&self, participant: &Participant) {
        tracing::debug!(room = %self.room, participant = %participant.id, name = %participant.name, "participant joined");
    }

    fn participant_left(&self, participant: &Participant) {
        tracing::debug!(room = %self.room, participant = %participant.id, "participant left");
    }

    fn guest_entrance(&self, participant: &Participant) {
        tracing::debug!(room = %self.room, participant = %participant.id, "guest entrance");
    }

    fn guest_waiting_for_moderator(&self, caller: &ParticipantId, pending: &[PendingGuest]) {
        tracing::debug!(room = %self.room, %caller, pending = pending.len(), "guests waiting for moderator");
    }

    fn guest_response(&self, participant: &Participant, approved: bool) {
        tracing::debug!(room = %self.room, participant = %participant.id, approved, "guest response");
    }

    fn participant_status_change(&self, participant: &Participant, key: &str, value: &StatusValue) {
        tracing::debug!(room = %self.room, participant = %participant.id, key, %value, "participant status change");
    }

    fn participant_role_change(&self, participant: &Participant, role: &str) {
        tracing::debug!(room = %self.room, participant = %participant.id, role, "participant role change");
    }

    fn guest_policy_changed(&self, policy: &GuestPolicy) {
        tracing::debug!(room = %self.room, %policy, "guest policy changed");
    }

    fn end_and_kick_all(&self) {
        tracing::debug!(room = %self.room, "end and kick all");
    }

    fn assign_presenter(&self, presenters: &[ParticipantId]) {
        tracing::debug!(room = %self.room, ?presenters, "presenter assigned");
    }

    fn recording_status_change(&self, participant: &Participant, recording: bool) {
        tracing::debug!(room = %self.room, participant = %participant.id, recording, "recording status change");
    }
}
