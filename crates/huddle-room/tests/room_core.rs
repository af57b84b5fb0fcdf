//! Integration tests for the room core: registry, guest admission,
//! recording, presenter, and listener fan-out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use huddle_protocol::{GuestPolicy, Participant, ParticipantId, PendingGuest, RoomEvent};
use huddle_room::{EventForwarder, Room, RoomError, RoomListener};
use tokio::sync::mpsc::UnboundedReceiver;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}

fn moderator(id: &str, name: &str) -> Participant {
    Participant::new(id, name).with_moderator(true)
}

fn viewer(id: &str, name: &str) -> Participant {
    Participant::new(id, name)
}

/// A room with one `EventForwarder` named "probe" attached.
fn probed_room(name: &str) -> (Room, UnboundedReceiver<RoomEvent>) {
    let room = Room::new(name);
    let (forwarder, rx) = EventForwarder::channel("probe");
    room.add_listener(Arc::new(forwarder)).unwrap();
    (room, rx)
}

/// Everything delivered so far.
fn drain(rx: &mut UnboundedReceiver<RoomEvent>) -> Vec<RoomEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn kinds(events: &[RoomEvent]) -> Vec<&'static str> {
    events.iter().map(RoomEvent::kind).collect()
}

/// Counts every callback it receives.
struct Counter {
    name: String,
    calls: AtomicUsize,
}

impl Counter {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl RoomListener for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn participant_joined(&self, _: &Participant) {
        self.hit();
    }

    fn participant_left(&self, _: &Participant) {
        self.hit();
    }

    fn recording_status_change(&self, _: &Participant, _: bool) {
        self.hit();
    }
}

// =========================================================================
// Participant registry
// =========================================================================

#[test]
fn test_count_tracks_distinct_live_ids() {
    let room = Room::new("R1");
    room.add_participant(viewer("a", "A"));
    room.add_participant(viewer("b", "B"));
    room.add_participant(viewer("a", "A again"));
    room.add_participant(viewer("c", "C"));
    room.remove_participant(&pid("b")).unwrap();
    let _ = room.remove_participant(&pid("b"));

    assert_eq!(room.participant_count(), 2);
    assert_eq!(room.participant(&pid("a")).unwrap().name, "A again");
}

#[test]
fn test_readd_emits_one_join_per_call() {
    let (room, mut rx) = probed_room("R1");

    room.add_participant(viewer("a", "A"));
    room.add_participant(viewer("a", "A"));

    assert_eq!(room.participant_count(), 1);
    assert_eq!(
        kinds(&drain(&mut rx)),
        vec!["participant_joined", "participant_joined"]
    );
}

#[test]
fn test_remove_never_added_notifies_nobody_and_keeps_recording() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(moderator("a", "A"));
    room.change_recording_status(&pid("a"), true).unwrap();
    drain(&mut rx);

    let result = room.remove_participant(&pid("ghost"));

    assert!(matches!(result, Err(RoomError::ParticipantNotFound(..))));
    assert!(drain(&mut rx).is_empty());
    assert!(room.is_recording());
}

#[test]
fn test_status_and_role_changes_are_notified_with_snapshot() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(viewer("a", "A"));
    drain(&mut rx);

    room.change_participant_status(&pid("a"), "hasStream", serde_json::json!("true,stream=a-1"))
        .unwrap();
    room.set_participant_role(&pid("a"), "MODERATOR").unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    match &events[0] {
        RoomEvent::ParticipantStatusChange { participant, key, value } => {
            assert_eq!(key, "hasStream");
            assert_eq!(value, &serde_json::json!("true,stream=a-1"));
            assert_eq!(participant.status(key), Some(value));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    match &events[1] {
        RoomEvent::ParticipantRoleChange { participant, role } => {
            assert_eq!(role, "MODERATOR");
            assert_eq!(participant.role, "MODERATOR");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_status_change_on_absent_participant_is_silent() {
    let (room, mut rx) = probed_room("R1");
    let result = room.change_participant_status(&pid("ghost"), "k", serde_json::json!(1));
    assert!(result.is_err());
    assert!(drain(&mut rx).is_empty());
}

// =========================================================================
// Guest admission
// =========================================================================

#[test]
fn test_ask_then_accept_leaves_list_empty_with_one_response() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(viewer("b", "Bo"));
    drain(&mut rx);

    room.ask_moderator(&pid("b")).unwrap();
    room.response_to_guest(&pid("b"), true).unwrap();

    assert!(room.guests_waiting().is_empty());
    let events = drain(&mut rx);
    assert_eq!(kinds(&events), vec!["guest_entrance", "guest_response"]);
    assert_eq!(
        events[1],
        RoomEvent::GuestResponse {
            participant: viewer("b", "Bo"),
            approved: true,
        }
    );
}

#[test]
fn test_response_to_all_clears_stale_entries_and_answers_live_ones() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(viewer("b", "Bo"));
    room.add_participant(viewer("c", "Cy"));
    room.add_participant(viewer("d", "Di"));
    room.ask_moderator(&pid("b")).unwrap();
    room.ask_moderator(&pid("c")).unwrap();
    room.ask_moderator(&pid("d")).unwrap();
    room.remove_participant(&pid("c")).unwrap();
    drain(&mut rx);

    let answered = room.response_to_all_guests(false);

    assert_eq!(answered, vec![pid("b"), pid("d")]);
    assert!(room.guests_waiting().is_empty());
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| matches!(e, RoomEvent::GuestResponse { approved: false, .. })));
}

#[test]
fn test_response_after_guest_left_is_ignored() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(viewer("b", "Bo"));
    room.ask_moderator(&pid("b")).unwrap();
    room.remove_participant(&pid("b")).unwrap();
    drain(&mut rx);

    let result = room.response_to_guest(&pid("b"), true);

    assert!(matches!(result, Err(RoomError::ParticipantNotFound(..))));
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_guest_waiting_broadcasts_whole_list_for_caller() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(moderator("a", "Ann"));
    room.add_participant(viewer("b", "Bo"));
    room.add_participant(viewer("c", "Cy"));
    room.ask_moderator(&pid("b")).unwrap();
    room.ask_moderator(&pid("c")).unwrap();
    drain(&mut rx);

    let sent = room.guest_waiting(&pid("a"));

    let expected = vec![
        PendingGuest { id: pid("b"), name: "Bo".into() },
        PendingGuest { id: pid("c"), name: "Cy".into() },
    ];
    assert_eq!(sent, expected);
    assert_eq!(
        drain(&mut rx),
        vec![RoomEvent::GuestWaitingForModerator {
            caller: pid("a"),
            pending: expected,
        }]
    );
}

#[test]
fn test_guest_policy_change_is_stored_and_notified() {
    let (room, mut rx) = probed_room("R1");

    room.change_guest_policy(GuestPolicy::new(GuestPolicy::ALWAYS_DENY));

    assert_eq!(room.guest_policy().as_str(), GuestPolicy::ALWAYS_DENY);
    assert_eq!(
        drain(&mut rx),
        vec![RoomEvent::GuestPolicyChanged {
            policy: GuestPolicy::new(GuestPolicy::ALWAYS_DENY),
        }]
    );
}

// =========================================================================
// Recording
// =========================================================================

#[test]
fn test_last_departure_auto_stops_recording_once() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(moderator("a", "Ann"));
    room.change_recording_status(&pid("a"), true).unwrap();
    drain(&mut rx);

    room.remove_participant(&pid("a")).unwrap();

    assert!(!room.is_recording());
    let events = drain(&mut rx);
    assert_eq!(kinds(&events), vec!["participant_left", "recording_status_change"]);
    assert_eq!(
        events[1],
        RoomEvent::RecordingStatusChange {
            participant: moderator("a", "Ann"),
            recording: false,
        }
    );
}

#[test]
fn test_last_departure_without_recording_sends_no_recording_event() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(moderator("a", "Ann"));
    drain(&mut rx);

    room.remove_participant(&pid("a")).unwrap();

    assert_eq!(kinds(&drain(&mut rx)), vec!["participant_left"]);
}

#[test]
fn test_change_recording_status_is_idempotent() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(moderator("a", "Ann"));
    drain(&mut rx);

    room.change_recording_status(&pid("a"), true).unwrap();
    let _ = room.change_recording_status(&pid("a"), true);
    room.change_recording_status(&pid("a"), false).unwrap();
    let _ = room.change_recording_status(&pid("a"), false);

    assert_eq!(
        kinds(&drain(&mut rx)),
        vec!["recording_status_change", "recording_status_change"]
    );
}

// =========================================================================
// Listeners & fan-out
// =========================================================================

#[test]
fn test_every_listener_gets_every_notification() {
    let room = Room::new("R1");
    let first = Counter::new("first");
    let second = Counter::new("second");
    room.add_listener(first.clone()).unwrap();
    room.add_listener(second.clone()).unwrap();

    room.add_participant(viewer("a", "A"));
    room.remove_participant(&pid("a")).unwrap();

    assert_eq!(first.calls(), 2);
    assert_eq!(second.calls(), 2);
}

#[test]
fn test_duplicate_listener_name_keeps_first_registration() {
    let room = Room::new("R1");
    let original = Counter::new("bus");
    let impostor = Counter::new("bus");
    room.add_listener(original.clone()).unwrap();

    let result = room.add_listener(impostor.clone());
    room.add_participant(viewer("a", "A"));

    assert!(matches!(result, Err(RoomError::ListenerAlreadyRegistered(_))));
    assert_eq!(room.listener_count(), 1);
    assert_eq!(original.calls(), 1);
    assert_eq!(impostor.calls(), 0);
}

#[test]
fn test_removed_listener_stops_receiving() {
    let room = Room::new("R1");
    let counter = Counter::new("ui");
    room.add_listener(counter.clone()).unwrap();
    room.add_participant(viewer("a", "A"));

    room.remove_listener("ui").unwrap();
    room.add_participant(viewer("b", "B"));

    assert_eq!(counter.calls(), 1);
    assert!(matches!(
        room.remove_listener("ui"),
        Err(RoomError::ListenerNotFound(_))
    ));
}

#[test]
fn test_end_and_kick_all_leaves_participants_alone() {
    let (room, mut rx) = probed_room("R1");
    room.add_participant(viewer("a", "A"));
    drain(&mut rx);

    room.end_and_kick_all();

    assert_eq!(drain(&mut rx), vec![RoomEvent::EndAndKickAll]);
    assert_eq!(room.participant_count(), 1);
}

/// A listener that reacts to `end_and_kick_all` by removing everyone,
/// calling back into the room from inside the callback.
struct Kicker {
    room: Mutex<Option<Arc<Room>>>,
}

impl RoomListener for Kicker {
    fn name(&self) -> &str {
        "kicker"
    }

    fn end_and_kick_all(&self) {
        let room = self.room.lock().unwrap().clone();
        if let Some(room) = room {
            for p in room.participants() {
                let _ = room.remove_participant(&p.id);
            }
        }
    }
}

#[test]
fn test_listener_can_reenter_room_without_deadlock() {
    let room = Arc::new(Room::new("R1"));
    let kicker = Arc::new(Kicker {
        room: Mutex::new(Some(Arc::clone(&room))),
    });
    room.add_listener(kicker.clone()).unwrap();
    room.add_participant(moderator("a", "A"));
    room.add_participant(viewer("b", "B"));
    room.change_recording_status(&pid("a"), true).unwrap();

    room.end_and_kick_all();

    assert!(room.is_empty());
    assert!(!room.is_recording());
    // Break the Arc cycle room -> kicker -> room.
    kicker.room.lock().unwrap().take();
}

#[test]
fn test_listener_added_during_fanout_sees_next_event_only() {
    struct Recruiter {
        room: Arc<Room>,
        recruit: Arc<Counter>,
    }

    impl RoomListener for Recruiter {
        fn name(&self) -> &str {
            "recruiter"
        }

        fn participant_joined(&self, _: &Participant) {
            let _ = self.room.add_listener(self.recruit.clone());
        }
    }

    let room = Arc::new(Room::new("R1"));
    let recruit = Counter::new("recruit");
    room.add_listener(Arc::new(Recruiter {
        room: Arc::clone(&room),
        recruit: recruit.clone(),
    }))
    .unwrap();

    room.add_participant(viewer("a", "A"));
    assert_eq!(recruit.calls(), 0);

    room.add_participant(viewer("b", "B"));
    assert_eq!(recruit.calls(), 1);

    room.remove_listener("recruiter").unwrap();
}

// =========================================================================
// Concurrency
// =========================================================================

#[test]
fn test_concurrent_joins_and_leaves_keep_count_consistent() {
    let room = Room::new("R1");
    let counter = Counter::new("counter");
    room.add_listener(counter.clone()).unwrap();

    thread::scope(|s| {
        for t in 0..8 {
            let room = &room;
            s.spawn(move || {
                for i in 0..100 {
                    let id = format!("t{t}-{i}");
                    room.add_participant(Participant::new(id.as_str(), "x"));
                    if i % 2 == 0 {
                        room.remove_participant(&ParticipantId::from(id)).unwrap();
                    }
                }
            });
        }
    });

    assert_eq!(room.participant_count(), 8 * 50);
    // 800 joins + 400 leaves, one callback each.
    assert_eq!(counter.calls(), 1200);
}

#[test]
fn test_concurrent_responses_answer_each_guest_once() {
    let room = Room::new("R1");
    let (forwarder, mut rx) = EventForwarder::channel("probe");
    room.add_listener(Arc::new(forwarder)).unwrap();
    for i in 0..50 {
        let id = format!("g{i}");
        room.add_participant(Participant::new(id.as_str(), "guest"));
        room.ask_moderator(&ParticipantId::from(id)).unwrap();
    }
    drain(&mut rx);

    // Four moderators race to answer every guest individually while a
    // fifth answers everyone in bulk.
    thread::scope(|s| {
        for _ in 0..4 {
            let room = &room;
            s.spawn(move || {
                for i in 0..50 {
                    let _ = room.response_to_guest(&ParticipantId::from(format!("g{i}")), true);
                }
            });
        }
        let room = &room;
        s.spawn(move || {
            room.response_to_all_guests(true);
        });
    });

    let responses = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, RoomEvent::GuestResponse { .. }))
        .count();
    assert_eq!(responses, 50);
    assert!(room.guests_waiting().is_empty());
}

#[test]
fn test_concurrent_recording_requests_notify_once() {
    let room = Room::new("R1");
    let counter = Counter::new("counter");
    room.add_participant(moderator("a", "A"));
    room.add_listener(counter.clone()).unwrap();

    let accepted = AtomicUsize::new(0);
    thread::scope(|s| {
        for _ in 0..16 {
            let (room, accepted) = (&room, &accepted);
            s.spawn(move || {
                if room.change_recording_status(&pid("a"), true).is_ok() {
                    accepted.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert_eq!(counter.calls(), 1);
    assert!(room.is_recording());
}

// =========================================================================
// Scenario
// =========================================================================

#[test]
fn test_moderated_session_scenario() {
    let (room, mut rx) = probed_room("R1");
    let a = moderator("A", "Ann");
    let b = viewer("B", "Bo");

    room.add_participant(a.clone());
    room.add_participant(b.clone());
    assert_eq!(room.participant_count(), 2);
    assert_eq!(room.moderator_count(), 1);

    room.ask_moderator(&b.id).unwrap();
    assert_eq!(
        room.guests_waiting(),
        vec![PendingGuest { id: b.id.clone(), name: b.name.clone() }]
    );

    drain(&mut rx);
    room.response_to_guest(&b.id, true).unwrap();
    assert!(room.guests_waiting().is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![RoomEvent::GuestResponse { participant: b, approved: true }]
    );

    room.assign_presenter(vec![a.id.clone()]);
    assert_eq!(room.current_presenter(), Some(vec![a.id]));
}

#[tokio::test]
async fn test_forwarded_events_arrive_in_call_order() {
    let (room, mut rx) = probed_room("R1");
    let room = Arc::new(room);

    let writer = {
        let room = Arc::clone(&room);
        tokio::task::spawn_blocking(move || {
            room.add_participant(moderator("a", "Ann"));
            room.change_recording_status(&pid("a"), true).unwrap();
            room.remove_participant(&pid("a")).unwrap();
        })
    };
    writer.await.unwrap();

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(rx.recv().await.unwrap().kind());
    }
    assert_eq!(
        seen,
        vec![
            "participant_joined",
            "recording_status_change",
            "participant_left",
            "recording_status_change",
        ]
    );
}
