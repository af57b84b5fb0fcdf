//! A simulated moderated session.
//!
//! One task per user plays the part of that user's signaling channel,
//! sending JSON commands into a shared room. A separate task drains an
//! `EventForwarder` and prints every event as it would go out on a bus.
//!
//! Run with `RUST_LOG=debug` to also see the per-listener trace.

use std::sync::Arc;
use std::time::Duration;

use huddle::prelude::*;
use serde_json::json;

const GUESTS: usize = 4;

#[tokio::main]
async fn main() {
    huddle::telemetry::init();

    let room = Arc::new(Room::new("demo-room"));
    let (forwarder, mut events) = EventForwarder::channel("bus");
    room.add_listener(Arc::new(forwarder)).ok();
    room.add_listener(Arc::new(TracingListener::new(room.name().clone()))).ok();

    // -- The "bus": prints every event as encoded JSON --
    let bus = tokio::spawn(async move {
        let mut published = 0usize;
        while let Some(event) = events.recv().await {
            match JsonCodec.encode(&event) {
                Ok(bytes) => println!("bus <- {}", String::from_utf8_lossy(&bytes)),
                Err(e) => tracing::warn!(error = %e, "could not encode event"),
            }
            published += 1;
        }
        published
    });

    // -- Moderator joins and starts recording --
    let moderator = json!({ "id": "mod-1", "name": "Ada", "moderator": true, "role": "MODERATOR" });
    signal(&room, json!({ "type": "Join", "participant": moderator }));
    signal(&room, json!({ "type": "ChangeRecording", "requester": "mod-1", "recording": true }));

    // -- Guests arrive concurrently and knock --
    let mut arrivals = Vec::with_capacity(GUESTS);
    for i in 0..GUESTS {
        let room = Arc::clone(&room);
        arrivals.push(tokio::spawn(async move {
            let id = format!("guest-{i}");
            signal(&room, json!({ "type": "Join", "participant": { "id": id, "name": format!("Guest {i}") } }));
            tokio::time::sleep(Duration::from_millis(5 * i as u64)).await;
            signal(&room, json!({ "type": "AskModerator", "id": id }));
        }));
    }
    for arrival in arrivals {
        if let Err(e) = arrival.await {
            tracing::error!(error = %e, "guest task failed");
        }
    }

    // -- Moderator reviews the list, lets one in, answers the rest --
    signal(&room, json!({ "type": "GuestWaiting", "caller": "mod-1" }));
    signal(&room, json!({ "type": "RespondToGuest", "id": "guest-0", "approved": true }));
    signal(&room, json!({ "type": "RespondToAllGuests", "approved": false }));
    signal(&room, json!({ "type": "ChangeStatus", "id": "guest-0", "key": "raiseHand", "value": true }));
    signal(&room, json!({ "type": "AssignPresenter", "presenters": ["guest-0"] }));
    signal(&room, json!({ "type": "GetInfo" }));

    // -- Everybody leaves; the last departure stops the recording --
    for p in room.participants() {
        signal(&room, json!({ "type": "Leave", "id": p.id }));
    }
    signal(&room, json!({ "type": "EndAndKickAll" }));

    tracing::info!(recording = room.is_recording(), "session over");

    // Dropping the room drops the forwarder, which closes the channel.
    drop(room);
    match bus.await {
        Ok(published) => tracing::info!(published, "bus drained"),
        Err(e) => tracing::error!(error = %e, "bus task failed"),
    }
}

/// Sends one JSON command through the dispatcher and logs the reply.
fn signal(room: &Room, command: serde_json::Value) {
    let bytes = match serde_json::to_vec(&command) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "could not encode command");
            return;
        }
    };
    let reply = dispatch_bytes(room, &JsonCodec, &bytes);
    tracing::info!(
        command = %command["type"],
        reply = %String::from_utf8_lossy(&reply),
        "signal"
    );
}
