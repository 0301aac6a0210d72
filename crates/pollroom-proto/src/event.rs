//! Client and server event envelopes.

use crate::state::{RoomSnapshot, Tally};
use serde::{Deserialize, Serialize};

/// Requests a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Create a new room and become its first participant.
    CreateRoom {
        display_name: String,
        question: String,
        options: [String; 2],
        duration_seconds: u32,
    },
    /// Join an existing room by code.
    JoinRoom {
        display_name: String,
        room_code: String,
    },
    /// Cast a vote in the room this connection is bound to.
    Vote { room_code: String, option: String },
}

/// Events the server pushes to clients.
///
/// `RoomCreated` / `JoinSuccess` / `Error` go to a single connection;
/// the rest are broadcast to every participant of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Reply to the creator with the fresh room.
    RoomCreated {
        room_code: String,
        full_state: RoomSnapshot,
    },
    /// Reply to a joiner with the current room.
    JoinSuccess {
        room_code: String,
        full_state: RoomSnapshot,
    },
    /// Room-wide refresh after any join or leave.
    RoomState(RoomSnapshot),
    /// Incremental tally update after an accepted vote.
    UpdateVotes(Tally),
    /// Incremental countdown update, once per second.
    TimerUpdate(u32),
    /// Final tally, emitted exactly once when the countdown expires.
    PollEnded(Tally),
    /// Request-scoped failure, delivered only to the offending connection.
    Error { message: String },
}
