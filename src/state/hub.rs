//! The Hub - central shared state for the poll daemon.
//!
//! The Hub owns the room registry, the per-connection outbound senders, and
//! the session bindings, all in concurrent maps accessible from any task.
//! It is an explicitly constructed value (no global), so tests can run
//! independent instances side by side.
//!
//! Locking discipline: DashMap guards are never held across `.await`; values
//! are cloned out first. Every room mutation happens under that room's write
//! lock, which reproduces run-to-completion atomicity per room.

use crate::error::HandlerError;
use crate::state::{ConnId, ConnIdGenerator, Room, RoomError, is_valid_code, random_code};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use pollroom_proto::{RoomSnapshot, ServerEvent, Tally};
use std::sync::{Arc, Weak};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};

/// Associates one connection with its room and display name for the
/// connection's lifetime. A bound connection cannot bind again without
/// disconnecting first.
#[derive(Debug, Clone)]
pub struct Binding {
    pub room_code: String,
    pub display_name: String,
}

/// Central shared state container.
pub struct Hub {
    /// All live rooms, indexed by code.
    pub rooms: DashMap<String, Arc<RwLock<Room>>>,

    /// Connection id to outbound queue mapping for routing.
    senders: DashMap<ConnId, mpsc::Sender<ServerEvent>>,

    /// Session bindings, one per joined connection.
    bindings: DashMap<ConnId, Binding>,

    /// Connection id generator for new connections.
    pub conn_ids: ConnIdGenerator,

    /// Self-reference for handing an owned Hub to spawned countdown tasks.
    me: Weak<Hub>,
}

impl Hub {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            rooms: DashMap::new(),
            senders: DashMap::new(),
            bindings: DashMap::new(),
            conn_ids: ConnIdGenerator::new(),
            me: me.clone(),
        })
    }

    /// Register a connection's outbound queue for routing.
    pub fn register_sender(&self, conn_id: ConnId, sender: mpsc::Sender<ServerEvent>) {
        self.senders.insert(conn_id, sender);
    }

    /// Unregister a connection's outbound queue.
    pub fn unregister_sender(&self, conn_id: ConnId) {
        self.senders.remove(&conn_id);
    }

    /// Clone out a room reference without holding the map guard.
    pub fn get_room(&self, code: &str) -> Option<Arc<RwLock<Room>>> {
        self.rooms.get(code).map(|r| Arc::clone(r.value()))
    }

    /// Look up the session binding for a connection.
    pub fn binding(&self, conn_id: ConnId) -> Option<Binding> {
        self.bindings.get(&conn_id).map(|b| b.value().clone())
    }

    /// Create a new room with the creator as sole participant.
    ///
    /// Validates the request, generates a collision-checked code, inserts
    /// the room, binds the creator, and starts the countdown.
    pub async fn create_room(
        &self,
        conn_id: ConnId,
        display_name: &str,
        question: &str,
        options: &[String; 2],
        duration_seconds: u32,
    ) -> Result<(String, RoomSnapshot), HandlerError> {
        let (name, question, options) =
            validate_create(display_name, question, options, duration_seconds)?;

        if self.bindings.contains_key(&conn_id) {
            return Err(HandlerError::Conflict(
                "You are already in a room.".to_string(),
            ));
        }

        // Collision-checked code assignment: the vacant-entry insert reserves
        // the code atomically, so two concurrent creates can never share one.
        let (code, room_ref) = loop {
            let candidate = random_code();
            match self.rooms.entry(candidate.clone()) {
                Entry::Occupied(_) => {
                    debug!(room = %candidate, "room code collision, regenerating");
                    continue;
                }
                Entry::Vacant(slot) => {
                    let mut room = Room::new(
                        candidate.clone(),
                        question.clone(),
                        options.clone(),
                        duration_seconds,
                    );
                    room.add_participant(conn_id, name.clone());
                    let room_ref = Arc::new(RwLock::new(room));
                    slot.insert(Arc::clone(&room_ref));
                    break (candidate, room_ref);
                }
            }
        };

        self.bindings.insert(
            conn_id,
            Binding {
                room_code: code.clone(),
                display_name: name.clone(),
            },
        );

        self.ensure_timer(&code).await;

        let snapshot = room_ref.read().await.snapshot();
        info!(room = %code, conn = %conn_id, name = %name, duration = duration_seconds, "room created");
        Ok((code, snapshot))
    }

    /// Join an existing room under a display name.
    ///
    /// Fails `NotFound` for unknown codes and `Conflict` when the name
    /// case-insensitively matches a current participant of that room. The
    /// same name in a different room is fine. The joiner's `joinSuccess`
    /// reply and the room-wide `roomState` refresh are both enqueued under
    /// the room's write lock, in that order.
    pub async fn join_room(
        &self,
        conn_id: ConnId,
        display_name: &str,
        room_code: &str,
    ) -> Result<RoomSnapshot, HandlerError> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(HandlerError::Validation(
                "Username cannot be empty.".to_string(),
            ));
        }
        if self.bindings.contains_key(&conn_id) {
            return Err(HandlerError::Conflict(
                "You are already in a room.".to_string(),
            ));
        }

        let code = room_code.trim();
        let room_ref = if is_valid_code(code) {
            self.get_room(code)
        } else {
            None
        }
        .ok_or_else(|| HandlerError::NotFound("Room not found.".to_string()))?;

        let snapshot = {
            let mut room = room_ref.write().await;
            if room.name_taken(name) {
                return Err(RoomError::NameTaken(name.to_string()).into());
            }
            room.add_participant(conn_id, name.to_string());
            let snapshot = room.snapshot();
            self.try_send_to(
                conn_id,
                ServerEvent::JoinSuccess {
                    room_code: code.to_string(),
                    full_state: snapshot.clone(),
                },
            );
            self.broadcast_locked(&room, ServerEvent::RoomState(snapshot.clone()));
            snapshot
        };

        self.bindings.insert(
            conn_id,
            Binding {
                room_code: code.to_string(),
                display_name: name.to_string(),
            },
        );

        info!(room = %code, conn = %conn_id, name = %name, "participant joined");
        Ok(snapshot)
    }

    /// Cast a vote on behalf of a bound connection.
    ///
    /// The voter identity comes from the session binding, never from the
    /// payload. The `updateVotes` broadcast is enqueued while the room's
    /// write lock is still held, so two concurrent votes can never deliver
    /// their tallies out of production order.
    pub async fn cast_vote(
        &self,
        conn_id: ConnId,
        room_code: &str,
        option: &str,
    ) -> Result<Tally, HandlerError> {
        let binding = self.binding(conn_id).ok_or_else(|| {
            HandlerError::State("Error processing vote. Try rejoining.".to_string())
        })?;
        if binding.room_code != room_code.trim() {
            return Err(HandlerError::State(
                "Error processing vote. Try rejoining.".to_string(),
            ));
        }

        let room_ref = self
            .get_room(&binding.room_code)
            .ok_or_else(|| HandlerError::NotFound("Room not found.".to_string()))?;

        let tally = {
            let mut room = room_ref.write().await;
            room.cast_vote(&binding.display_name, option)?;
            let tally = room.tally.clone();
            self.broadcast_locked(&room, ServerEvent::UpdateVotes(tally.clone()));
            tally
        };

        info!(room = %binding.room_code, name = %binding.display_name, option = %option, "vote accepted");
        Ok(tally)
    }

    /// Release a connection's binding and remove it from its room.
    ///
    /// If the room becomes empty its countdown is aborted and the room is
    /// dropped from the registry; otherwise the remaining participants get a
    /// refreshed full state. No-op for connections that never joined.
    pub async fn remove_participant(&self, conn_id: ConnId) {
        let Some((_, binding)) = self.bindings.remove(&conn_id) else {
            return;
        };
        let Some(room_ref) = self.get_room(&binding.room_code) else {
            return;
        };

        let deleted = {
            let mut room = room_ref.write().await;
            if room.remove_participant(conn_id).is_none() {
                return;
            }
            if room.is_empty() {
                // Abort the countdown before the room disappears; no tick is
                // observable for this code afterwards.
                if let Some(handle) = room.take_timer() {
                    handle.abort();
                }
                self.rooms.remove(&binding.room_code);
                true
            } else {
                let snapshot = room.snapshot();
                self.broadcast_locked(&room, ServerEvent::RoomState(snapshot));
                false
            }
        };

        if deleted {
            info!(room = %binding.room_code, name = %binding.display_name, "last participant left, room deleted");
        } else {
            debug!(room = %binding.room_code, name = %binding.display_name, "participant left");
        }
    }

    /// Start the countdown for a room. No-op if the room already has a live
    /// timer or no longer exists.
    pub async fn ensure_timer(&self, code: &str) {
        let Some(hub) = self.me.upgrade() else {
            return;
        };
        let Some(room_ref) = self.get_room(code) else {
            return;
        };
        let mut room = room_ref.write().await;
        if room.has_timer() || !room.status.is_active() {
            return;
        }
        room.set_timer(crate::timer::spawn_poll_timer(hub, code.to_string()));
    }

    /// Push an event to every current participant of a room.
    ///
    /// The caller holds the room's lock, so enqueue order equals production
    /// order for everything broadcast within that room.
    pub fn broadcast_locked(&self, room: &Room, event: ServerEvent) {
        for conn_id in room.participants.keys() {
            self.try_send_to(*conn_id, event.clone());
        }
    }

    /// Push an event to a single connection without waiting. Queue-full or
    /// closed receivers are dropped silently; a reader that far behind is
    /// effectively dead and teardown handles the cleanup.
    pub fn try_send_to(&self, conn_id: ConnId, event: ServerEvent) {
        let sender = self.senders.get(&conn_id).map(|s| s.value().clone());
        if let Some(sender) = sender {
            let _ = sender.try_send(event);
        }
    }
}

/// Validate a create request, returning trimmed values.
///
/// Rules are checked in request order and the first violation wins.
fn validate_create(
    display_name: &str,
    question: &str,
    options: &[String; 2],
    duration_seconds: u32,
) -> Result<(String, String, [String; 2]), HandlerError> {
    let name = display_name.trim();
    if name.is_empty() {
        return Err(HandlerError::Validation(
            "Username cannot be empty.".to_string(),
        ));
    }
    let question = question.trim();
    if question.is_empty() {
        return Err(HandlerError::Validation(
            "Poll question cannot be empty.".to_string(),
        ));
    }
    let options = [options[0].trim(), options[1].trim()];
    if options.iter().any(|o| o.is_empty()) {
        return Err(HandlerError::Validation(
            "Please provide exactly two non-empty options.".to_string(),
        ));
    }
    if duration_seconds <= 5 {
        return Err(HandlerError::Validation(
            "Duration must be a number greater than 5 seconds.".to_string(),
        ));
    }
    if options[0].to_lowercase() == options[1].to_lowercase() {
        return Err(HandlerError::Validation(
            "Options cannot be the same.".to_string(),
        ));
    }
    Ok((
        name.to_string(),
        question.to_string(),
        [options[0].to_string(), options[1].to_string()],
    ))
}
