//! Room state and the voting rules.
//!
//! A `Room` is the authoritative state of one poll. `cast_vote` is the single
//! mutation point for the tally and voter set, and `tick` is the only place
//! the `Active -> Ended` transition happens. Callers hold the room's write
//! lock across each of these, which makes every mutation an indivisible step.

use crate::state::ConnId;
use pollroom_proto::{PollStatus, RoomSnapshot, Tally};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tokio::task::JoinHandle;

/// Vote rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("voting has ended")]
    VotingEnded,

    #[error("option is not part of this poll")]
    UnknownOption,

    #[error("voter has already voted")]
    AlreadyVoted,

    #[error("name {0} is already taken")]
    NameTaken(String),
}

/// Result of one countdown tick.
#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Remaining time dropped to this value; voting continues.
    Counting(u32),
    /// The decrement just reached zero; voting ended on this tick.
    Expired,
    /// The poll had already ended; nothing changed.
    Idle,
}

/// The authoritative state of one poll.
pub struct Room {
    pub code: String,
    pub question: String,
    pub options: [String; 2],
    /// Per-option counts, zero-initialized for both options.
    pub tally: Tally,
    /// Display names that have cast an accepted vote. Never cleared while
    /// the room exists, so a returning name cannot vote twice.
    pub voters: HashSet<String>,
    /// Connection id -> display name, ordered so iteration gives join order.
    pub participants: BTreeMap<ConnId, String>,
    pub duration: u32,
    pub remaining: u32,
    pub status: PollStatus,
    /// Live countdown task, at most one per room.
    timer: Option<JoinHandle<()>>,
}

impl Room {
    /// Create a new active room with a zeroed tally.
    pub fn new(code: String, question: String, options: [String; 2], duration: u32) -> Self {
        let tally = Tally::from([(options[0].clone(), 0), (options[1].clone(), 0)]);
        Self {
            code,
            question,
            options,
            tally,
            voters: HashSet::new(),
            participants: BTreeMap::new(),
            duration,
            remaining: duration,
            status: PollStatus::Active,
            timer: None,
        }
    }

    /// Check whether `name` case-insensitively matches a current participant.
    pub fn name_taken(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.participants
            .values()
            .any(|existing| existing.to_lowercase() == lower)
    }

    /// Add a participant. The caller has already checked name uniqueness.
    pub fn add_participant(&mut self, conn_id: ConnId, name: String) {
        self.participants.insert(conn_id, name);
    }

    /// Remove a participant, returning their display name if they were one.
    pub fn remove_participant(&mut self, conn_id: ConnId) -> Option<String> {
        self.participants.remove(&conn_id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Cast a vote for `option` on behalf of `name`.
    ///
    /// On success the tally increment and the voter-set insert happen
    /// together; on any rejection neither is touched.
    pub fn cast_vote(&mut self, name: &str, option: &str) -> Result<(), RoomError> {
        if !self.status.is_active() {
            return Err(RoomError::VotingEnded);
        }
        if !self.options.iter().any(|o| o == option) {
            return Err(RoomError::UnknownOption);
        }
        if self.voters.contains(name) {
            return Err(RoomError::AlreadyVoted);
        }

        *self.tally.entry(option.to_string()).or_insert(0) += 1;
        self.voters.insert(name.to_string());
        debug_assert_eq!(
            self.tally.values().map(|&n| n as usize).sum::<usize>(),
            self.voters.len()
        );
        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// When the decrement reaches zero the poll ends in the same step:
    /// status flips to `Ended` and the timer handle is dropped, so an ended
    /// room never holds a live handle.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.status.is_active() || self.remaining == 0 {
            return TickOutcome::Idle;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.status = PollStatus::Ended;
            self.timer = None;
            TickOutcome::Expired
        } else {
            TickOutcome::Counting(self.remaining)
        }
    }

    /// Store the countdown task handle. Idempotent: a room that already has
    /// a live handle keeps it, and the new task is aborted instead.
    pub fn set_timer(&mut self, handle: JoinHandle<()>) {
        if self.timer.is_some() {
            handle.abort();
        } else {
            self.timer = Some(handle);
        }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Take the countdown task handle for cancellation on room deletion.
    pub fn take_timer(&mut self) -> Option<JoinHandle<()>> {
        self.timer.take()
    }

    /// Produce a consistent full-state view of the room.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            participants: self.participants.values().cloned().collect(),
            tally: self.tally.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            remaining_seconds: self.remaining,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(
            "AB12CD".to_string(),
            "Best season?".to_string(),
            ["Summer".to_string(), "Winter".to_string()],
            10,
        )
    }

    #[test]
    fn test_new_room_has_zeroed_tally() {
        let room = room();
        assert_eq!(room.tally.get("Summer"), Some(&0));
        assert_eq!(room.tally.get("Winter"), Some(&0));
        assert_eq!(room.remaining, 10);
        assert!(room.status.is_active());
    }

    #[test]
    fn test_vote_updates_tally_and_voters() {
        let mut room = room();
        room.cast_vote("Alice", "Summer").unwrap();
        room.cast_vote("Bob", "Summer").unwrap();
        room.cast_vote("Carol", "Winter").unwrap();
        assert_eq!(room.tally.get("Summer"), Some(&2));
        assert_eq!(room.tally.get("Winter"), Some(&1));
        assert_eq!(room.voters.len(), 3);
    }

    #[test]
    fn test_double_vote_rejected_without_mutation() {
        let mut room = room();
        room.cast_vote("Bob", "Summer").unwrap();
        assert_eq!(room.cast_vote("Bob", "Winter"), Err(RoomError::AlreadyVoted));
        assert_eq!(room.tally.get("Summer"), Some(&1));
        assert_eq!(room.tally.get("Winter"), Some(&0));
        assert_eq!(room.voters.len(), 1);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut room = room();
        assert_eq!(room.cast_vote("Alice", "Spring"), Err(RoomError::UnknownOption));
        assert!(room.voters.is_empty());
    }

    #[test]
    fn test_vote_after_end_rejected() {
        let mut room = room();
        room.remaining = 1;
        assert_eq!(room.tick(), TickOutcome::Expired);
        assert_eq!(room.cast_vote("Alice", "Summer"), Err(RoomError::VotingEnded));
        assert_eq!(room.tally.get("Summer"), Some(&0));
    }

    #[test]
    fn test_tick_counts_down_and_expires_once() {
        let mut room = Room::new(
            "AB12CD".to_string(),
            "q".to_string(),
            ["a".to_string(), "b".to_string()],
            3,
        );
        assert_eq!(room.tick(), TickOutcome::Counting(2));
        assert_eq!(room.tick(), TickOutcome::Counting(1));
        assert_eq!(room.tick(), TickOutcome::Expired);
        assert_eq!(room.status, PollStatus::Ended);
        assert_eq!(room.remaining, 0);
        assert!(!room.has_timer());
        assert_eq!(room.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_name_taken_is_case_insensitive() {
        let mut room = room();
        room.add_participant(1, "Alice".to_string());
        assert!(room.name_taken("alice"));
        assert!(room.name_taken("ALICE"));
        assert!(!room.name_taken("Bob"));
    }

    #[test]
    fn test_remove_participant_is_idempotent() {
        let mut room = room();
        room.add_participant(1, "Alice".to_string());
        assert_eq!(room.remove_participant(1), Some("Alice".to_string()));
        assert_eq!(room.remove_participant(1), None);
        assert!(room.is_empty());
    }

    #[test]
    fn test_snapshot_lists_participants_in_join_order() {
        let mut room = room();
        room.add_participant(2, "Bob".to_string());
        room.add_participant(1, "Alice".to_string());
        room.add_participant(3, "Carol".to_string());
        let snapshot = room.snapshot();
        assert_eq!(snapshot.participants, vec!["Alice", "Bob", "Carol"]);
    }
}
