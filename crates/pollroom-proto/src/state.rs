//! Room state as observed by clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-option vote counts, keyed by the literal option label.
///
/// Ordered map so serialized tallies are deterministic.
pub type Tally = BTreeMap<String, u32>;

/// Whether a poll is still accepting votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Ended,
}

impl PollStatus {
    /// Votes are only accepted while active.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A complete, internally consistent view of one room.
///
/// Sent whenever membership changes so a late joiner never has to
/// reconstruct state from missed incremental updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Display names of everyone currently in the room, in join order.
    pub participants: Vec<String>,
    pub tally: Tally,
    pub question: String,
    pub options: [String; 2],
    pub remaining_seconds: u32,
    pub status: PollStatus,
}
