//! Per-room countdown task.
//!
//! One task per room, spawned when the room is created and never restarted.
//! Each tick decrements the room's remaining time under its write lock and
//! broadcasts the result. The task ends itself on expiry or when the room
//! has disappeared; room deletion aborts it through the stored handle.

use crate::state::{Hub, TickOutcome};
use pollroom_proto::ServerEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

/// Spawn the countdown task for a room.
///
/// Each tick's broadcasts are enqueued while the room's write lock is held,
/// so a tick update can never overtake a vote accepted before it (and the
/// terminal tally and snapshot are mutually consistent).
pub fn spawn_poll_timer(hub: Arc<Hub>, code: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(1);
        // First decrement happens one full period after creation; a bare
        // interval would tick immediately.
        let mut ticks = interval_at(Instant::now() + period, period);

        loop {
            ticks.tick().await;

            // The room may have been deleted between ticks; a timer must
            // never act on a dead code.
            let Some(room_ref) = hub.get_room(&code) else {
                debug!(room = %code, "room gone, countdown task exiting");
                return;
            };

            let done = {
                let mut room = room_ref.write().await;
                match room.tick() {
                    TickOutcome::Counting(remaining) => {
                        hub.broadcast_locked(&room, ServerEvent::TimerUpdate(remaining));
                        false
                    }
                    TickOutcome::Expired => {
                        info!(room = %code, "poll ended");
                        hub.broadcast_locked(&room, ServerEvent::PollEnded(room.tally.clone()));
                        hub.broadcast_locked(&room, ServerEvent::RoomState(room.snapshot()));
                        true
                    }
                    TickOutcome::Idle => true,
                }
            };

            if done {
                return;
            }
        }
    })
}
