//! Wire protocol for the pollroomd live poll daemon.
//!
//! Every frame on the wire is a JSON envelope of the form
//! `{"event": "<name>", "data": <payload>}`, expressed here as adjacently
//! tagged serde enums. Field names are camelCase on the wire.

mod event;
mod state;

pub use event::{ClientEvent, ServerEvent};
pub use state::{PollStatus, RoomSnapshot, Tally};
