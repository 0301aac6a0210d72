//! State management module.
//!
//! Contains the Hub (shared daemon state) and related entities.

mod codes;
mod conn;
mod hub;
mod room;

pub use codes::{is_valid_code, random_code};
pub use conn::{ConnId, ConnIdGenerator};
pub use hub::{Binding, Hub};
pub use room::{Room, RoomError, TickOutcome};
