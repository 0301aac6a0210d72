//! Unified error handling for pollroomd.
//!
//! Request errors are resolved at the offending connection: they become a
//! single `error` event on that connection's queue and never touch room state.

use crate::state::RoomError;
use pollroom_proto::ServerEvent;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while handling a client event.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Malformed or missing input (empty name, bad options, short duration).
    #[error("{0}")]
    Validation(String),

    /// Room code does not resolve to a live room.
    #[error("{0}")]
    NotFound(String),

    /// Name already taken, voter already voted, or connection already bound.
    #[error("{0}")]
    Conflict(String),

    /// Request arrived in the wrong lifecycle state (e.g. vote after expiry).
    #[error("{0}")]
    State(String),

    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<ServerEvent>),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::State(_) => "state",
            Self::Send(_) => "send_error",
        }
    }

    /// Convert to a client-visible `error` event.
    ///
    /// Returns `None` for errors that don't warrant a reply (a failed send
    /// means the connection is already gone).
    pub fn to_error_event(&self) -> Option<ServerEvent> {
        match self {
            Self::Send(_) => None,
            other => Some(ServerEvent::Error {
                message: other.to_string(),
            }),
        }
    }
}

impl From<RoomError> for HandlerError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::VotingEnded => Self::State("Voting has ended.".to_string()),
            RoomError::UnknownOption => Self::Validation("Invalid voting option.".to_string()),
            RoomError::AlreadyVoted => Self::Conflict("You have already voted.".to_string()),
            RoomError::NameTaken(name) => Self::Conflict(format!(
                "Username \"{name}\" is already taken in this room."
            )),
        }
    }
}

/// Result type for event handlers.
pub type HandlerResult = Result<(), HandlerError>;
