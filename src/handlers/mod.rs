//! Client event handlers.
//!
//! Each inbound event is dispatched by variant to a handler function. A
//! handler validates through the Hub, mutates exactly one room under its
//! lock, and emits replies/broadcasts; errors bubble up and become a single
//! `error` event on the offending connection.

mod create;
mod join;
mod vote;

use crate::error::HandlerResult;
use crate::state::{ConnId, Hub};
use pollroom_proto::{ClientEvent, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handler context for one inbound event.
pub struct Context<'a> {
    /// The connection the event arrived on.
    pub conn_id: ConnId,
    /// Shared daemon state.
    pub hub: &'a Arc<Hub>,
    /// Outbound queue of the requesting connection, for direct replies.
    pub sender: &'a mpsc::Sender<ServerEvent>,
}

/// Dispatch an inbound event to its handler.
pub async fn dispatch(ctx: &mut Context<'_>, event: ClientEvent) -> HandlerResult {
    match event {
        ClientEvent::CreateRoom {
            display_name,
            question,
            options,
            duration_seconds,
        } => create::handle(ctx, &display_name, &question, &options, duration_seconds).await,
        ClientEvent::JoinRoom {
            display_name,
            room_code,
        } => join::handle(ctx, &display_name, &room_code).await,
        ClientEvent::Vote { room_code, option } => vote::handle(ctx, &room_code, &option).await,
    }
}
