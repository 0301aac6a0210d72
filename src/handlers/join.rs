//! joinRoom handler.

use super::Context;
use crate::error::HandlerResult;

/// Join a room by code.
///
/// The joiner gets a direct `joinSuccess` with the full state (so missed
/// increments never matter), then the whole room gets a membership refresh;
/// the Hub enqueues both under the room's lock so nothing can interleave.
pub async fn handle(ctx: &mut Context<'_>, display_name: &str, room_code: &str) -> HandlerResult {
    ctx.hub
        .join_room(ctx.conn_id, display_name, room_code)
        .await?;
    Ok(())
}
