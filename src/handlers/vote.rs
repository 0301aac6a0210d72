//! vote handler.

use super::Context;
use crate::error::HandlerResult;

/// Cast a vote.
///
/// Acceptance is decided entirely by the room's voting rules; the voter
/// identity comes from this connection's binding. The Hub broadcasts the
/// updated tally under the room's lock.
pub async fn handle(ctx: &mut Context<'_>, room_code: &str, option: &str) -> HandlerResult {
    ctx.hub.cast_vote(ctx.conn_id, room_code, option).await?;
    Ok(())
}
