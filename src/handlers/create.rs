//! createRoom handler.

use super::Context;
use crate::error::HandlerResult;
use pollroom_proto::ServerEvent;

/// Create a room and confirm it to the creator.
///
/// The creator is the sole participant at this point, so the confirmation
/// reply is the only message; the countdown task takes over from here.
pub async fn handle(
    ctx: &mut Context<'_>,
    display_name: &str,
    question: &str,
    options: &[String; 2],
    duration_seconds: u32,
) -> HandlerResult {
    let (room_code, full_state) = ctx
        .hub
        .create_room(ctx.conn_id, display_name, question, options, duration_seconds)
        .await?;

    ctx.sender
        .send(ServerEvent::RoomCreated {
            room_code,
            full_state,
        })
        .await?;
    Ok(())
}
