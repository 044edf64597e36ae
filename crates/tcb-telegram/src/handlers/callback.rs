use std::sync::Arc;

use teloxide::prelude::*;

use tcb_core::{
    domain::{ChatId, MessageId, MessageRef},
    replies, Result,
};

use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let data = q.data.clone().unwrap_or_default();
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });

    if let Err(e) = answer_callback(&state, &q.id, &data, message).await {
        tracing::warn!(%data, error = %e, "callback handling failed");
    }
    Ok(())
}

/// Always answer the query first so the client stops spinning, then swap the menu text.
pub(crate) async fn answer_callback(
    state: &AppState,
    callback_id: &str,
    data: &str,
    message: Option<MessageRef>,
) -> Result<()> {
    state.messenger.answer_callback_query(callback_id).await?;

    let Some(html) = replies::callback_text(data, state.version) else {
        tracing::debug!(%data, "unknown callback data");
        return Ok(());
    };
    let Some(message) = message else {
        return Ok(());
    };

    state.messenger.edit_html(message, &html).await
}
