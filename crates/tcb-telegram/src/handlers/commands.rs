use std::sync::Arc;

use teloxide::prelude::*;

use tcb_core::{
    domain::{ChatId, ChatKind},
    replies, Result,
};

use crate::router::AppState;

use super::chat_kind;

/// Split `/cmd@botname args` into (lowercased cmd, target bot, args).
fn parse_command(text: &str) -> (String, Option<String>, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let mut name = first.trim_start_matches('/').splitn(2, '@');
    let cmd = name.next().unwrap_or("").to_lowercase();
    let target = name.next().filter(|t| !t.is_empty()).map(str::to_string);

    (cmd, target, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let chat_id = ChatId(msg.chat.id.0);
    let kind = chat_kind(&msg.chat);
    if let Err(e) = run_command(&state, chat_id, kind, text).await {
        tracing::warn!(chat_id = chat_id.0, error = %e, "command reply failed");
    }
    Ok(())
}

pub(crate) async fn run_command(
    state: &AppState,
    chat_id: ChatId,
    kind: ChatKind,
    text: &str,
) -> Result<()> {
    let (cmd, target, _args) = parse_command(text);

    // `/start@other_bot` in a group is meant for another bot.
    if let Some(target) = target {
        if !target.eq_ignore_ascii_case(&state.bot_username) {
            return Ok(());
        }
    }

    tracing::debug!(chat_id = chat_id.0, ?kind, %cmd, "command");

    match cmd.as_str() {
        "start" => {
            state
                .messenger
                .send_inline_keyboard(
                    chat_id,
                    &replies::start_text(),
                    replies::start_keyboard(&state.bot_username),
                )
                .await?;
        }
        "help" => {
            let html = match kind {
                ChatKind::Private => replies::help_long(None),
                ChatKind::Group => replies::help_short(),
            };
            state.messenger.send_html(chat_id, &html).await?;
        }
        "about" => {
            state
                .messenger
                .send_html(chat_id, &replies::about_text(state.version))
                .await?;
        }
        _ => {}
    }
    Ok(())
}
