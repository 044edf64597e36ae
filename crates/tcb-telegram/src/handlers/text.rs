use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use teloxide::prelude::*;

use tcb_core::{
    domain::{ChatId, ChatKind, MessageRef},
    replies,
    routing::{self, Route},
    Result,
};

use crate::router::AppState;

use super::chat_kind;

/// Plain values pulled out of a Telegram text message.
#[derive(Clone, Debug)]
pub(crate) struct IncomingText<'a> {
    pub chat_id: ChatId,
    pub kind: ChatKind,
    pub text: &'a str,
    pub first_name: Option<&'a str>,
    pub is_reply_to_bot: bool,
}

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let is_reply_to_bot = msg
        .reply_to_message()
        .and_then(|m| m.from())
        .map(|u| {
            u.is_bot
                && u.username
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(&state.bot_username))
        })
        .unwrap_or(false);

    let incoming = IncomingText {
        chat_id: ChatId(msg.chat.id.0),
        kind: chat_kind(&msg.chat),
        text,
        first_name: msg.from().map(|u| u.first_name.as_str()),
        is_reply_to_bot,
    };

    // Wall clock is only used for the date; results never depend on it otherwise.
    let now = Local::now().naive_local();
    if let Err(e) = answer_text(&state, &incoming, now).await {
        tracing::warn!(chat_id = incoming.chat_id.0, error = %e, "text reply failed");
    }
    Ok(())
}

/// Evaluate an incoming text and reply; `None` when the bot stays silent.
pub(crate) async fn answer_text(
    state: &AppState,
    incoming: &IncomingText<'_>,
    now: NaiveDateTime,
) -> Result<Option<MessageRef>> {
    let route = routing::decide(
        incoming.kind,
        incoming.text,
        &state.bot_username,
        incoming.is_reply_to_bot,
        state.cfg.group_require_mention,
    );
    let Route::Evaluate { text, addressed } = route else {
        return Ok(None);
    };

    let reply = replies::reply_for(&text, incoming.kind, incoming.first_name, now);
    tracing::debug!(
        chat_id = incoming.chat_id.0,
        kind = ?incoming.kind,
        computed = reply.is_computed(),
        "evaluated text"
    );
    if !reply.is_computed() && !addressed {
        return Ok(None);
    }

    let sent = state
        .messenger
        .send_html(incoming.chat_id, reply.html())
        .await?;
    Ok(Some(sent))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::super::testing::{state, Sent};
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap()
    }

    fn incoming(kind: ChatKind, text: &str, is_reply_to_bot: bool) -> IncomingText<'_> {
        IncomingText {
            chat_id: ChatId(42),
            kind,
            text,
            first_name: Some("Lena"),
            is_reply_to_bot,
        }
    }

    #[tokio::test]
    async fn private_chat_gets_result() {
        let (state, messenger) = state(true);
        let sent = answer_text(&state, &incoming(ChatKind::Private, "18:10 + 45 мин", false), now())
            .await
            .unwrap();
        assert!(sent.is_some());
        assert_eq!(
            messenger.take(),
            vec![Sent::Html(
                ChatId(42),
                "⏰ <b>Результат:</b> <code>18:55</code> (+ 45 мин)".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn private_chat_gets_long_help() {
        let (state, messenger) = state(true);
        answer_text(&state, &incoming(ChatKind::Private, "hello world", false), now())
            .await
            .unwrap();
        assert_eq!(
            messenger.take(),
            vec![Sent::Html(ChatId(42), replies::help_long(Some("Lena")))]
        );
    }

    #[tokio::test]
    async fn group_mention_is_stripped_before_parsing() {
        let (state, messenger) = state(true);
        answer_text(
            &state,
            &incoming(ChatKind::Group, "@time_calc_bot 23:50 + 20", false),
            now(),
        )
        .await
        .unwrap();
        assert_eq!(
            messenger.take(),
            vec![Sent::Html(
                ChatId(42),
                "⏰ <b>Результат:</b> <code>00:10</code> (+ 20 мин)".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn group_without_mention_is_ignored() {
        let (state, messenger) = state(true);
        let sent = answer_text(&state, &incoming(ChatKind::Group, "18:10 + 5", false), now())
            .await
            .unwrap();
        assert!(sent.is_none());
        assert!(messenger.take().is_empty());
    }

    #[tokio::test]
    async fn group_reply_gets_short_help() {
        let (state, messenger) = state(true);
        answer_text(&state, &incoming(ChatKind::Group, "what?", true), now())
            .await
            .unwrap();
        assert_eq!(
            messenger.take(),
            vec![Sent::Html(ChatId(42), replies::help_short())]
        );
    }

    #[tokio::test]
    async fn open_group_answers_results_but_not_chatter() {
        let (state, messenger) = state(false);
        answer_text(&state, &incoming(ChatKind::Group, "meet at 18:10 + 15", false), now())
            .await
            .unwrap();
        answer_text(&state, &incoming(ChatKind::Group, "see you", false), now())
            .await
            .unwrap();
        assert_eq!(
            messenger.take(),
            vec![Sent::Html(
                ChatId(42),
                "⏰ <b>Результат:</b> <code>18:25</code> (+ 15 мин)".to_string()
            )]
        );
    }
}
