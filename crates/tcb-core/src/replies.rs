//! User-facing texts (Telegram HTML) and reply composition.

use chrono::NaiveDateTime;

use crate::{
    calculator::{self, Calculation},
    domain::ChatKind,
    formatting::{code, escape_html},
    messaging::types::{InlineButton, InlineKeyboard},
};

pub const CALLBACK_EXAMPLES: &str = "examples";
pub const CALLBACK_ABOUT: &str = "about";

/// Reply to a free-form text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Computed(String),
    /// The text was not understood; carries the help text for the chat kind.
    Help(String),
    /// Parsed fine but the calculation failed.
    Failed(String),
}

impl Reply {
    pub fn html(&self) -> &str {
        match self {
            Reply::Computed(s) | Reply::Help(s) | Reply::Failed(s) => s,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Reply::Computed(_))
    }
}

/// Evaluate `text` at `now` and compose the reply for the chat it came from.
pub fn reply_for(
    text: &str,
    kind: ChatKind,
    first_name: Option<&str>,
    now: NaiveDateTime,
) -> Reply {
    match calculator::evaluate(text, now) {
        Ok(calc) => Reply::Computed(result_text(&calc)),
        Err(e) if e.is_not_understood() => Reply::Help(match kind {
            ChatKind::Private => help_long(first_name),
            ChatKind::Group => help_short(),
        }),
        Err(e) => {
            tracing::warn!(error = %e, "calculation failed");
            Reply::Failed(calculation_error_text())
        }
    }
}

pub fn result_text(calc: &Calculation) -> String {
    let mut out = format!("⏰ <b>Результат:</b> {}", code(calc.time()));
    if let Some(a) = calc.annotation() {
        out.push(' ');
        out.push_str(&escape_html(a));
    }
    out
}

pub fn calculation_error_text() -> String {
    "❌ Ошибка в формате времени. Попробуй число поменьше.".to_string()
}

pub fn start_text() -> String {
    [
        "👋 <b>Привет! Я Time Calculator Bot</b>",
        "",
        "⏰ <b>Я умею считать время!</b>",
        "",
        "📝 <b>Примеры использования:</b>",
        "• <code>18:10 + 45 мин</code> → <code>18:55</code>",
        "• <code>18-10 + 1час 30 минут</code> → <code>19:40</code>",
        "• <code>18.10 - 30 мин</code> → <code>17:40</code>",
        "• <code>18 10 + 45</code> → <code>18:55</code>",
        "",
        "🔧 <b>Поддерживаемые форматы:</b>",
        "• Разделители: <code>:</code>, <code>-</code>, <code>.</code>, пробел",
        "• Единицы: <code>мин</code>, <code>м</code>, <code>час</code>, <code>ч</code>, <code>min</code>, <code>hour</code>",
        "• Операции: <code>+</code> (прибавить), <code>-</code> (отнять)",
        "",
        "💡 <b>Просто напиши мне выражение и я посчитаю!</b>",
    ]
    .join("\n")
}

pub fn examples_text() -> String {
    [
        "📚 <b>Примеры использования:</b>",
        "",
        "1️⃣ <b>Простое сложение:</b>",
        "<code>18:10 + 45 мин</code> → <code>18:55</code>",
        "",
        "2️⃣ <b>С часами и минутами:</b>",
        "<code>14:00 + 1час 30 минут</code> → <code>15:30</code>",
        "",
        "3️⃣ <b>Вычитание:</b>",
        "<code>20:00 - 45 мин</code> → <code>19:15</code>",
        "",
        "4️⃣ <b>Разные разделители:</b>",
        "<code>18-10 + 30м</code> → <code>18:40</code>",
        "<code>18.10 + 1ч</code> → <code>19:10</code>",
        "<code>18 10 + 45</code> → <code>18:55</code>",
        "",
        "↩️ Напиши /start чтобы вернуться",
    ]
    .join("\n")
}

pub fn about_text(version: &str) -> String {
    format!(
        "⚙️ <b>О боте:</b>\n\n\
         🤖 <b>Time Calculator Bot</b>\n\
         Версия: {}\n\n\
         💡 Этот бот помогает быстро считать время,\n\
         прибавляя или отнимая минуты и часы.\n\n\
         ↩️ Напиши /start чтобы вернуться",
        escape_html(version)
    )
}

/// Help for direct chats.
pub fn help_long(first_name: Option<&str>) -> String {
    let greeting = match first_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("👋 Привет, {}!\n\n", escape_html(name)),
        None => String::new(),
    };
    format!(
        "{greeting}🤔 Я не понял формат. Попробуй один из этих вариантов:\n\n\
         • <code>18:10 + 45 мин</code>\n\
         • <code>18-10 + 45м</code>\n\
         • <code>18.10 + 1час 30 минут</code>\n\
         • <code>18 10 + 45</code>\n\
         • <code>18:10 - 30 мин</code>\n\n\
         Напиши /start чтобы узнать как мной пользоваться!"
    )
}

/// Help for group chats.
pub fn help_short() -> String {
    "🤔 Не понял. Пример: <code>18:10 + 45 мин</code>".to_string()
}

/// Menu under the /start message.
pub fn start_keyboard(bot_username: &str) -> InlineKeyboard {
    let mut rows = vec![vec![
        InlineButton::callback("📚 Примеры", CALLBACK_EXAMPLES),
        InlineButton::callback("⚙️ О боте", CALLBACK_ABOUT),
    ]];
    let name = bot_username.trim_start_matches('@');
    if !name.is_empty() {
        rows.push(vec![InlineButton::url(
            "🔗 Добавить в чат",
            format!("https://t.me/{name}?startgroup=true"),
        )]);
    }
    InlineKeyboard::new(rows)
}

/// Text for a menu button, `None` for unknown callback data.
pub fn callback_text(data: &str, version: &str) -> Option<String> {
    match data {
        CALLBACK_EXAMPLES => Some(examples_text()),
        CALLBACK_ABOUT => Some(about_text(version)),
        _ => None,
    }
}
