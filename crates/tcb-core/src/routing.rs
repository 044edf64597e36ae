//! Which incoming texts the bot answers, depending on the chat it sits in.

use crate::domain::ChatKind;

/// What to do with an incoming non-command text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Evaluate this text (mention already removed).
    Evaluate { text: String, addressed: bool },
    Ignore,
}

/// Case-insensitive `@username` test. An empty username never matches.
pub fn mentions_bot(text: &str, bot_username: &str) -> bool {
    let name = bot_username.trim_start_matches('@');
    if name.is_empty() {
        return false;
    }
    let needle = format!("@{}", name.to_lowercase());
    text.to_lowercase().contains(&needle)
}

/// Remove every `@username` occurrence so its letters and digits never reach the parser.
pub fn strip_mention(text: &str, bot_username: &str) -> String {
    let name = bot_username.trim_start_matches('@');
    if name.is_empty() {
        return text.to_string();
    }
    let needle: Vec<char> = format!("@{name}").to_lowercase().chars().collect();

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let matches = i + needle.len() <= chars.len()
            && chars[i..i + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(c, n)| c.to_lowercase().eq(n.to_lowercase()));
        if matches {
            out.push(' ');
            i += needle.len();
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out.trim().to_string()
}

/// Decide whether a text gets evaluated.
///
/// Private chats: always. Groups: only when the bot is mentioned or replied to, unless
/// `require_mention` is off. `addressed` tells the caller whether a failure deserves a
/// (short) help reply; unaddressed group texts fail silently.
pub fn decide(
    kind: ChatKind,
    text: &str,
    bot_username: &str,
    is_reply_to_bot: bool,
    require_mention: bool,
) -> Route {
    if text.trim().is_empty() {
        return Route::Ignore;
    }

    match kind {
        ChatKind::Private => Route::Evaluate {
            text: strip_mention(text, bot_username),
            addressed: true,
        },
        ChatKind::Group => {
            let addressed = is_reply_to_bot || mentions_bot(text, bot_username);
            if !addressed && require_mention {
                return Route::Ignore;
            }
            let text = strip_mention(text, bot_username);
            if text.is_empty() && !addressed {
                return Route::Ignore;
            }
            Route::Evaluate { text, addressed }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_detection_ignores_case() {
        assert!(mentions_bot("@TimeCalcBot 18:10 + 5", "timecalcbot"));
        assert!(mentions_bot("hey @timecalcbot", "@TimeCalcBot"));
        assert!(!mentions_bot("18:10 + 5", "timecalcbot"));
        assert!(!mentions_bot("@someone", ""));
    }

    #[test]
    fn strips_every_mention() {
        assert_eq!(
            strip_mention("@Time_h24_bot 18:10 + 5 @time_h24_bot", "time_h24_bot"),
            "18:10 + 5"
        );
        assert_eq!(strip_mention("Привет 18:10", "bot"), "Привет 18:10");
    }

    #[test]
    fn private_chats_always_evaluate() {
        assert_eq!(
            decide(ChatKind::Private, "18:10 + 5", "bot", false, true),
            Route::Evaluate {
                text: "18:10 + 5".to_string(),
                addressed: true
            }
        );
        assert_eq!(
            decide(ChatKind::Private, "   ", "bot", false, true),
            Route::Ignore
        );
    }

    #[test]
    fn groups_need_a_mention_or_reply() {
        assert_eq!(
            decide(ChatKind::Group, "18:10 + 5", "bot", false, true),
            Route::Ignore
        );
        assert_eq!(
            decide(ChatKind::Group, "@bot 18:10 + 5", "bot", false, true),
            Route::Evaluate {
                text: "18:10 + 5".to_string(),
                addressed: true
            }
        );
        assert_eq!(
            decide(ChatKind::Group, "18:10 + 5", "bot", true, true),
            Route::Evaluate {
                text: "18:10 + 5".to_string(),
                addressed: true
            }
        );
    }

    #[test]
    fn groups_without_mention_requirement_stay_quiet_on_failure() {
        assert_eq!(
            decide(ChatKind::Group, "lunch?", "bot", false, false),
            Route::Evaluate {
                text: "lunch?".to_string(),
                addressed: false
            }
        );
    }
}
