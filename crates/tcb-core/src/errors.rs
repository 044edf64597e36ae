/// Core error type for the time calculator bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can decide consistently between a help reply and a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The text holds no usable `HH:MM` time (missing, out of range, or a number
    /// too large to represent).
    #[error("time expression not understood")]
    NotUnderstood,

    #[error("calculation error: {0}")]
    Calculation(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Whether the user should get format help rather than an error notice.
    pub fn is_not_understood(&self) -> bool {
        matches!(self, Error::NotUnderstood)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
