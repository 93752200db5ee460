/// Core error type.
///
/// Adapter crates should map their specific failures into this type so the
/// engine can handle them consistently (user-facing denial vs. cleared flow).
/// Malformed user input is deliberately NOT an error: the dialogue controller
/// models it as a re-prompt reply instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("no active session")]
    NoActiveSession,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
