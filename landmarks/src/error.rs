use std::io;

/// Errors surfaced to users of the crate.
///
/// Problems found while patching the landmark tree never end up here; they're
/// recovered from with a full rescan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid preference `{name}`: {reason}")]
    InvalidPreference { name: String, reason: String },
    #[error("malformed preferences: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
