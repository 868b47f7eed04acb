use thiserror::Error;

/// Failure taxonomy for every operation the console performs.
///
/// Transport failures mean no response was received at all; they are
/// distinct from HTTP error statuses, which the client hands back to the
/// caller as ordinary responses and which become `Api` errors only when an
/// operation decides the status is fatal to it.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status with the backend-supplied message (or a fallback).
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// Caught locally before any network call is attempted.
    #[error("{0}")]
    Precondition(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The login redirect target did not carry a parsable user id and
    /// verification token pair.
    #[error("no verification token in redirect target")]
    NoVerificationToken,
}

impl ConsoleError {
    pub fn precondition(message: impl Into<String>) -> Self {
        ConsoleError::Precondition(message.into())
    }

    /// True when the failure came from an HTTP status rather than the
    /// transport or local validation.
    pub fn is_api(&self) -> bool {
        matches!(self, ConsoleError::Api { .. })
    }
}
