//! Error types shared by the helper and the channel connector.
//!
//! Every failure is fatal to the publish/unpublish call in progress. Nothing is retried
//! locally; the caller (usually a publishing job) decides how to report it.

use thiserror::Error;

/// Failure raised by a [`crate::contract::Decryptor`].
///
/// The connector never wraps or rewrites this error: it surfaces to the caller as-is
/// through [`ChannelError::Decryption`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecryptError(pub String);

#[derive(Debug, Error)]
pub enum ChannelError {
    /// Connection failures, timeouts and HTTP client construction errors.
    #[error("{0}")]
    Transport(String),

    /// The channel properties could not be turned into a valid target URI.
    #[error("invalid target URI: {0}")]
    InvalidUri(String),

    #[error("missing channel property: {0}")]
    MissingProperty(&'static str),

    /// The store answered with a status other than the expected one.
    /// Displays as the HTTP reason phrase only.
    #[error("{reason}")]
    UnexpectedStatus { status: u16, reason: String },

    #[error(transparent)]
    Decryption(#[from] DecryptError),

    #[error("content staging failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported media type for this channel: {0}")]
    UnsupportedMediaType(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        ChannelError::Transport(e.to_string())
    }
}
