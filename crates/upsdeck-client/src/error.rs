//! Error taxonomy for backend API calls

use thiserror::Error;

/// Failure of a single backend API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered but reported a non-success status; `message` is
    /// the server-supplied text and is shown to the user verbatim
    #[error("{message}")]
    Api { message: String },

    /// The request never completed (connection refused, timeout, TLS, ...)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not the expected JSON envelope
    #[error("unexpected response from backend: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Message suitable for a user-facing alert
    ///
    /// API-level failures surface the server text verbatim; transport and
    /// decode failures collapse to a generic message (the full error goes to
    /// the log, not the user).
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message } => message.clone(),
            ApiError::Transport(_) | ApiError::Decode(_) => {
                "Error communicating with the server".to_string()
            }
        }
    }
}
