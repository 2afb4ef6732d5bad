use thiserror::Error;

/// Application-level error type shared by the API client and the view layer.
///
/// The taxonomy matches what the backend can actually do to us: the network
/// fails, the server answers with a non-2xx status, the body is not the JSON
/// we expect, or we reject the input ourselves before ever submitting it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The server answered 2xx but reported failure in the body envelope
    /// (`{"success": false, "error": ...}`).
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// True for failures that should be swallowed during a silent poll
    /// (anything the user did not explicitly ask for right now).
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Http { .. })
    }
}
