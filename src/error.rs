//! Errors raised while asking the documentation assistant.

/// Shown when a failure response carries no readable body
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Failure of a single ask exchange.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The request never produced a response
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The success body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(String),
    /// The response task ended without reporting back
    #[error("the request was interrupted")]
    Interrupted,
}

impl AskError {
    /// Text placed into the transcript for this failure
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AskError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
