use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flash key a redirected page reads its error message from.
pub const FLASH_ERROR_KEY: &str = "error";
/// Flash key for the confirmation shown after a successful form post.
pub const FLASH_SUCCESS_KEY: &str = "success";

/// A recoverable, user-facing failure.
///
/// Raising one aborts the current request; the HTTP layer answers with a
/// redirect to the previous page, keeps the submitted input and flashes the
/// message under [`FLASH_ERROR_KEY`]. It is never treated as a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RedirectException {
    message: String,
}

impl RedirectException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}
