use thiserror::Error;

use quiz_core::model::SettingsError;
use services::{LoadError, SessionError};

/// Everything that can end the `quiz` binary early.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("quiz session error: {0}")]
    Session(#[from] SessionError),
}

impl AppError {
    /// Line printed to stderr before exiting.
    pub fn user_message(&self) -> String {
        match self {
            Self::Load(err) => err.user_message().to_owned(),
            other => other.to_string(),
        }
    }
}
