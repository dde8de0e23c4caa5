//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;

/// Errors emitted while loading the question bank.
///
/// Fatal at startup: the setup screen cannot be offered without questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("question bank is empty")]
    Empty,
}

impl LoadError {
    /// Text shown to the user; details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        "could not load questions"
    }
}

/// Errors emitted while building a quiz from the user's setup choices.
///
/// Recoverable: the setup screen shows the message and asks again.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("select at least one category")]
    NoCategories,
    #[error("no questions available for selection")]
    NoMatchingQuestions,
    #[error("question count must be at least 1")]
    InvalidCount,
}

/// Errors emitted by the quiz session.
///
/// These are contract violations by the caller, not user mistakes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("option {index} is out of range for a question with {len} options")]
    InvalidOption { index: usize, len: usize },
    #[error("quiz sequence is empty")]
    EmptySequence,
    #[error("quiz already started")]
    AlreadyStarted,
    #[error("no quiz in progress")]
    NotInProgress,
    #[error("current question was already answered")]
    AlreadyAnswered,
    #[error("quiz is not complete yet")]
    NotComplete,
}

impl SessionError {
    /// The caller passed an argument that cannot address the current question.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidOption { .. } | Self::EmptySequence)
    }

    /// The call is not allowed in the session's current state.
    #[must_use]
    pub fn is_state_error(&self) -> bool {
        !self.is_invalid_input()
    }
}
