use async_trait::async_trait;
use quiz_core::model::QuestionRecord;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by question sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed question data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question #{index} is invalid: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: quiz_core::Error,
    },

    #[error("connection error: {0}")]
    Connection(String),
}

/// Read-only provider of question records.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch every question the source holds, in source order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the source is unreachable or its payload is malformed.
    async fn load_questions(&self) -> Result<Vec<QuestionRecord>, StorageError>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Simple in-memory source for tests and embedding.
#[derive(Clone, Default)]
pub struct InMemoryQuestionSource {
    questions: Arc<Mutex<Vec<QuestionRecord>>>,
}

impl InMemoryQuestionSource {
    #[must_use]
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
        }
    }

    /// Replace the held questions; the next load sees the new set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn replace(&self, questions: Vec<QuestionRecord>) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = questions;
        Ok(())
    }
}

#[async_trait]
impl QuestionSource for InMemoryQuestionSource {
    async fn load_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_owned()
    }
}
