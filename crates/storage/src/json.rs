use async_trait::async_trait;
use quiz_core::model::QuestionRecord;
use std::path::PathBuf;

use crate::mapping::{RawQuestion, map_question};
use crate::repository::{QuestionSource, StorageError};

/// Parse a JSON array of questions and validate every record.
///
/// # Errors
///
/// Returns `StorageError::Parse` for malformed JSON or missing fields, and
/// `StorageError::InvalidRecord` for the first record that breaks a question invariant.
pub fn parse_questions(payload: &str) -> Result<Vec<QuestionRecord>, StorageError> {
    let raw: Vec<RawQuestion> = serde_json::from_str(payload)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, q)| map_question(index, q))
        .collect()
}

/// Static JSON file holding the question bank.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for JsonFileSource {
    async fn load_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let payload =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| StorageError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        parse_questions(&payload)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
