use std::sync::Arc;

use quiz_core::model::{CategoryLabel, QuestionRecord};
use storage::QuestionSource;
use tracing::info;

use crate::error::LoadError;

/// Every question available to the quiz, plus the categories they span.
///
/// Read-only once loaded; [`QuestionBank::reload`] swaps in a fresh copy.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Arc<QuestionRecord>>,
    categories: Vec<CategoryLabel>,
}

impl QuestionBank {
    /// Load and validate every question from `source`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Storage` if the source is unreachable or malformed,
    /// and `LoadError::Empty` if it holds no questions.
    pub async fn load(source: &dyn QuestionSource) -> Result<Self, LoadError> {
        let records = source.load_questions().await?;
        let bank = Self::from_records(records)?;
        info!(
            source = %source.describe(),
            questions = bank.len(),
            categories = bank.categories.len(),
            "question bank loaded"
        );
        Ok(bank)
    }

    /// Build a bank from already-validated records.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Empty` if `records` is empty.
    pub fn from_records(records: Vec<QuestionRecord>) -> Result<Self, LoadError> {
        if records.is_empty() {
            return Err(LoadError::Empty);
        }
        let questions: Vec<Arc<QuestionRecord>> = records.into_iter().map(Arc::new).collect();
        let categories = collect_categories(&questions);
        Ok(Self {
            questions,
            categories,
        })
    }

    /// Replace the bank's contents from `source`, recomputing categories.
    ///
    /// The current contents stay in place if loading fails.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionBank::load`].
    pub async fn reload(&mut self, source: &dyn QuestionSource) -> Result<(), LoadError> {
        *self = Self::load(source).await?;
        Ok(())
    }

    /// Distinct categories across all questions, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> &[CategoryLabel] {
        &self.categories
    }

    #[must_use]
    pub fn questions(&self) -> &[Arc<QuestionRecord>] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn collect_categories(questions: &[Arc<QuestionRecord>]) -> Vec<CategoryLabel> {
    let mut seen: Vec<CategoryLabel> = Vec::new();
    for label in questions.iter().flat_map(|q| q.categories()) {
        if !seen.contains(label) {
            seen.push(label.clone());
        }
    }
    seen
}
