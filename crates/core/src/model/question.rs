use thiserror::Error;

use crate::model::category::CategoryLabel;
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must belong to at least one category")]
    NoCategories,

    #[error("question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("question has no correct option")]
    NoCorrectOption,

    #[error("question has {count} correct options, expected exactly one")]
    MultipleCorrectOptions { count: usize },

    #[error("question points must be > 0")]
    ZeroPoints,
}

//
// ─── OPTION ────────────────────────────────────────────────────────────────────
//

/// One selectable answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
}

impl AnswerOption {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }

    #[must_use]
    pub fn correct(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    #[must_use]
    pub fn wrong(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Immutable multiple-choice question.
///
/// Invariants, enforced by [`QuestionRecord::new`]:
/// - the prompt is non-empty
/// - there is at least one category, with duplicates removed
/// - there are at least two options and exactly one of them is correct
/// - `points > 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    id: QuestionId,
    prompt: String,
    categories: Vec<CategoryLabel>,
    options: Vec<AnswerOption>,
    correct_index: usize,
    points: u32,
}

impl QuestionRecord {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when any of the invariants above does not hold.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        categories: Vec<CategoryLabel>,
        options: Vec<AnswerOption>,
        points: u32,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let mut unique: Vec<CategoryLabel> = Vec::with_capacity(categories.len());
        for label in categories {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        if unique.is_empty() {
            return Err(QuestionError::NoCategories);
        }

        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        let correct: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_correct)
            .map(|(i, _)| i)
            .collect();
        let correct_index = match correct.as_slice() {
            [] => return Err(QuestionError::NoCorrectOption),
            [single] => *single,
            many => {
                return Err(QuestionError::MultipleCorrectOptions { count: many.len() });
            }
        };

        if points == 0 {
            return Err(QuestionError::ZeroPoints);
        }

        Ok(Self {
            id,
            prompt,
            categories: unique,
            options,
            correct_index,
            points,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryLabel] {
        &self.categories
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn correct_option_index(&self) -> usize {
        self.correct_index
    }

    /// True if this question carries at least one of `selected`.
    #[must_use]
    pub fn in_any_category<'a>(
        &self,
        selected: impl IntoIterator<Item = &'a CategoryLabel>,
    ) -> bool {
        selected
            .into_iter()
            .any(|label| self.categories.contains(label))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
