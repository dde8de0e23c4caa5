use rand::seq::SliceRandom;
use rand::{Rng, rng};
use std::sync::Arc;

use quiz_core::model::{CategoryLabel, QuestionRecord};

use crate::bank::QuestionBank;
use crate::error::SelectionError;

/// Ordered questions for one quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizSequence(Vec<Arc<QuestionRecord>>);

impl QuizSequence {
    #[must_use]
    pub fn new(questions: Vec<Arc<QuestionRecord>>) -> Self {
        Self(questions)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<QuestionRecord>> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<QuestionRecord>> {
        self.0.iter()
    }

    /// Sum of the points of every question in the sequence.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.0
            .iter()
            .fold(0_u32, |acc, q| acc.saturating_add(q.points()))
    }
}

impl From<Vec<QuestionRecord>> for QuizSequence {
    fn from(questions: Vec<QuestionRecord>) -> Self {
        Self(questions.into_iter().map(Arc::new).collect())
    }
}

/// Selection result for a quiz build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPlan {
    pub sequence: QuizSequence,
    /// How many bank questions matched the selected categories.
    pub matching: usize,
}

/// Picks the questions for a quiz from the bank.
pub struct QuizBuilder<'a> {
    bank: &'a QuestionBank,
}

impl<'a> QuizBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self { bank }
    }

    /// Build a quiz using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// See [`QuizBuilder::build_with_rng`].
    pub fn build(
        self,
        selected: &[CategoryLabel],
        requested_count: u32,
    ) -> Result<QuizPlan, SelectionError> {
        self.build_with_rng(selected, requested_count, &mut rng())
    }

    /// Build a quiz of up to `requested_count` questions.
    ///
    /// - A question matches when it carries at least one selected category.
    /// - Matches are shuffled with Fisher–Yates, so every ordering is equally
    ///   likely, and the first `min(requested_count, matches)` are kept.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::NoCategories` for an empty selection,
    /// `SelectionError::InvalidCount` when `requested_count` is zero, and
    /// `SelectionError::NoMatchingQuestions` when nothing matches.
    pub fn build_with_rng<R: Rng + ?Sized>(
        self,
        selected: &[CategoryLabel],
        requested_count: u32,
        rng: &mut R,
    ) -> Result<QuizPlan, SelectionError> {
        if selected.is_empty() {
            return Err(SelectionError::NoCategories);
        }
        if requested_count == 0 {
            return Err(SelectionError::InvalidCount);
        }

        let mut candidates: Vec<Arc<QuestionRecord>> = self
            .bank
            .questions()
            .iter()
            .filter(|q| q.in_any_category(selected))
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Err(SelectionError::NoMatchingQuestions);
        }

        let matching = candidates.len();
        candidates.as_mut_slice().shuffle(rng);
        candidates.truncate(usize::try_from(requested_count).unwrap_or(usize::MAX));

        Ok(QuizPlan {
            sequence: QuizSequence::new(candidates),
            matching,
        })
    }
}
