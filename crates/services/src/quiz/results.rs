use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use quiz_core::model::{CategoryLabel, CategoryScore};

use super::plan::QuizSequence;
use super::service::{QuizSession, SessionState};
use crate::error::SessionError;

/// Final tally of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsSummary {
    pub total_score: u32,
    pub max_possible_points: u32,
    pub question_count: usize,
    pub per_category: BTreeMap<CategoryLabel, CategoryScore>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Read-only projection of session scores into a [`ResultsSummary`].
pub struct ResultsAggregator;

impl ResultsAggregator {
    /// Summarize a completed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotComplete` unless the session has completed.
    pub fn summarize(session: &QuizSession) -> Result<ResultsSummary, SessionError> {
        if !session.is_complete() {
            return Err(SessionError::NotComplete);
        }
        match (
            session.sequence(),
            session.scores(),
            session.started_at(),
            session.completed_at(),
        ) {
            (Some(sequence), Some(state), Some(started_at), Some(completed_at)) => {
                Ok(Self::project(sequence, state, started_at, completed_at))
            }
            _ => Err(SessionError::NotComplete),
        }
    }

    /// Snapshot `state` alongside the maximum `sequence` could have earned.
    #[must_use]
    pub fn project(
        sequence: &QuizSequence,
        state: &SessionState,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> ResultsSummary {
        ResultsSummary {
            total_score: state.total_score(),
            max_possible_points: sequence.total_points(),
            question_count: sequence.len(),
            per_category: state.category_scores().clone(),
            started_at,
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Clock;
    use quiz_core::model::{AnswerOption, QuestionId, QuestionRecord};
    use quiz_core::time::fixed_now;

    fn label(s: &str) -> CategoryLabel {
        CategoryLabel::new(s).unwrap()
    }

    fn build_question(id: u64, categories: &[&str], points: u32) -> QuestionRecord {
        QuestionRecord::new(
            QuestionId::new(id),
            format!("Q{id}"),
            categories.iter().map(|c| label(c)).collect(),
            vec![AnswerOption::correct("right"), AnswerOption::wrong("wrong")],
            points,
        )
        .unwrap()
    }

    #[test]
    fn summarize_before_completion_is_rejected() {
        let mut session = QuizSession::new(Clock::fixed(fixed_now()));
        assert_eq!(
            ResultsAggregator::summarize(&session).unwrap_err(),
            SessionError::NotComplete
        );

        session
            .start(QuizSequence::from(vec![build_question(1, &["A"], 1)]))
            .unwrap();
        session.submit_answer(0).unwrap();
        assert_eq!(
            ResultsAggregator::summarize(&session).unwrap_err(),
            SessionError::NotComplete
        );
    }

    #[test]
    fn summary_reports_totals_and_categories() {
        let mut session = QuizSession::new(Clock::fixed(fixed_now()));
        session
            .start(QuizSequence::from(vec![
                build_question(1, &["X"], 2),
                build_question(2, &["X", "Y"], 3),
            ]))
            .unwrap();

        let first = session.submit_answer(0).unwrap();
        session.advance(first.ticket);
        let second = session.submit_answer(1).unwrap();
        session.advance(second.ticket);

        let summary = ResultsAggregator::summarize(&session).unwrap();
        assert_eq!(summary.total_score, 2);
        assert_eq!(summary.max_possible_points, 5);
        assert_eq!(summary.question_count, 2);

        let x = summary.per_category[&label("X")];
        assert_eq!(
            (x.correct_count(), x.total_count(), x.earned_points(), x.max_points()),
            (1, 2, 2, 5)
        );
        let y = summary.per_category[&label("Y")];
        assert_eq!((y.earned_points(), y.max_points()), (0, 3));

        assert_eq!(summary.started_at, fixed_now());
        assert_eq!(summary.completed_at, fixed_now());
    }
}
