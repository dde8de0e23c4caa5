use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use quiz_core::Clock;
use quiz_core::model::{CategoryLabel, CategoryScore, QuestionRecord, SessionId};

use super::plan::QuizSequence;
use super::progress::QuizProgress;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where a quiz session stands.
///
/// `InProgress { answered: true, .. }` is the feedback window: the current
/// question has been scored and the session waits for [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    InProgress { index: usize, answered: bool },
    Completed,
}

/// Scoring state accumulated while answering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    current_index: usize,
    total_score: u32,
    category_scores: BTreeMap<CategoryLabel, CategoryScore>,
}

impl SessionState {
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[must_use]
    pub fn category_scores(&self) -> &BTreeMap<CategoryLabel, CategoryScore> {
        &self.category_scores
    }

    fn record(&mut self, question: &QuestionRecord, is_correct: bool) {
        if is_correct {
            self.total_score = self.total_score.saturating_add(question.points());
        }
        for label in question.categories() {
            self.category_scores
                .entry(label.clone())
                .or_default()
                .record(question.points(), is_correct);
        }
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// Verdict for one submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_option_index: usize,
    pub selected_index: usize,
    pub points_awarded: u32,
}

/// Identifies the pending move past an answered question.
///
/// Only the ticket issued for the live session and its current question is
/// honored; anything older is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    session_id: SessionId,
    index: usize,
}

impl AdvanceTicket {
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// What `submit_answer` hands back: the verdict and the ticket to advance with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSubmission {
    pub outcome: AnswerOutcome,
    pub ticket: AdvanceTicket,
}

/// Result of applying an advance ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceResult {
    /// Moved on to the question at `index`.
    Next { index: usize },
    /// The last question was answered.
    Completed,
    /// The ticket no longer matches the session; nothing changed.
    Stale,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

struct Run {
    id: SessionId,
    sequence: QuizSequence,
    scores: SessionState,
    awaiting_advance: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Question-by-question quiz state machine.
///
/// `NotStarted -> InProgress -> Completed`, with [`QuizSession::restart`]
/// returning to `NotStarted` from anywhere.
pub struct QuizSession {
    clock: Clock,
    run: Option<Run>,
}

impl QuizSession {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock, run: None }
    }

    /// Begin a quiz over `sequence`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySequence` if `sequence` is empty, or
    /// `SessionError::AlreadyStarted` unless the session is `NotStarted`.
    pub fn start(&mut self, sequence: QuizSequence) -> Result<SessionId, SessionError> {
        if self.run.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        if sequence.is_empty() {
            return Err(SessionError::EmptySequence);
        }

        let id = SessionId::random();
        debug!(session = %id, questions = sequence.len(), "quiz session started");
        self.run = Some(Run {
            id,
            sequence,
            scores: SessionState::default(),
            awaiting_advance: false,
            started_at: self.clock.now(),
            completed_at: None,
        });
        Ok(id)
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        match &self.run {
            None => QuizState::NotStarted,
            Some(run) if run.completed_at.is_some() => QuizState::Completed,
            Some(run) => QuizState::InProgress {
                index: run.scores.current_index,
                answered: run.awaiting_advance,
            },
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state(), QuizState::Completed)
    }

    fn active(&self) -> Result<&Run, SessionError> {
        self.run
            .as_ref()
            .filter(|run| run.completed_at.is_none())
            .ok_or(SessionError::NotInProgress)
    }

    /// The question currently on screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` unless the quiz is in progress.
    pub fn current_question(&self) -> Result<&Arc<QuestionRecord>, SessionError> {
        let run = self.active()?;
        run.sequence
            .get(run.scores.current_index)
            .ok_or(SessionError::NotInProgress)
    }

    /// Score `option_index` for the current question.
    ///
    /// Awards the question's points when correct and updates the tally of every
    /// category the question belongs to. The session then waits in the feedback
    /// window until [`QuizSession::advance`] is called with the returned ticket.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` unless the quiz is in progress,
    /// `SessionError::AlreadyAnswered` if the current question was already scored,
    /// and `SessionError::InvalidOption` if `option_index` is out of range.
    pub fn submit_answer(&mut self, option_index: usize) -> Result<AnswerSubmission, SessionError> {
        let run = self
            .run
            .as_mut()
            .filter(|run| run.completed_at.is_none())
            .ok_or(SessionError::NotInProgress)?;
        if run.awaiting_advance {
            return Err(SessionError::AlreadyAnswered);
        }

        let index = run.scores.current_index;
        let question = Arc::clone(run.sequence.get(index).ok_or(SessionError::NotInProgress)?);
        let option = question
            .options()
            .get(option_index)
            .ok_or(SessionError::InvalidOption {
                index: option_index,
                len: question.options().len(),
            })?;

        let is_correct = option.is_correct;
        run.scores.record(&question, is_correct);
        run.awaiting_advance = true;

        let outcome = AnswerOutcome {
            is_correct,
            correct_option_index: question.correct_option_index(),
            selected_index: option_index,
            points_awarded: if is_correct { question.points() } else { 0 },
        };
        debug!(
            session = %run.id,
            question = %question.id(),
            index,
            correct = is_correct,
            "answer recorded"
        );

        Ok(AnswerSubmission {
            outcome,
            ticket: AdvanceTicket {
                session_id: run.id,
                index,
            },
        })
    }

    /// Move past an answered question.
    ///
    /// Tickets from a restarted session, or for a question that is no longer
    /// current, are ignored and reported as `AdvanceResult::Stale`.
    pub fn advance(&mut self, ticket: AdvanceTicket) -> AdvanceResult {
        let now = self.clock.now();
        let Some(run) = self.run.as_mut() else {
            return AdvanceResult::Stale;
        };
        if run.id != ticket.session_id
            || run.scores.current_index != ticket.index
            || !run.awaiting_advance
            || run.completed_at.is_some()
        {
            return AdvanceResult::Stale;
        }

        run.awaiting_advance = false;
        run.scores.current_index += 1;
        if run.scores.current_index >= run.sequence.len() {
            run.completed_at = Some(now);
            debug!(session = %run.id, score = run.scores.total_score, "quiz session completed");
            AdvanceResult::Completed
        } else {
            AdvanceResult::Next {
                index: run.scores.current_index,
            }
        }
    }

    /// Drop the current quiz, if any, and return to `NotStarted`.
    pub fn restart(&mut self) {
        if let Some(run) = self.run.take() {
            debug!(session = %run.id, "quiz session discarded");
        }
    }

    #[must_use]
    pub fn sequence(&self) -> Option<&QuizSequence> {
        self.run.as_ref().map(|run| &run.sequence)
    }

    #[must_use]
    pub fn scores(&self) -> Option<&SessionState> {
        self.run.as_ref().map(|run| &run.scores)
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.run.as_ref().map(|run| run.started_at)
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.run.as_ref().and_then(|run| run.completed_at)
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let Some(run) = &self.run else {
            return QuizProgress::default();
        };
        let total = run.sequence.len();
        let answered = (run.scores.current_index + usize::from(run.awaiting_advance)).min(total);
        QuizProgress {
            total,
            answered,
            remaining: total - answered,
            is_complete: run.completed_at.is_some(),
        }
    }

    /// "Question 2 of 5" style label for the current question.
    #[must_use]
    pub fn progress_label(&self) -> Option<String> {
        let run = self.active().ok()?;
        Some(format!(
            "Question {} of {}",
            run.scores.current_index + 1,
            run.sequence.len()
        ))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("QuizSession");
        s.field("state", &self.state());
        if let Some(run) = &self.run {
            s.field("id", &run.id)
                .field("questions", &run.sequence.len())
                .field("total_score", &run.scores.total_score)
                .field("started_at", &run.started_at)
                .field("completed_at", &run.completed_at);
        }
        s.finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, QuestionId};
    use crate::quiz::ResultsAggregator;
    use quiz_core::time::{fixed_clock, fixed_now};

    fn label(s: &str) -> CategoryLabel {
        CategoryLabel::new(s).unwrap()
    }

    /// Two options, the first one correct.
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

    fn started(questions: Vec<QuestionRecord>) -> QuizSession {
        let mut session = QuizSession::new(fixed_clock());
        session.start(QuizSequence::from(questions)).unwrap();
        session
    }

    fn answer_and_advance(session: &mut QuizSession, option: usize) -> AdvanceResult {
        let submission = session.submit_answer(option).unwrap();
        session.advance(submission.ticket)
    }

    #[test]
    fn new_session_is_not_started() {
        let session = QuizSession::new(fixed_clock());
        assert_eq!(session.state(), QuizState::NotStarted);
        assert_eq!(
            session.current_question().unwrap_err(),
            SessionError::NotInProgress
        );
        assert_eq!(session.progress(), QuizProgress::default());
    }

    #[test]
    fn start_rejects_empty_sequence() {
        let mut session = QuizSession::new(fixed_clock());
        let err = session.start(QuizSequence::default()).unwrap_err();
        assert_eq!(err, SessionError::EmptySequence);
        assert!(err.is_invalid_input());
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut session = started(vec![build_question(1, &["A"], 1)]);
        let err = session
            .start(QuizSequence::from(vec![build_question(2, &["A"], 1)]))
            .unwrap_err();
        assert_eq!(err, SessionError::AlreadyStarted);
        assert!(err.is_state_error());
    }

    #[test]
    fn single_correct_answer_completes_quiz() {
        let mut session = started(vec![build_question(1, &["A"], 4)]);
        assert_eq!(
            session.state(),
            QuizState::InProgress {
                index: 0,
                answered: false
            }
        );

        let submission = session.submit_answer(0).unwrap();
        assert!(submission.outcome.is_correct);
        assert_eq!(submission.outcome.correct_option_index, 0);
        assert_eq!(submission.outcome.points_awarded, 4);

        assert_eq!(session.advance(submission.ticket), AdvanceResult::Completed);
        assert!(session.is_complete());
        assert_eq!(session.scores().unwrap().total_score(), 4);
        assert_eq!(session.completed_at(), Some(fixed_now()));

        let summary = ResultsAggregator::summarize(&session).unwrap();
        assert_eq!(summary.total_score, 4);
        assert_eq!(summary.max_possible_points, 4);
        assert_eq!(summary.question_count, 1);
    }

    #[test]
    fn double_submit_is_a_state_error() {
        let mut session = started(vec![build_question(1, &["A"], 1), build_question(2, &["A"], 1)]);
        session.submit_answer(1).unwrap();

        let err = session.submit_answer(0).unwrap_err();
        assert_eq!(err, SessionError::AlreadyAnswered);
        assert!(err.is_state_error());
        // the rejected call must not have touched the tally
        assert_eq!(session.scores().unwrap().category_scores()[&label("A")].total_count(), 1);
    }

    #[test]
    fn out_of_range_option_is_invalid_input() {
        let mut session = started(vec![build_question(1, &["A"], 1)]);
        let err = session.submit_answer(2).unwrap_err();
        assert_eq!(err, SessionError::InvalidOption { index: 2, len: 2 });
        assert!(err.is_invalid_input());
        // still answerable afterwards
        assert!(session.submit_answer(0).is_ok());
    }

    #[test]
    fn each_answer_moves_index_and_scores_by_exactly_one_step() {
        let mut session = started(vec![
            build_question(1, &["A"], 2),
            build_question(2, &["A"], 3),
            build_question(3, &["B"], 5),
        ]);

        let before = session.scores().unwrap().clone();
        let submission = session.submit_answer(0).unwrap();
        let after = session.scores().unwrap().clone();
        assert_eq!(after.total_score(), before.total_score() + 2);
        assert_eq!(after.current_index(), before.current_index());
        assert_eq!(
            session.advance(submission.ticket),
            AdvanceResult::Next { index: 1 }
        );
        assert_eq!(session.scores().unwrap().current_index(), 1);

        let submission = session.submit_answer(1).unwrap();
        assert!(!submission.outcome.is_correct);
        assert_eq!(session.scores().unwrap().total_score(), 2);
        session.advance(submission.ticket);
        assert_eq!(session.scores().unwrap().current_index(), 2);
    }

    #[test]
    fn shared_category_accumulates_both_answers() {
        let mut session = started(vec![build_question(1, &["X"], 2), build_question(2, &["X"], 3)]);

        answer_and_advance(&mut session, 0);
        answer_and_advance(&mut session, 1);

        let x = session.scores().unwrap().category_scores()[&label("X")];
        assert_eq!(x.correct_count(), 1);
        assert_eq!(x.total_count(), 2);
        assert_eq!(x.earned_points(), 2);
        assert_eq!(x.max_points(), 5);
    }

    #[test]
    fn multi_category_question_updates_every_category() {
        let mut session = started(vec![build_question(1, &["A", "B"], 3)]);
        answer_and_advance(&mut session, 0);

        let scores = session.scores().unwrap().category_scores();
        assert_eq!(scores.len(), 2);
        for category in [label("A"), label("B")] {
            assert_eq!(scores[&category].earned_points(), 3);
            assert_eq!(scores[&category].max_points(), 3);
        }
    }

    #[test]
    fn category_invariants_hold_after_every_step() {
        let mut session = started(vec![
            build_question(1, &["A", "B"], 1),
            build_question(2, &["B"], 2),
            build_question(3, &["A", "C"], 3),
            build_question(4, &["C"], 4),
        ]);

        for (step, option) in [0, 1, 1, 0].into_iter().enumerate() {
            let submission = session.submit_answer(option).unwrap();
            for score in session.scores().unwrap().category_scores().values() {
                assert!(score.correct_count() <= score.total_count(), "step {step}");
                assert!(score.earned_points() <= score.max_points(), "step {step}");
            }
            session.advance(submission.ticket);
        }
        assert!(session.is_complete());
    }

    #[test]
    fn replayed_ticket_is_stale() {
        let mut session = started(vec![build_question(1, &["A"], 1), build_question(2, &["A"], 1)]);
        let submission = session.submit_answer(0).unwrap();
        assert_eq!(session.advance(submission.ticket), AdvanceResult::Next { index: 1 });
        // replaying the same ticket does nothing
        assert_eq!(session.advance(submission.ticket), AdvanceResult::Stale);
        assert_eq!(session.scores().unwrap().current_index(), 1);
    }

    #[test]
    fn restart_invalidates_pending_ticket() {
        let mut session = started(vec![build_question(1, &["A"], 1), build_question(2, &["A"], 1)]);
        let submission = session.submit_answer(0).unwrap();

        session.restart();
        assert_eq!(session.state(), QuizState::NotStarted);
        assert_eq!(session.advance(submission.ticket), AdvanceResult::Stale);

        session
            .start(QuizSequence::from(vec![build_question(3, &["A"], 1)]))
            .unwrap();
        assert_eq!(session.advance(submission.ticket), AdvanceResult::Stale);
        assert_eq!(
            session.state(),
            QuizState::InProgress {
                index: 0,
                answered: false
            }
        );
    }

    #[test]
    fn completed_session_rejects_answers_until_restart() {
        let mut session = started(vec![build_question(1, &["A"], 1)]);
        answer_and_advance(&mut session, 0);

        assert_eq!(session.submit_answer(0).unwrap_err(), SessionError::NotInProgress);
        assert_eq!(
            session
                .start(QuizSequence::from(vec![build_question(2, &["A"], 1)]))
                .unwrap_err(),
            SessionError::AlreadyStarted
        );

        session.restart();
        assert!(
            session
                .start(QuizSequence::from(vec![build_question(2, &["A"], 1)]))
                .is_ok()
        );
    }

    #[test]
    fn progress_reports_answered_and_label() {
        let mut session = started(vec![build_question(1, &["A"], 1), build_question(2, &["A"], 1)]);
        assert_eq!(session.progress_label().as_deref(), Some("Question 1 of 2"));

        let submission = session.submit_answer(0).unwrap();
        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 1);
        assert!(!progress.is_complete);

        session.advance(submission.ticket);
        assert_eq!(session.progress_label().as_deref(), Some("Question 2 of 2"));

        answer_and_advance(&mut session, 0);
        assert!(session.progress().is_complete);
        assert_eq!(session.progress_label(), None);
    }
}
