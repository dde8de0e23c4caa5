use std::time::Duration;

use quiz_core::Clock;
use quiz_core::model::{CategoryLabel, QuizSettings};
use storage::QuestionSource;
use tracing::{debug, info, warn};

use super::plan::QuizBuilder;
use super::results::ResultsAggregator;
use super::service::{AdvanceResult, AdvanceTicket, QuizSession, QuizState};
use crate::bank::QuestionBank;
use crate::error::{LoadError, SelectionError, SessionError};
use crate::presenter::Presenter;

/// Result of a start request from the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { questions: usize, matching: usize },
    /// The selection was rejected and the message already rendered.
    Rejected(SelectionError),
}

/// A deferred advance the caller should fire once `delay` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub ticket: AdvanceTicket,
    pub delay: Duration,
}

/// Drives one quiz at a time between the question bank and a [`Presenter`].
pub struct QuizLoopService<P> {
    bank: QuestionBank,
    settings: QuizSettings,
    session: QuizSession,
    presenter: P,
}

impl<P: Presenter> QuizLoopService<P> {
    #[must_use]
    pub fn new(bank: QuestionBank, settings: QuizSettings, clock: Clock, presenter: P) -> Self {
        Self {
            bank,
            settings,
            session: QuizSession::new(clock),
            presenter,
        }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Render the setup screen with every category in the bank.
    pub fn show_setup(&mut self) {
        self.presenter.render_setup_screen();
        self.presenter.render_category_options(self.bank.categories());
    }

    /// Build a quiz from the user's choices and show its first question.
    ///
    /// A rejected selection is rendered as a message and reported as
    /// `StartOutcome::Rejected`; the session stays in setup.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` if a quiz is already running or
    /// finished without a restart.
    pub fn on_start_requested(
        &mut self,
        selected: &[CategoryLabel],
        requested_count: u32,
    ) -> Result<StartOutcome, SessionError> {
        if self.session.state() != QuizState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }

        let plan = match QuizBuilder::new(&self.bank).build(selected, requested_count) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, selected = selected.len(), "quiz selection rejected");
                self.presenter.render_message(&err.to_string());
                return Ok(StartOutcome::Rejected(err));
            }
        };

        let questions = plan.sequence.len();
        let session_id = self.session.start(plan.sequence)?;
        info!(
            session = %session_id,
            questions,
            matching = plan.matching,
            "quiz started"
        );
        self.render_current_question()?;
        Ok(StartOutcome::Started {
            questions,
            matching: plan.matching,
        })
    }

    /// Score the chosen option and show feedback.
    ///
    /// The returned [`ScheduledAdvance`] must be handed back through
    /// [`QuizLoopService::on_advance_due`] after its delay.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from [`QuizSession::submit_answer`]; in
    /// particular `AlreadyAnswered` while feedback is still showing.
    pub fn on_answer_selected(&mut self, option_index: usize) -> Result<ScheduledAdvance, SessionError> {
        let submission = self.session.submit_answer(option_index)?;
        let progress = self.session.progress();
        debug!(
            answered = progress.answered,
            remaining = progress.remaining,
            "feedback window open"
        );
        let question = self.session.current_question()?;
        self.presenter
            .render_answer_feedback(&submission.outcome, question.options());
        Ok(ScheduledAdvance {
            ticket: submission.ticket,
            delay: self.settings.feedback_delay(),
        })
    }

    /// Apply a deferred advance and render what comes next.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` only if the session cannot render the state it
    /// just moved into.
    pub fn on_advance_due(&mut self, ticket: AdvanceTicket) -> Result<AdvanceResult, SessionError> {
        let result = self.session.advance(ticket);
        match result {
            AdvanceResult::Next { .. } => self.render_current_question()?,
            AdvanceResult::Completed => {
                let summary = ResultsAggregator::summarize(&self.session)?;
                info!(
                    score = summary.total_score,
                    max = summary.max_possible_points,
                    questions = summary.question_count,
                    "quiz completed"
                );
                self.presenter.render_results(&summary);
            }
            AdvanceResult::Stale => {
                debug!(
                    session = %ticket.session_id(),
                    index = ticket.index(),
                    "stale advance ignored"
                );
            }
        }
        Ok(result)
    }

    /// Abandon the current quiz and go back to setup.
    pub fn on_restart_requested(&mut self) {
        self.session.restart();
        self.show_setup();
    }

    /// Reload the bank from `source` and show the refreshed setup screen.
    ///
    /// Only allowed from setup; the bank is not swapped under a running quiz.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the source fails; the previous bank is kept.
    pub async fn reload_bank(&mut self, source: &dyn QuestionSource) -> Result<bool, LoadError> {
        if self.session.state() != QuizState::NotStarted {
            debug!("bank reload skipped while a quiz is active");
            return Ok(false);
        }
        self.bank.reload(source).await?;
        self.show_setup();
        Ok(true)
    }

    fn render_current_question(&mut self) -> Result<(), SessionError> {
        let question = self.session.current_question()?;
        let label = self
            .session
            .progress_label()
            .ok_or(SessionError::NotInProgress)?;
        self.presenter.render_question(question, &label);
        Ok(())
    }
}
