use std::time::Duration;

use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("feedback delay must be at most {max_ms} ms, got {got_ms} ms")]
    FeedbackDelayTooLong { got_ms: u64, max_ms: u64 },

    #[error("default question count must be > 0")]
    InvalidDefaultCount,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Runtime knobs for a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    feedback_delay: Duration,
    default_question_count: u32,
}

impl QuizSettings {
    pub const MAX_FEEDBACK_DELAY_MS: u64 = 10_000;

    /// Defaults: answers stay on screen for 1.2 s, ten questions per quiz.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            feedback_delay: Duration::from_millis(1_200),
            default_question_count: 10,
        }
    }

    /// Creates custom settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::FeedbackDelayTooLong` if the delay exceeds
    /// [`Self::MAX_FEEDBACK_DELAY_MS`], or `SettingsError::InvalidDefaultCount`
    /// if the count is zero.
    pub fn new(feedback_delay_ms: u64, default_question_count: u32) -> Result<Self, SettingsError> {
        if feedback_delay_ms > Self::MAX_FEEDBACK_DELAY_MS {
            return Err(SettingsError::FeedbackDelayTooLong {
                got_ms: feedback_delay_ms,
                max_ms: Self::MAX_FEEDBACK_DELAY_MS,
            });
        }
        if default_question_count == 0 {
            return Err(SettingsError::InvalidDefaultCount);
        }
        Ok(Self {
            feedback_delay: Duration::from_millis(feedback_delay_ms),
            default_question_count,
        })
    }

    /// How long answer feedback stays visible before the quiz moves on.
    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    #[must_use]
    pub fn default_question_count(&self) -> u32 {
        self.default_question_count
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::standard()
    }
}
