//! Contract between the quiz controller and whatever draws the screens.

use quiz_core::model::{AnswerOption, CategoryLabel, QuestionRecord};

use crate::quiz::{AnswerOutcome, ResultsSummary};

/// Rendering side of the quiz.
///
/// The controller calls these in response to user actions; an implementation
/// only draws and never reaches back into session state.
pub trait Presenter {
    fn render_setup_screen(&mut self);

    fn render_category_options(&mut self, categories: &[CategoryLabel]);

    fn render_question(&mut self, question: &QuestionRecord, progress_label: &str);

    fn render_answer_feedback(&mut self, outcome: &AnswerOutcome, options: &[AnswerOption]);

    fn render_results(&mut self, summary: &ResultsSummary);

    /// A recoverable, user-facing message such as a rejected setup.
    fn render_message(&mut self, message: &str);
}
