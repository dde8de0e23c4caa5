use std::fmt;
use std::io::Write;

use quiz_core::model::{AnswerOption, CategoryLabel, QuestionRecord};
use services::{AnswerOutcome, Presenter, ResultsSummary};
use tracing::warn;

/// Plain-text [`Presenter`] for a line-oriented terminal.
pub struct TerminalPresenter<W> {
    out: W,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn written(&self) -> &W {
        &self.out
    }

    pub fn render_help(&mut self) {
        self.emit(format_args!(
            "Setup: category numbers separated by commas (or `all`), then an optional count, e.g. `1,3 5`.\n\
             Question: the number of your answer.\n\
             Anytime: `restart`, `reload` (setup only), `quit`."
        ));
    }

    fn emit(&mut self, text: fmt::Arguments<'_>) {
        if let Err(err) = self
            .out
            .write_fmt(text)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush())
        {
            warn!(error = %err, "terminal write failed");
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render_setup_screen(&mut self) {
        self.emit(format_args!("\n=== New quiz ==="));
    }

    fn render_category_options(&mut self, categories: &[CategoryLabel]) {
        for (n, category) in categories.iter().enumerate() {
            self.emit(format_args!("  {}) {category}", n + 1));
        }
        self.emit(format_args!(
            "Pick categories (e.g. `1,3` or `all`) and optionally a question count:"
        ));
    }

    fn render_question(&mut self, question: &QuestionRecord, progress_label: &str) {
        self.emit(format_args!("\n[{progress_label}] {}", question.prompt()));
        for (n, option) in question.options().iter().enumerate() {
            self.emit(format_args!("  {}) {}", n + 1, option.text));
        }
    }

    fn render_answer_feedback(&mut self, outcome: &AnswerOutcome, options: &[AnswerOption]) {
        if outcome.is_correct {
            self.emit(format_args!("Correct! +{} points", outcome.points_awarded));
        } else {
            self.emit(format_args!("Wrong."));
        }
        for (n, option) in options.iter().enumerate() {
            let mark = if n == outcome.correct_option_index {
                "*"
            } else if n == outcome.selected_index {
                "x"
            } else {
                " "
            };
            self.emit(format_args!("{mark} {}) {}", n + 1, option.text));
        }
    }

    fn render_results(&mut self, summary: &ResultsSummary) {
        self.emit(format_args!(
            "\n=== Results ===\nScore: {} / {} over {} questions",
            summary.total_score, summary.max_possible_points, summary.question_count
        ));
        for (category, score) in &summary.per_category {
            self.emit(format_args!(
                "  {category}: {}/{} correct, {}/{} points ({:.0}%)",
                score.correct_count(),
                score.total_count(),
                score.earned_points(),
                score.max_points(),
                score.accuracy() * 100.0
            ));
        }
        self.emit(format_args!("Type `restart` to play again or `quit` to exit."));
    }

    fn render_message(&mut self, message: &str) {
        self.emit(format_args!("! {message}"));
    }
}
