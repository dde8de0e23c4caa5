use serde::{Deserialize, Serialize};

/// Running tally for one category within a quiz.
///
/// Always holds `correct_count <= total_count` and `earned_points <= max_points`,
/// since both sides only move together through [`CategoryScore::record`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    correct_count: u32,
    total_count: u32,
    earned_points: u32,
    max_points: u32,
}

impl CategoryScore {
    /// Apply one answered question worth `points`.
    pub fn record(&mut self, points: u32, is_correct: bool) {
        self.total_count = self.total_count.saturating_add(1);
        self.max_points = self.max_points.saturating_add(points);
        if is_correct {
            self.correct_count = self.correct_count.saturating_add(1);
            self.earned_points = self.earned_points.saturating_add(points);
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    #[must_use]
    pub fn earned_points(&self) -> u32 {
        self.earned_points
    }

    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.max_points
    }

    /// Share of correctly answered questions, `0.0` when nothing was answered.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.total_count)
    }
}
