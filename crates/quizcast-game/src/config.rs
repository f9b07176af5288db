//! Game tuning.

use std::time::Duration;

use quizcast_tick::DEFAULT_COUNTDOWN_START;
use serde::{Deserialize, Serialize};

/// Scoring and countdown parameters.
///
/// ```text
/// score = max(0, floor(max_speed_points × (1 − s / speed_window))) + correct_bonus
/// ```
///
/// for a correct answer given after `s` whole seconds; an incorrect
/// answer scores 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Value the countdown starts from on every question.
    pub countdown_start: u32,

    /// Speed points for an instant correct answer.
    pub max_speed_points: u32,

    /// Answer time at which speed points reach zero.
    pub speed_window: Duration,

    /// Flat bonus for any correct answer, however slow.
    pub correct_bonus: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            countdown_start: DEFAULT_COUNTDOWN_START,
            max_speed_points: 10,
            speed_window: Duration::from_secs(25),
            correct_bonus: 1,
        }
    }
}

impl GameConfig {
    pub fn with_countdown_start(mut self, start: u32) -> Self {
        self.countdown_start = start;
        self
    }

    pub fn with_max_speed_points(mut self, points: u32) -> Self {
        self.max_speed_points = points;
        self
    }

    pub fn with_speed_window(mut self, window: Duration) -> Self {
        self.speed_window = window;
        self
    }

    pub fn with_correct_bonus(mut self, bonus: u32) -> Self {
        self.correct_bonus = bonus;
        self
    }
}
