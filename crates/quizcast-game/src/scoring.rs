use std::time::Duration;

use crate::GameConfig;

/// Points for one answer.
///
/// Only whole seconds count: 4.9 s scores like 4 s.
pub fn score_for(config: &GameConfig, is_correct: bool, answer_time: Duration) -> u32 {
    if !is_correct {
        return 0;
    }
    let window = config.speed_window.as_secs();
    let secs = answer_time.as_secs();
    let speed = if window == 0 || secs >= window {
        0
    } else {
        // floor(max × (1 − s/window)) == floor(max × (window − s) / window)
        (u64::from(config.max_speed_points) * (window - secs) / window) as u32
    };
    speed + config.correct_bonus
}
