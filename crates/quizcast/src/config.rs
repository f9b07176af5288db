//! Peer configuration.

use std::time::Duration;

use quizcast_game::GameConfig;
use serde::{Deserialize, Serialize};

/// Configuration for one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Period of both the countdown and the host's scoreboard broadcast.
    pub tick_interval: Duration,

    /// Scoring and countdown rules, used by host and players alike.
    pub game: GameConfig,

    /// Capacity of the command channel between handles and the actor.
    pub command_buffer: usize,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            game: GameConfig::default(),
            command_buffer: 32,
        }
    }
}

impl PeerConfig {
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Clamped to at least 1; Tokio rejects zero-capacity channels.
    pub fn with_command_buffer(mut self, size: usize) -> Self {
        self.command_buffer = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ticks_every_second() {
        let config = PeerConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.game, GameConfig::default());
    }

    #[test]
    fn test_with_command_buffer_zero_clamps_to_one() {
        let config = PeerConfig::default().with_command_buffer(0);
        assert_eq!(config.command_buffer, 1);
    }
}
