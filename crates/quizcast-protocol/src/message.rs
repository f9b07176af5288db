//! The two message families.
//!
//! The host only ever sends [`HostMessage`]s and only ever receives
//! [`PlayerMessage`]s; players are the mirror image. Because each side knows
//! which family to expect, neither message carries a family tag: the
//! `"type"` field inside the payload selects the variant *within* a family.
//!
//! ```text
//! { "timestamp": 1717171717000,
//!   "payload": { "type": "Scoreboard", "player_scores": [ ... ] } }
//! ```
//!
//! `timestamp` is advisory (milliseconds since the UNIX epoch on the
//! sender's clock). Nothing uses it for scoring.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{PlayerId, Question, QuestionId, Scorecard};

/// Milliseconds since the UNIX epoch on the local clock.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Host → players
// ---------------------------------------------------------------------------

/// What the host can say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostPayload {
    /// The next question. Players reset their countdown on receipt.
    Question { question: Question },

    /// Full scoreboard snapshot, broadcast every tick.
    Scoreboard { player_scores: Vec<Scorecard> },

    /// The lobby is closed; here is the first question and the roster.
    GameStarted {
        question: Question,
        player_scores: Vec<Scorecard>,
    },

    /// No more questions. Final scores.
    GameOver { player_scores: Vec<Scorecard> },
}

/// A message from the host to every player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessage {
    pub timestamp: u64,
    pub payload: HostPayload,
}

impl HostMessage {
    /// Wraps a payload, stamped with the current time.
    pub fn new(payload: HostPayload) -> Self {
        Self {
            timestamp: now_millis(),
            payload,
        }
    }

    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self.payload {
            HostPayload::Question { .. } => "Question",
            HostPayload::Scoreboard { .. } => "Scoreboard",
            HostPayload::GameStarted { .. } => "GameStarted",
            HostPayload::GameOver { .. } => "GameOver",
        }
    }
}

// ---------------------------------------------------------------------------
// Player → host
// ---------------------------------------------------------------------------

/// What a player can say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerPayload {
    /// "Put me on the roster."
    Join,

    /// "Take me off the roster."
    Leave,

    /// An answer to the question identified by `question_id`.
    /// `answer_time` is measured locally by the player, from receipt of
    /// the question to the moment an option was picked.
    Answer {
        question_id: QuestionId,
        is_correct: bool,
        answer_time: Duration,
    },
}

/// A message from one player to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMessage {
    pub player_id: PlayerId,
    pub player_name: String,
    pub timestamp: u64,
    pub payload: PlayerPayload,
}

impl PlayerMessage {
    /// Wraps a payload for the given player, stamped with the current time.
    pub fn new(player_id: PlayerId, player_name: impl Into<String>, payload: PlayerPayload) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            timestamp: now_millis(),
            payload,
        }
    }

    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self.payload {
            PlayerPayload::Join => "Join",
            PlayerPayload::Leave => "Leave",
            PlayerPayload::Answer { .. } => "Answer",
        }
    }
}
