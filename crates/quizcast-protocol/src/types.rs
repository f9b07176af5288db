//! Data types shared by host and players.
//!
//! Everything here travels on the wire inside a [`HostMessage`] or
//! [`PlayerMessage`], so both sides must agree on the exact shape. The only
//! field that never leaves the device is [`AnswerOption::locally_selected`].
//!
//! [`HostMessage`]: crate::HostMessage
//! [`PlayerMessage`]: crate::PlayerMessage

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a player.
///
/// Generated by the player itself when it enters a lobby and sent with
/// every message. The host keys scorecards by this id rather than by
/// display name, so two players called "Sam" no longer collide.
///
/// `#[serde(transparent)]` keeps it a plain number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Generates a random identifier (64 bits of entropy).
    pub fn generate() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A stable identifier for a question within one game.
///
/// Assigned in order when the host builds its question bank. Two questions
/// with identical text still get different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Scorecard
// ---------------------------------------------------------------------------

/// How a player has answered the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum AnswerStatus {
    /// No answer yet for this question. Every question starts here.
    #[default]
    Unanswered,
    AnsweredCorrectly,
    AnsweredIncorrectly,
}

/// One player's accumulated result plus their status on the current
/// question.
///
/// The host owns the authoritative copy. Players only ever see snapshots
/// of the whole set, which replace their mirror wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    pub player_id: PlayerId,
    pub player_name: String,
    pub answer_status: AnswerStatus,
    pub total_correct_answers: u32,
    /// Sum of the answer times reported for every question answered.
    pub total_time: Duration,
    pub total_score: u32,
    /// Derived: recomputed by the host on every broadcast tick.
    pub is_leader: bool,
}

impl Scorecard {
    /// A fresh scorecard for a player who just joined.
    pub fn new(player_id: PlayerId, player_name: impl Into<String>) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            answer_status: AnswerStatus::Unanswered,
            total_correct_answers: 0,
            total_time: Duration::ZERO,
            total_score: 0,
            is_leader: false,
        }
    }

    /// First character of the name, for avatar badges. `'P'` if empty.
    pub fn name_initial(&self) -> char {
        self.player_name.chars().next().unwrap_or('P')
    }

    /// "correct/total", e.g. `3/4`.
    pub fn correct_answers_label(&self, total_questions: usize) -> String {
        format!("{}/{}", self.total_correct_answers, total_questions)
    }

    /// Total answer time as `mm:ss`.
    pub fn time_label(&self) -> String {
        let secs = self.total_time.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn is_waiting(&self) -> bool {
        self.answer_status == AnswerStatus::Unanswered
    }

    pub fn is_correct(&self) -> bool {
        self.answer_status == AnswerStatus::AnsweredCorrectly
    }

    pub fn is_incorrect(&self) -> bool {
        self.answer_status == AnswerStatus::AnsweredIncorrectly
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
    /// Whether the local viewer picked this option. Each peer tracks its
    /// own highlight, so this is never serialized.
    #[serde(skip)]
    pub locally_selected: bool,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
            locally_selected: false,
        }
    }

    /// The "wrong pick" marker: selected locally but not correct.
    pub fn shows_incorrect_selection(&self) -> bool {
        self.locally_selected && !self.is_correct
    }
}

/// A quiz question. Immutable once the host has loaded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<AnswerOption>,
    /// Index into `options` of the correct answer.
    pub correct_index: usize,
}

impl Question {
    /// Builds a question; the correct index is the first option flagged
    /// correct (0 if none is).
    pub fn new(id: QuestionId, text: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        let correct_index = options.iter().position(|o| o.is_correct).unwrap_or(0);
        Self {
            id,
            text: text.into(),
            options,
            correct_index,
        }
    }

    /// The correct option, if the index is in range.
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.get(self.correct_index)
    }

    /// Clears every local selection highlight.
    pub fn clear_selection(&mut self) {
        for option in &mut self.options {
            option.locally_selected = false;
        }
    }
}
