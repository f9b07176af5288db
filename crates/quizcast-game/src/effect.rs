//! What the state machines ask their owner to do.
//!
//! The machines never touch the network or a timer. Every handler returns
//! a list of [`Effect`]s, much like room logic returns
//! `(Recipient, Message)` pairs, and the peer runtime carries them out in
//! order.

use quizcast_protocol::{HostMessage, PlayerId, PlayerMessage, Question, Scorecard};
use tokio::time::Instant;

use crate::QuestionBank;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Host → every player.
    Broadcast(HostMessage),
    /// Player → host.
    SendToHost(PlayerMessage),
    /// Something the presentation should redraw.
    Notify(GameEvent),
    /// Leave the transport session (ends it for everyone on the host).
    EndSession,
    /// Replace the current view.
    Navigate(Navigation),
}

/// Change notifications for the presentation.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    QuestionChanged(Question),
    ScoreboardChanged(Vec<Scorecard>),
    /// `show_answers` became true.
    AnswersRevealed,
    OptionsEnabledChanged(bool),
    /// New countdown value.
    CountdownTick(u32),
}

/// Where to go next, with everything the next view needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    HostGame(HostGameStart),
    PlayerGame(PlayerGameStart),
    EndGame(EndGameSummary),
    Welcome,
}

impl Navigation {
    /// Variant name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HostGame(_) => "HostGame",
            Self::PlayerGame(_) => "PlayerGame",
            Self::EndGame(_) => "EndGame",
            Self::Welcome => "Welcome",
        }
    }
}

/// Payload for the host's game view. The first question of `bank` is
/// already on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostGameStart {
    pub bank: QuestionBank,
    pub scorecards: Vec<Scorecard>,
}

/// Payload for a player's game view.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerGameStart {
    pub player_id: PlayerId,
    pub player_name: String,
    pub question: Question,
    pub scorecards: Vec<Scorecard>,
    /// When `GameStarted` arrived; answer times for the first question
    /// are measured from here.
    pub received_at: Instant,
}

/// Final standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndGameSummary {
    /// By descending score, ties in roster order.
    pub scorecards: Vec<Scorecard>,
    /// Name on the first card, if any.
    pub winner_name: Option<String>,
    /// The local player, on a player device.
    pub viewer_name: Option<String>,
}

impl EndGameSummary {
    /// Builds a summary from cards already in descending order.
    pub fn new(ordered: Vec<Scorecard>, viewer_name: Option<String>) -> Self {
        let winner_name = ordered.first().map(|c| c.player_name.clone());
        Self {
            scorecards: ordered,
            winner_name,
            viewer_name,
        }
    }
}
