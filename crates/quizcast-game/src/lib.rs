//! Game rules for quizcast.
//!
//! Everything here is a synchronous state machine over protocol messages:
//!
//! - [`HostLobby`] / [`PlayerLobby`]: gathering players before the game.
//! - [`GameMachine`]: questions, answers, scoring and game over.
//! - [`Scoreboard`]: the roster of [`Scorecard`]s and leader election.
//! - [`QuestionBank`]: the host's question list.
//!
//! Handlers return [`Effect`]s instead of doing I/O; the peer runtime in
//! the `quizcast` crate sends the messages, drives the timers and swaps
//! views on [`Effect::Navigate`].
//!
//! [`Scorecard`]: quizcast_protocol::Scorecard

mod bank;
mod config;
mod effect;
mod error;
mod game;
mod lobby;
mod scoreboard;
pub mod scoring;

pub use bank::{OptionSpec, QuestionBank, QuestionSpec};
pub use config::GameConfig;
pub use effect::{EndGameSummary, Effect, GameEvent, HostGameStart, Navigation, PlayerGameStart};
pub use error::GameError;
pub use game::{GameMachine, HostRole, PlayerRole, Role};
pub use lobby::{HostLobby, PlayerLobby};
pub use scoreboard::{Scoreboard, same_standings};
pub use scoring::score_for;
