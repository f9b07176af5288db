//! Pre-game state machines.
//!
//! The host lobby collects a roster from `Join`/`Leave` messages and
//! rebroadcasts it every tick; the player lobby announces itself, mirrors
//! that roster, and waits for `GameStarted`.

use quizcast_protocol::{
    HostMessage, HostPayload, PlayerId, PlayerMessage, PlayerPayload, Scorecard,
};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{
    Effect, GameError, GameEvent, HostGameStart, Navigation, PlayerGameStart, QuestionBank,
    Scoreboard,
};

// ---------------------------------------------------------------------------
// Host lobby
// ---------------------------------------------------------------------------

/// The host's waiting room.
#[derive(Debug, Clone)]
pub struct HostLobby {
    session_name: String,
    roster: Scoreboard,
    inert: bool,
}

impl HostLobby {
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            roster: Scoreboard::new(),
            inert: false,
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn scorecards(&self) -> &[Scorecard] {
        self.roster.cards()
    }

    /// At least one player has joined.
    pub fn can_start_game(&self) -> bool {
        !self.roster.is_empty()
    }

    /// `Join` adds a scorecard (once per player id); `Leave` removes it.
    pub fn handle_player_message(&mut self, msg: PlayerMessage) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        let changed = match msg.payload {
            PlayerPayload::Join => {
                let added = self
                    .roster
                    .add(Scorecard::new(msg.player_id, msg.player_name.as_str()));
                if added {
                    info!(player_id = %msg.player_id, name = %msg.player_name, "player joined lobby");
                } else {
                    debug!(player_id = %msg.player_id, "repeated join, ignoring");
                }
                added
            }
            PlayerPayload::Leave => {
                let removed = self.roster.remove(msg.player_id).is_some();
                if removed {
                    info!(player_id = %msg.player_id, name = %msg.player_name, "player left lobby");
                }
                removed
            }
            PlayerPayload::Answer { .. } => {
                debug!(player_id = %msg.player_id, "answer in lobby, dropping");
                false
            }
        };

        if changed {
            vec![Effect::Notify(GameEvent::ScoreboardChanged(self.roster.snapshot()))]
        } else {
            Vec::new()
        }
    }

    /// Closes the lobby: broadcasts `GameStarted` with the first question
    /// and the roster, then hands both to the host game view.
    pub fn start_game(&mut self, bank: QuestionBank) -> Result<Vec<Effect>, GameError> {
        if self.inert {
            return Err(GameError::Finished);
        }
        let question = bank.first().cloned().ok_or(GameError::NoQuestions)?;
        if !self.can_start_game() {
            return Err(GameError::NoPlayers);
        }

        let scorecards = self.roster.snapshot();
        info!(
            session = %self.session_name,
            players = scorecards.len(),
            questions = bank.len(),
            "starting game"
        );
        self.cleanup();

        Ok(vec![
            Effect::Broadcast(HostMessage::new(HostPayload::GameStarted {
                question,
                player_scores: scorecards.clone(),
            })),
            Effect::Navigate(Navigation::HostGame(HostGameStart { bank, scorecards })),
        ])
    }

    /// Roster snapshot for the players, every tick.
    pub fn on_broadcast_tick(&mut self) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        vec![Effect::Broadcast(HostMessage::new(HostPayload::Scoreboard {
            player_scores: self.roster.snapshot(),
        }))]
    }

    /// Abandons the lobby; the session ends for everyone.
    pub fn leave_game(&mut self) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        info!(session = %self.session_name, "host left lobby");
        self.cleanup();
        vec![Effect::EndSession, Effect::Navigate(Navigation::Welcome)]
    }

    /// Idempotent.
    pub fn cleanup(&mut self) {
        self.inert = true;
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }
}

// ---------------------------------------------------------------------------
// Player lobby
// ---------------------------------------------------------------------------

/// A player's waiting room.
#[derive(Debug, Clone)]
pub struct PlayerLobby {
    player_id: PlayerId,
    player_name: String,
    roster: Scoreboard,
    inert: bool,
}

impl PlayerLobby {
    pub fn new(player_id: PlayerId, player_name: impl Into<String>) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            roster: Scoreboard::new(),
            inert: false,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn scorecards(&self) -> &[Scorecard] {
        self.roster.cards()
    }

    /// Players never start the game.
    pub fn can_start_game(&self) -> bool {
        false
    }

    /// The `Join` announcement, sent once the host is known.
    pub fn enter(&self) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        vec![Effect::SendToHost(self.message(PlayerPayload::Join))]
    }

    pub fn handle_host_message(&mut self, msg: HostMessage, now: Instant) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        match msg.payload {
            HostPayload::GameStarted {
                question,
                player_scores,
            } => {
                info!(player_id = %self.player_id, "host started the game");
                self.cleanup();
                vec![Effect::Navigate(Navigation::PlayerGame(PlayerGameStart {
                    player_id: self.player_id,
                    player_name: self.player_name.clone(),
                    question,
                    scorecards: player_scores,
                    received_at: now,
                }))]
            }
            HostPayload::Scoreboard { player_scores } => {
                if self.roster.apply_snapshot(player_scores) {
                    vec![Effect::Notify(GameEvent::ScoreboardChanged(
                        self.roster.snapshot(),
                    ))]
                } else {
                    Vec::new()
                }
            }
            other => {
                debug!(?other, "unexpected host message in lobby, dropping");
                Vec::new()
            }
        }
    }

    /// Tells the host we are gone, then leaves the session.
    pub fn leave_game(&mut self) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        info!(player_id = %self.player_id, "leaving lobby");
        let leave = self.message(PlayerPayload::Leave);
        self.cleanup();
        vec![
            Effect::SendToHost(leave),
            Effect::EndSession,
            Effect::Navigate(Navigation::Welcome),
        ]
    }

    /// The session dropped us: back to the welcome view.
    pub fn on_disconnected(&mut self, reason: &str) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        info!(%reason, "disconnected from lobby");
        self.cleanup();
        vec![Effect::Navigate(Navigation::Welcome)]
    }

    /// Idempotent.
    pub fn cleanup(&mut self) {
        self.inert = true;
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    fn message(&self, payload: PlayerPayload) -> PlayerMessage {
        PlayerMessage::new(self.player_id, self.player_name.as_str(), payload)
    }
}
