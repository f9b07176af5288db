//! The in-game state machine, shared by host and players.
//!
//! One [`GameMachine`] type covers both sides; the [`Role`] tag carries
//! what only one side has (the question bank on the host, the receipt
//! instant and identity on a player).
//!
//! ```text
//!             Host                                  Player
//! next_question() ──Question──────────────────→ handle_host_message()
//!                                                    │ select_option(i, now)
//! handle_player_message() ←──────────Answer─────────┘
//! on_broadcast_tick() ──Scoreboard────────────→ handle_host_message()
//! next_question() past the end ──GameOver─────→ handle_host_message()
//! ```
//!
//! All handlers are synchronous and return [`Effect`]s. Time comes in as
//! an explicit `now` so the machine can be driven deterministically.

use quizcast_protocol::{
    HostMessage, HostPayload, PlayerId, PlayerMessage, PlayerPayload, Question, Scorecard,
};
use quizcast_tick::Countdown;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    Effect, EndGameSummary, GameConfig, GameError, GameEvent, HostGameStart, Navigation,
    PlayerGameStart, QuestionBank, Scoreboard, scoring,
};

/// Host-only state.
#[derive(Debug, Clone)]
pub struct HostRole {
    bank: QuestionBank,
    /// Index in `bank` of the question on screen.
    position: usize,
}

impl HostRole {
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

/// Player-only state.
#[derive(Debug, Clone)]
pub struct PlayerRole {
    player_id: PlayerId,
    player_name: String,
    received_at: Instant,
}

impl PlayerRole {
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }
}

#[derive(Debug, Clone)]
pub enum Role {
    Host(HostRole),
    Player(PlayerRole),
}

/// The live game on one device.
#[derive(Debug, Clone)]
pub struct GameMachine {
    config: GameConfig,
    question: Question,
    scoreboard: Scoreboard,
    show_answers: bool,
    options_enabled: bool,
    countdown: Countdown,
    finished: bool,
    /// Set by `cleanup`; every handler becomes a no-op.
    inert: bool,
    role: Role,
}

impl GameMachine {
    /// The host's game, right after `GameStarted` went out.
    ///
    /// # Errors
    /// [`GameError::NoQuestions`] for an empty bank.
    pub fn host(config: GameConfig, start: HostGameStart) -> Result<Self, GameError> {
        let question = start.bank.first().cloned().ok_or(GameError::NoQuestions)?;
        info!(questions = start.bank.len(), players = start.scorecards.len(), "host game started");
        Ok(Self {
            countdown: Countdown::new(config.countdown_start),
            config,
            question,
            scoreboard: Scoreboard::from_cards(start.scorecards),
            show_answers: false,
            options_enabled: false,
            finished: false,
            inert: false,
            role: Role::Host(HostRole {
                bank: start.bank,
                position: 0,
            }),
        })
    }

    /// A player's game, right after `GameStarted` arrived.
    pub fn player(config: GameConfig, start: PlayerGameStart) -> Self {
        info!(player_id = %start.player_id, question = %start.question.id, "player game started");
        Self {
            countdown: Countdown::new(config.countdown_start),
            config,
            question: start.question,
            scoreboard: Scoreboard::from_cards(start.scorecards),
            show_answers: false,
            options_enabled: true,
            finished: false,
            inert: false,
            role: Role::Player(PlayerRole {
                player_id: start.player_id,
                player_name: start.player_name,
                received_at: start.received_at,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Host side
    // -----------------------------------------------------------------------

    /// Moves to the next question, or ends the game after the last one.
    ///
    /// With N questions the N-th call ends the game: the first question
    /// was shown when the game started.
    pub fn next_question(&mut self) -> Result<Vec<Effect>, GameError> {
        if self.inert || self.finished {
            return Err(GameError::Finished);
        }
        let Role::Host(host) = &mut self.role else {
            return Err(GameError::NotHost);
        };

        let next = host.position + 1;
        let Some(question) = host.bank.get(next).cloned() else {
            return Ok(self.game_over());
        };
        host.position = next;

        self.question = question.clone();
        self.scoreboard.reset_statuses();
        self.show_answers = false;
        self.countdown.reset();
        debug!(question = %question.id, "sending next question to players");

        Ok(vec![
            Effect::Notify(GameEvent::QuestionChanged(question.clone())),
            Effect::Notify(GameEvent::ScoreboardChanged(self.scoreboard.snapshot())),
            Effect::Broadcast(HostMessage::new(HostPayload::Question { question })),
            Effect::Notify(GameEvent::CountdownTick(self.countdown.remaining())),
        ])
    }

    fn game_over(&mut self) -> Vec<Effect> {
        self.finished = true;
        self.countdown.stop();
        let summary = EndGameSummary::new(self.scoreboard.ordered_desc(), None);
        info!(winner = ?summary.winner_name, "game ended");
        vec![
            Effect::Broadcast(HostMessage::new(HostPayload::GameOver {
                player_scores: self.scoreboard.snapshot(),
            })),
            Effect::Navigate(Navigation::EndGame(summary)),
        ]
    }

    /// Applies a message from a player.
    pub fn handle_player_message(&mut self, msg: PlayerMessage) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        if !self.is_host() {
            warn!(kind = msg.kind(), "player message on a player device, dropping");
            return Vec::new();
        }

        let mut effects = Vec::new();
        match msg.payload {
            PlayerPayload::Answer {
                question_id,
                is_correct,
                answer_time,
            } => {
                let Some(card) = self.scoreboard.get(msg.player_id) else {
                    debug!(player_id = %msg.player_id, "answer from unknown player, dropping");
                    return effects;
                };
                if question_id != self.question.id {
                    debug!(player_id = %msg.player_id, %question_id, "stale answer, dropping");
                    return effects;
                }
                if !card.is_waiting() {
                    debug!(player_id = %msg.player_id, %question_id, "duplicate answer, dropping");
                    return effects;
                }

                let points = scoring::score_for(&self.config, is_correct, answer_time);
                self.scoreboard
                    .record_answer(msg.player_id, is_correct, answer_time, points);
                debug!(
                    player_id = %msg.player_id,
                    is_correct,
                    answer_ms = answer_time.as_millis() as u64,
                    points,
                    "answer received"
                );
                effects.push(Effect::Notify(GameEvent::ScoreboardChanged(
                    self.scoreboard.snapshot(),
                )));
            }
            // The roster is fixed once the game starts. A late joiner stays
            // in its lobby and must not hold up the reveal.
            PlayerPayload::Join => {
                debug!(player_id = %msg.player_id, name = %msg.player_name, "join after game start, ignoring");
            }
            PlayerPayload::Leave => {
                if self.scoreboard.remove(msg.player_id).is_some() {
                    info!(player_id = %msg.player_id, name = %msg.player_name, "player left mid-game");
                    effects.push(Effect::Notify(GameEvent::ScoreboardChanged(
                        self.scoreboard.snapshot(),
                    )));
                }
            }
        }

        if !self.show_answers && self.scoreboard.all_answered() {
            self.show_answers = true;
            effects.push(Effect::Notify(GameEvent::AnswersRevealed));
        }
        effects
    }

    /// Host: recompute the leader and broadcast the scoreboard.
    /// Player: nothing.
    pub fn on_broadcast_tick(&mut self) -> Vec<Effect> {
        if self.inert || self.finished || !self.is_host() {
            return Vec::new();
        }
        self.scoreboard.recompute_leader();
        vec![Effect::Broadcast(HostMessage::new(HostPayload::Scoreboard {
            player_scores: self.scoreboard.snapshot(),
        }))]
    }

    // -----------------------------------------------------------------------
    // Player side
    // -----------------------------------------------------------------------

    /// Applies a message from the host. `now` is the local receipt time.
    pub fn handle_host_message(&mut self, msg: HostMessage, now: Instant) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        let Role::Player(player) = &mut self.role else {
            warn!(kind = msg.kind(), "host message on the host, dropping");
            return Vec::new();
        };

        match msg.payload {
            HostPayload::Question { question } => {
                if question.id == self.question.id {
                    debug!(question = %question.id, "duplicate question, ignoring");
                    return Vec::new();
                }
                debug!(question = %question.id, "received question from host");
                player.received_at = now;
                self.show_question(question)
            }
            HostPayload::Scoreboard { player_scores } => self.apply_scores(player_scores),
            // A repeat of the lobby handoff; the roster may be newer.
            HostPayload::GameStarted { player_scores, .. } => self.apply_scores(player_scores),
            HostPayload::GameOver { player_scores } => {
                let viewer = player.player_name.clone();
                self.finished = true;
                self.options_enabled = false;
                self.countdown.stop();
                self.scoreboard = Scoreboard::from_cards(player_scores);
                info!("host ended game");
                vec![Effect::Navigate(Navigation::EndGame(EndGameSummary::new(
                    self.scoreboard.ordered_desc(),
                    Some(viewer),
                )))]
            }
        }
    }

    fn show_question(&mut self, question: Question) -> Vec<Effect> {
        self.question = question.clone();
        self.countdown.reset();
        self.show_answers = false;
        let mut effects = vec![
            Effect::Notify(GameEvent::QuestionChanged(question)),
            Effect::Notify(GameEvent::CountdownTick(self.countdown.remaining())),
        ];
        if !self.options_enabled {
            self.options_enabled = true;
            effects.push(Effect::Notify(GameEvent::OptionsEnabledChanged(true)));
        }
        effects
    }

    fn apply_scores(&mut self, cards: Vec<Scorecard>) -> Vec<Effect> {
        if self.scoreboard.apply_snapshot(cards) {
            vec![Effect::Notify(GameEvent::ScoreboardChanged(
                self.scoreboard.snapshot(),
            ))]
        } else {
            Vec::new()
        }
    }

    /// The local player picks option `index` at `now`.
    ///
    /// Reveals the answers, disables further picks and sends the answer to
    /// the host, timed from when the question arrived.
    pub fn select_option(&mut self, index: usize, now: Instant) -> Result<Vec<Effect>, GameError> {
        if self.inert || self.finished {
            return Err(GameError::Finished);
        }
        let Role::Player(player) = &self.role else {
            return Err(GameError::HostCannotAnswer);
        };
        if !self.options_enabled {
            return Err(GameError::OptionsDisabled);
        }
        let option = self
            .question
            .options
            .get_mut(index)
            .ok_or(GameError::InvalidOption(index))?;

        option.locally_selected = true;
        let is_correct = option.is_correct;
        let answer_time = now.saturating_duration_since(player.received_at);
        let answer = PlayerMessage::new(
            player.player_id,
            player.player_name.as_str(),
            PlayerPayload::Answer {
                question_id: self.question.id,
                is_correct,
                answer_time,
            },
        );

        self.show_answers = true;
        self.options_enabled = false;
        debug!(question = %self.question.id, index, is_correct, "sent selected option to host");

        Ok(vec![
            Effect::Notify(GameEvent::AnswersRevealed),
            Effect::Notify(GameEvent::OptionsEnabledChanged(false)),
            Effect::Notify(GameEvent::QuestionChanged(self.question.clone())),
            Effect::SendToHost(answer),
        ])
    }

    /// Enables or disables option selection. Players only.
    pub fn set_options_enabled(&mut self, enabled: bool) -> Result<Vec<Effect>, GameError> {
        if !matches!(self.role, Role::Player(_)) {
            return Err(GameError::HostCannotAnswer);
        }
        if self.inert || self.options_enabled == enabled {
            return Ok(Vec::new());
        }
        self.options_enabled = enabled;
        Ok(vec![Effect::Notify(GameEvent::OptionsEnabledChanged(enabled))])
    }

    // -----------------------------------------------------------------------
    // Both
    // -----------------------------------------------------------------------

    /// The session dropped us. Players go back to the welcome view; the
    /// host has nothing to return to and ignores it.
    pub fn on_disconnected(&mut self, reason: &str) -> Vec<Effect> {
        if self.inert || self.is_host() {
            return Vec::new();
        }
        info!(%reason, "disconnected during game");
        self.cleanup();
        vec![Effect::Navigate(Navigation::Welcome)]
    }

    /// Quits the game from this device.
    ///
    /// A player tells the host first so its card goes away; leaving as
    /// the host ends the session for everyone.
    pub fn leave_game(&mut self) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Role::Player(player) = &self.role {
            effects.push(Effect::SendToHost(PlayerMessage::new(
                player.player_id,
                player.player_name.as_str(),
                PlayerPayload::Leave,
            )));
        }
        self.cleanup();
        effects.push(Effect::EndSession);
        effects.push(Effect::Navigate(Navigation::Welcome));
        effects
    }

    /// One countdown step. Nothing once it reaches zero.
    pub fn on_countdown_tick(&mut self) -> Vec<Effect> {
        if self.inert {
            return Vec::new();
        }
        match self.countdown.tick() {
            Some(remaining) => vec![Effect::Notify(GameEvent::CountdownTick(remaining))],
            None => Vec::new(),
        }
    }

    /// Stops the countdown and turns every handler into a no-op.
    /// Idempotent.
    pub fn cleanup(&mut self) {
        if self.inert {
            return;
        }
        self.inert = true;
        self.countdown.stop();
        debug!(host = self.is_host(), "game view cleaned up");
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn is_host(&self) -> bool {
        matches!(self.role, Role::Host(_))
    }

    pub fn current_question(&self) -> &Question {
        &self.question
    }

    pub fn scorecards(&self) -> &[Scorecard] {
        self.scoreboard.cards()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn show_answers(&self) -> bool {
        self.show_answers
    }

    /// Always `false` on the host.
    pub fn options_enabled(&self) -> bool {
        self.options_enabled
    }

    pub fn countdown(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }
}
