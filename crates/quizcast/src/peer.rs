//! The peer runtime: one actor task per device.
//!
//! The actor owns the [`SessionCoordinator`], the codec and the live view.
//! Everything that can change game state reaches it through one
//! `tokio::select!` loop:
//!
//! ```text
//!   transport events ──→ coordinator ──→ subscription ─┐
//!   countdown ticker ──────────────────────────────────┤
//!   broadcast ticker ──────────────────────────────────┼──→ live view ──→ effects
//!   PeerHandle commands ───────────────────────────────┘
//! ```
//!
//! Effects are carried out in order: messages are encoded and sent
//! (failures are logged, never retried), change notifications become
//! [`PeerEvent`]s, and navigation swaps the live view.

use std::collections::VecDeque;

use quizcast_game::{
    Effect, GameEvent, GameMachine, HostLobby, Navigation, PlayerLobby, QuestionBank,
};
use quizcast_protocol::{
    Codec, HostMessage, JsonCodec, PlayerId, PlayerMessage, Question, Scorecard,
};
use quizcast_session::{
    DebugMessage, SessionCoordinator, SessionError, SessionEvent, SessionState,
};
use quizcast_transport::{Participant, ProximityTransport, SessionInfo, TransportEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::view::{LiveView, Screen, View, next_session_event};
use crate::{PeerConfig, QuizError};

// ---------------------------------------------------------------------------
// Public surface
// ---------------------------------------------------------------------------

/// Everything the presentation layer hears from a peer.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    /// (Joining) a nearby session appeared.
    SessionFound(SessionInfo),
    /// (Joining) a session went away.
    SessionRemoved(SessionInfo),
    /// (Host) someone was admitted to the session.
    ParticipantJoined(Participant),
    /// The live view changed.
    Navigated(View),
    QuestionChanged(Question),
    ScoreboardChanged(Vec<Scorecard>),
    AnswersRevealed,
    OptionsEnabledChanged(bool),
    CountdownTick(u32),
    /// The session dropped this device.
    Disconnected { reason: String },
    Debug(DebugMessage),
}

impl From<GameEvent> for PeerEvent {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::QuestionChanged(q) => Self::QuestionChanged(q),
            GameEvent::ScoreboardChanged(cards) => Self::ScoreboardChanged(cards),
            GameEvent::AnswersRevealed => Self::AnswersRevealed,
            GameEvent::OptionsEnabledChanged(on) => Self::OptionsEnabledChanged(on),
            GameEvent::CountdownTick(n) => Self::CountdownTick(n),
        }
    }
}

/// What the peer is showing right now.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerSnapshot {
    pub view: View,
    pub session_state: SessionState,
    pub session: Option<SessionInfo>,
    /// Sessions seen while on the joining view.
    pub discovered: Vec<SessionInfo>,
    pub question: Option<Question>,
    pub scorecards: Vec<Scorecard>,
    pub show_answers: bool,
    pub options_enabled: bool,
    /// Seconds left on the question, in a game view.
    pub countdown: Option<u32>,
    pub can_start_game: bool,
}

/// Entry point for building a peer.
///
/// ```rust,no_run
/// # async fn demo() {
/// use quizcast::prelude::*;
///
/// let network = LocalNetwork::new();
/// let (transport, transport_events) = network.endpoint("Quiz1").await;
/// let (peer, mut events) = Peer::builder().build(transport, transport_events);
///
/// peer.host_game("Quiz1").await.unwrap();
/// while let Some(event) = events.recv().await {
///     println!("{event:?}");
/// }
/// # }
/// ```
pub struct Peer;

impl Peer {
    pub fn builder() -> PeerBuilder {
        PeerBuilder::new()
    }
}

/// Builder for a peer actor.
#[derive(Debug, Clone, Default)]
pub struct PeerBuilder {
    config: PeerConfig,
}

impl PeerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PeerConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawns the actor on the current Tokio runtime.
    ///
    /// `transport_events` is the receiver that came with `transport`.
    /// The returned receiver carries every [`PeerEvent`]; dropping it is
    /// fine, events are then discarded.
    ///
    /// # Panics
    /// Outside a Tokio runtime.
    pub fn build<T: ProximityTransport>(
        self,
        transport: T,
        transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> (PeerHandle, mpsc::UnboundedReceiver<PeerEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.command_buffer.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut session = SessionCoordinator::new(transport);
        let subscription = match session.subscribe() {
            Ok(sub) => Some(sub),
            Err(e) => {
                warn!(error = %e, "could not subscribe welcome view");
                None
            }
        };
        let view = LiveView::new(Screen::Welcome, subscription, self.config.tick_interval);
        let name = session.local_participant().display_name.clone();

        let actor = PeerActor {
            config: self.config,
            session,
            codec: JsonCodec,
            transport_events,
            commands: cmd_rx,
            events: event_tx,
            view,
            replay: VecDeque::new(),
            discovered: Vec::new(),
            join_pending: false,
        };
        tokio::spawn(actor.run());

        info!(%name, "peer started");
        (PeerHandle { sender: cmd_tx }, event_rx)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

type Reply<T> = oneshot::Sender<Result<T, QuizError>>;

pub(crate) enum PeerCommand {
    HostGame {
        name: String,
        reply: Reply<SessionInfo>,
    },
    DiscoverSessions {
        reply: Reply<()>,
    },
    StopDiscovery {
        reply: Reply<()>,
    },
    JoinGame {
        info: SessionInfo,
        player_name: String,
        reply: Reply<PlayerId>,
    },
    StartGame {
        bank: QuestionBank,
        reply: Reply<()>,
    },
    NextQuestion {
        reply: Reply<()>,
    },
    SelectOption {
        index: usize,
        reply: Reply<()>,
    },
    LeaveGame {
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<PeerSnapshot>,
    },
    Shutdown,
}

/// Handle to a running peer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    sender: mpsc::Sender<PeerCommand>,
}

impl PeerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> PeerCommand,
    ) -> Result<T, QuizError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| QuizError::Closed)?;
        reply_rx.await.map_err(|_| QuizError::Closed)?
    }

    /// Creates a session named `name` and opens the host lobby.
    pub async fn host_game(&self, name: impl Into<String>) -> Result<SessionInfo, QuizError> {
        let name = name.into();
        self.request(|reply| PeerCommand::HostGame { name, reply })
            .await
    }

    /// Starts browsing for sessions; results arrive as
    /// [`PeerEvent::SessionFound`].
    pub async fn discover_sessions(&self) -> Result<(), QuizError> {
        self.request(|reply| PeerCommand::DiscoverSessions { reply })
            .await
    }

    /// Stops browsing and returns to the welcome view.
    pub async fn stop_discovery(&self) -> Result<(), QuizError> {
        self.request(|reply| PeerCommand::StopDiscovery { reply })
            .await
    }

    /// Joins `info` as `player_name` and opens the player lobby. Returns
    /// the id this device plays under.
    pub async fn join_game(
        &self,
        info: SessionInfo,
        player_name: impl Into<String>,
    ) -> Result<PlayerId, QuizError> {
        let player_name = player_name.into();
        self.request(|reply| PeerCommand::JoinGame {
            info,
            player_name,
            reply,
        })
        .await
    }

    /// (Host lobby) starts the game with `bank`.
    pub async fn start_game(&self, bank: QuestionBank) -> Result<(), QuizError> {
        self.request(|reply| PeerCommand::StartGame { bank, reply })
            .await
    }

    /// (Host game) moves on, or ends the game after the last question.
    pub async fn next_question(&self) -> Result<(), QuizError> {
        self.request(|reply| PeerCommand::NextQuestion { reply })
            .await
    }

    /// (Player game) answers the current question.
    pub async fn select_option(&self, index: usize) -> Result<(), QuizError> {
        self.request(|reply| PeerCommand::SelectOption { index, reply })
            .await
    }

    /// Leaves whatever is on screen and goes back to the welcome view.
    pub async fn leave_game(&self) -> Result<(), QuizError> {
        self.request(|reply| PeerCommand::LeaveGame { reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<PeerSnapshot, QuizError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(PeerCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| QuizError::Closed)?;
        reply_rx.await.map_err(|_| QuizError::Closed)
    }

    /// Ends the session and stops the actor.
    pub async fn shutdown(&self) -> Result<(), QuizError> {
        self.sender
            .send(PeerCommand::Shutdown)
            .await
            .map_err(|_| QuizError::Closed)
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct PeerActor<T: ProximityTransport> {
    config: PeerConfig,
    session: SessionCoordinator<T>,
    codec: JsonCodec,
    transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    commands: mpsc::Receiver<PeerCommand>,
    events: mpsc::UnboundedSender<PeerEvent>,
    view: LiveView,
    /// Events the previous view left unhandled, for the new one.
    replay: VecDeque<SessionEvent>,
    discovered: Vec<SessionInfo>,
    /// The player lobby still owes the host its `Join`.
    join_pending: bool,
}

impl<T: ProximityTransport> PeerActor<T> {
    async fn run(mut self) {
        info!(
            name = %self.session.local_participant().display_name,
            "peer actor started"
        );

        loop {
            while let Some(event) = self.replay.pop_front() {
                self.on_session_event(event).await;
            }

            tokio::select! {
                Some(event) = self.transport_events.recv() => {
                    self.session.handle_transport_event(event).await;
                    self.flush_join().await;
                }
                Some(event) = next_session_event(&mut self.view.subscription) => {
                    self.on_session_event(event).await;
                }
                _ = self.view.countdown.wait_for_tick() => {
                    let effects = self.view.screen.on_countdown_tick();
                    self.apply(effects).await;
                }
                _ = self.view.broadcast.wait_for_tick() => {
                    let effects = self.view.screen.on_broadcast_tick();
                    self.apply(effects).await;
                }
                cmd = self.commands.recv() => match cmd {
                    Some(PeerCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
            }
        }

        self.view.cleanup();
        self.session.end_session().await;
        info!("peer actor stopped");
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    async fn handle_command(&mut self, cmd: PeerCommand) {
        match cmd {
            PeerCommand::HostGame { name, reply } => {
                let _ = reply.send(self.host_game(&name).await);
            }
            PeerCommand::DiscoverSessions { reply } => {
                let _ = reply.send(self.discover_sessions().await);
            }
            PeerCommand::StopDiscovery { reply } => {
                let _ = reply.send(self.stop_discovery().await);
            }
            PeerCommand::JoinGame {
                info,
                player_name,
                reply,
            } => {
                let _ = reply.send(self.join_game(&info, &player_name).await);
            }
            PeerCommand::StartGame { bank, reply } => {
                let result = match &mut self.view.screen {
                    Screen::HostLobby(lobby) => lobby.start_game(bank).map_err(QuizError::from),
                    other => Err(wrong_view("start the game", other)),
                };
                let _ = reply.send(self.apply_result(result).await);
            }
            PeerCommand::NextQuestion { reply } => {
                let result = match &mut self.view.screen {
                    Screen::Game(game) => game.next_question().map_err(QuizError::from),
                    other => Err(wrong_view("advance questions", other)),
                };
                let _ = reply.send(self.apply_result(result).await);
            }
            PeerCommand::SelectOption { index, reply } => {
                let result = match &mut self.view.screen {
                    Screen::Game(game) => game
                        .select_option(index, Instant::now())
                        .map_err(QuizError::from),
                    other => Err(wrong_view("select an option", other)),
                };
                let _ = reply.send(self.apply_result(result).await);
            }
            PeerCommand::LeaveGame { reply } => {
                let _ = reply.send(self.leave_game().await);
            }
            PeerCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            PeerCommand::Shutdown => {}
        }
    }

    async fn apply_result(&mut self, result: Result<Vec<Effect>, QuizError>) -> Result<(), QuizError> {
        let effects = result?;
        self.apply(effects).await;
        Ok(())
    }

    async fn host_game(&mut self, name: &str) -> Result<SessionInfo, QuizError> {
        if !matches!(self.view.screen, Screen::Welcome | Screen::EndGame(_)) {
            return Err(wrong_view("host a game", &self.view.screen));
        }
        self.close_finished_session().await;
        let info = self.session.create_session(name).await?;
        self.navigate_to(Screen::HostLobby(HostLobby::new(info.display_name.as_str())));
        Ok(info)
    }

    async fn discover_sessions(&mut self) -> Result<(), QuizError> {
        if !matches!(self.view.screen, Screen::Welcome | Screen::EndGame(_)) {
            return Err(wrong_view("discover sessions", &self.view.screen));
        }
        self.close_finished_session().await;
        self.session.discover_sessions().await?;
        self.discovered.clear();
        self.navigate_to(Screen::Joining);
        Ok(())
    }

    /// The end view keeps the finished session open; starting something
    /// new from there ends it first.
    async fn close_finished_session(&mut self) {
        if matches!(self.view.screen, Screen::EndGame(_)) {
            self.session.end_session().await;
        }
    }

    async fn stop_discovery(&mut self) -> Result<(), QuizError> {
        self.session.stop_discovery().await?;
        if matches!(self.view.screen, Screen::Joining) {
            self.discovered.clear();
            self.navigate_to(Screen::Welcome);
        }
        Ok(())
    }

    async fn join_game(&mut self, info: &SessionInfo, player_name: &str) -> Result<PlayerId, QuizError> {
        if !matches!(self.view.screen, Screen::Joining) {
            return Err(wrong_view("join a game", &self.view.screen));
        }
        self.session.join_session(info, player_name).await?;
        if let Err(e) = self.session.stop_discovery().await {
            warn!(error = %e, "stop_discovery after join failed");
        }

        let player_id = PlayerId::generate();
        info!(%player_id, name = player_name, session = %info.display_name, "joined game");
        self.discovered.clear();
        self.navigate_to(Screen::PlayerLobby(PlayerLobby::new(player_id, player_name)));
        self.join_pending = true;
        self.flush_join().await;
        Ok(player_id)
    }

    async fn leave_game(&mut self) -> Result<(), QuizError> {
        let effects = match &mut self.view.screen {
            Screen::HostLobby(lobby) => lobby.leave_game(),
            Screen::PlayerLobby(lobby) => lobby.leave_game(),
            Screen::Game(game) => game.leave_game(),
            Screen::Joining => {
                self.session.stop_discovery().await?;
                vec![Effect::Navigate(Navigation::Welcome)]
            }
            Screen::EndGame(_) => vec![Effect::EndSession, Effect::Navigate(Navigation::Welcome)],
            Screen::Welcome => Vec::new(),
        };
        self.join_pending = false;
        self.apply(effects).await;
        Ok(())
    }

    fn snapshot(&self) -> PeerSnapshot {
        let screen = &self.view.screen;
        let game = match screen {
            Screen::Game(game) => Some(game),
            _ => None,
        };
        PeerSnapshot {
            view: screen.view(),
            session_state: self.session.state(),
            session: self.session.current_session().cloned(),
            discovered: self.discovered.clone(),
            question: screen.question().cloned(),
            scorecards: screen.scorecards(),
            show_answers: game.is_some_and(|g| g.show_answers()),
            options_enabled: game.is_some_and(|g| g.options_enabled()),
            countdown: game.map(|g| g.countdown()),
            can_start_game: match screen {
                Screen::HostLobby(lobby) => lobby.can_start_game(),
                _ => false,
            },
        }
    }

    /// Sends the player lobby's `Join` once the host can be addressed.
    async fn flush_join(&mut self) {
        if !self.join_pending || !self.session.host_known() {
            return;
        }
        let Screen::PlayerLobby(lobby) = &self.view.screen else {
            self.join_pending = false;
            return;
        };
        let effects = lobby.enter();
        self.join_pending = false;
        self.apply(effects).await;
    }

    // -----------------------------------------------------------------------
    // Session events
    // -----------------------------------------------------------------------

    async fn on_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ParticipantJoined(participant) => {
                self.emit(PeerEvent::ParticipantJoined(participant));
            }
            SessionEvent::SessionFound(info) => {
                if !matches!(self.view.screen, Screen::Joining) {
                    return;
                }
                if !self.discovered.iter().any(|s| s.id == info.id) {
                    self.discovered.push(info.clone());
                }
                self.emit(PeerEvent::SessionFound(info));
            }
            SessionEvent::SessionRemoved {
                controller_display_name,
                info,
            } => {
                if !matches!(self.view.screen, Screen::Joining) {
                    return;
                }
                self.discovered
                    .retain(|s| s.controller_display_name != controller_display_name);
                self.emit(PeerEvent::SessionRemoved(info));
            }
            SessionEvent::MessageReceived { data, sender } => {
                self.on_message(&data, &sender).await;
            }
            SessionEvent::Disconnected { reason } => {
                self.emit(PeerEvent::Disconnected {
                    reason: reason.clone(),
                });
                let effects = self.view.screen.on_disconnected(&reason);
                self.apply(effects).await;
                if !self.session.is_host() {
                    self.join_pending = false;
                    self.session.end_session().await;
                }
            }
            SessionEvent::Debug(message) => self.emit(PeerEvent::Debug(message)),
        }
    }

    async fn on_message(&mut self, data: &[u8], sender: &Participant) {
        let effects = if self.session.is_host() {
            let msg: PlayerMessage = match self.codec.decode(data) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(sender = %sender.display_name, error = %e, "undecodable player message, dropping");
                    return;
                }
            };
            debug!(kind = msg.kind(), player_id = %msg.player_id, "player message");
            self.view.screen.handle_player_message(msg)
        } else {
            let msg: HostMessage = match self.codec.decode(data) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(sender = %sender.display_name, error = %e, "undecodable host message, dropping");
                    return;
                }
            };
            debug!(kind = msg.kind(), "host message");
            self.view.screen.handle_host_message(msg, Instant::now())
        };

        match effects {
            Some(effects) => self.apply(effects).await,
            None => debug!(view = self.view.screen.name(), "message not for this view, dropping"),
        }
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Broadcast(msg) => self.broadcast(&msg).await,
                Effect::SendToHost(msg) => self.send_to_host(&msg).await,
                Effect::Notify(event) => {
                    if let GameEvent::QuestionChanged(question) = &event {
                        self.view.on_question_changed(question.id);
                    }
                    self.emit(event.into());
                }
                Effect::EndSession => self.session.end_session().await,
                Effect::Navigate(navigation) => self.navigate(navigation).await,
            }
        }
    }

    async fn broadcast(&self, msg: &HostMessage) {
        let bytes = match self.codec.encode(msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(kind = msg.kind(), error = %e, "encode failed");
                return;
            }
        };
        if let Err(e) = self.session.broadcast(&bytes).await {
            warn!(kind = msg.kind(), error = %e, "broadcast failed");
        }
    }

    async fn send_to_host(&self, msg: &PlayerMessage) {
        let bytes = match self.codec.encode(msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(kind = msg.kind(), error = %e, "encode failed");
                return;
            }
        };
        match self.session.send_to_host(&bytes).await {
            Ok(()) => {}
            Err(SessionError::HostNotYetKnown) => {
                debug!(kind = msg.kind(), "host not yet known, message dropped");
            }
            Err(e) => warn!(kind = msg.kind(), error = %e, "send to host failed"),
        }
    }

    async fn navigate(&mut self, navigation: Navigation) {
        debug!(to = navigation.name(), "navigating");
        let screen = match navigation {
            Navigation::HostGame(start) => {
                match GameMachine::host(self.config.game.clone(), start) {
                    Ok(game) => Screen::Game(game),
                    Err(e) => {
                        warn!(error = %e, "could not start host game");
                        self.session.end_session().await;
                        Screen::Welcome
                    }
                }
            }
            Navigation::PlayerGame(start) => {
                Screen::Game(GameMachine::player(self.config.game.clone(), start))
            }
            Navigation::EndGame(summary) => Screen::EndGame(summary),
            Navigation::Welcome => Screen::Welcome,
        };
        self.navigate_to(screen);
    }

    /// Replaces the live view. The old one is cleaned up before the new
    /// one subscribes; whatever it left queued is replayed to the new one.
    fn navigate_to(&mut self, screen: Screen) {
        let leftovers = self.view.cleanup();
        self.replay.extend(leftovers);

        let subscription = match self.session.subscribe() {
            Ok(sub) => Some(sub),
            Err(e) => {
                warn!(error = %e, "could not subscribe new view");
                None
            }
        };
        info!(from = self.view.screen.name(), to = screen.name(), "view changed");
        self.view = LiveView::new(screen, subscription, self.config.tick_interval);
        self.emit(PeerEvent::Navigated(self.view.screen.view()));
    }

    fn emit(&self, event: PeerEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("peer event dropped, no listener");
        }
    }
}

fn wrong_view(operation: &'static str, screen: &Screen) -> QuizError {
    QuizError::WrongView {
        operation,
        view: screen.name(),
    }
}
