//! The single live view and what it owns.
//!
//! A view bundles its state machine with the resources it needs while it
//! is on screen: the session subscription and up to two tickers. Only one
//! [`LiveView`] exists per peer; replacing it cleans up the old one first,
//! and dropping it without an explicit cleanup does the same.

use std::time::Duration;

use quizcast_game::{EndGameSummary, Effect, GameMachine, HostLobby, PlayerLobby};
use quizcast_protocol::{HostMessage, PlayerMessage, Question, QuestionId, Scorecard};
use quizcast_session::{SessionEvent, Subscription};
use quizcast_tick::Ticker;
use tokio::time::Instant;

/// Which view is showing, as seen from outside the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Welcome,
    /// Browsing nearby sessions.
    Joining,
    HostLobby,
    PlayerLobby,
    HostGame,
    PlayerGame,
    EndGame(EndGameSummary),
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Joining => "Joining",
            Self::HostLobby => "HostLobby",
            Self::PlayerLobby => "PlayerLobby",
            Self::HostGame => "HostGame",
            Self::PlayerGame => "PlayerGame",
            Self::EndGame(_) => "EndGame",
        }
    }
}

/// A view's state machine.
#[derive(Debug)]
pub(crate) enum Screen {
    Welcome,
    Joining,
    HostLobby(HostLobby),
    PlayerLobby(PlayerLobby),
    Game(GameMachine),
    EndGame(EndGameSummary),
}

impl Screen {
    pub(crate) fn view(&self) -> View {
        match self {
            Self::Welcome => View::Welcome,
            Self::Joining => View::Joining,
            Self::HostLobby(_) => View::HostLobby,
            Self::PlayerLobby(_) => View::PlayerLobby,
            Self::Game(game) if game.is_host() => View::HostGame,
            Self::Game(_) => View::PlayerGame,
            Self::EndGame(summary) => View::EndGame(summary.clone()),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.view().name()
    }

    /// Whether this view runs the countdown, and whether it broadcasts
    /// the scoreboard.
    fn timers(&self) -> (bool, bool) {
        match self {
            Self::HostLobby(_) => (false, true),
            Self::Game(game) => (true, game.is_host()),
            _ => (false, false),
        }
    }

    pub(crate) fn handle_player_message(&mut self, msg: PlayerMessage) -> Option<Vec<Effect>> {
        match self {
            Self::HostLobby(lobby) => Some(lobby.handle_player_message(msg)),
            Self::Game(game) => Some(game.handle_player_message(msg)),
            _ => None,
        }
    }

    pub(crate) fn handle_host_message(
        &mut self,
        msg: HostMessage,
        now: Instant,
    ) -> Option<Vec<Effect>> {
        match self {
            Self::PlayerLobby(lobby) => Some(lobby.handle_host_message(msg, now)),
            Self::Game(game) => Some(game.handle_host_message(msg, now)),
            _ => None,
        }
    }

    pub(crate) fn on_disconnected(&mut self, reason: &str) -> Vec<Effect> {
        match self {
            Self::PlayerLobby(lobby) => lobby.on_disconnected(reason),
            Self::Game(game) => game.on_disconnected(reason),
            _ => Vec::new(),
        }
    }

    pub(crate) fn on_countdown_tick(&mut self) -> Vec<Effect> {
        match self {
            Self::Game(game) => game.on_countdown_tick(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn on_broadcast_tick(&mut self) -> Vec<Effect> {
        match self {
            Self::HostLobby(lobby) => lobby.on_broadcast_tick(),
            Self::Game(game) => game.on_broadcast_tick(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn question(&self) -> Option<&Question> {
        match self {
            Self::Game(game) => Some(game.current_question()),
            _ => None,
        }
    }

    pub(crate) fn scorecards(&self) -> Vec<Scorecard> {
        match self {
            Self::HostLobby(lobby) => lobby.scorecards().to_vec(),
            Self::PlayerLobby(lobby) => lobby.scorecards().to_vec(),
            Self::Game(game) => game.scorecards().to_vec(),
            Self::EndGame(summary) => summary.scorecards.clone(),
            Self::Welcome | Self::Joining => Vec::new(),
        }
    }

    fn cleanup(&mut self) {
        match self {
            Self::HostLobby(lobby) => lobby.cleanup(),
            Self::PlayerLobby(lobby) => lobby.cleanup(),
            Self::Game(game) => game.cleanup(),
            _ => {}
        }
    }
}

/// The view on screen plus the resources it holds.
#[derive(Debug)]
pub(crate) struct LiveView {
    pub(crate) screen: Screen,
    pub(crate) subscription: Option<Subscription>,
    pub(crate) countdown: Ticker,
    pub(crate) broadcast: Ticker,
    /// The question the countdown ticker is timing.
    question_id: Option<QuestionId>,
}

impl LiveView {
    pub(crate) fn new(
        screen: Screen,
        subscription: Option<Subscription>,
        tick_interval: Duration,
    ) -> Self {
        let (countdown, broadcast) = screen.timers();
        let ticker = |on: bool| {
            if on {
                Ticker::every(tick_interval)
            } else {
                Ticker::disabled()
            }
        };
        Self {
            countdown: ticker(countdown),
            broadcast: ticker(broadcast),
            question_id: screen.question().map(|q| q.id),
            screen,
            subscription,
        }
    }

    /// Restarts the countdown cadence when a different question comes up,
    /// so its first decrement is a full interval after the reset.
    pub(crate) fn on_question_changed(&mut self, id: QuestionId) {
        if self.question_id != Some(id) {
            self.question_id = Some(id);
            self.countdown.restart();
        }
    }

    /// Stops the tickers, neutralizes the machine and closes the
    /// subscription. Returns events that were queued but not yet handled.
    /// Idempotent.
    pub(crate) fn cleanup(&mut self) -> Vec<SessionEvent> {
        self.countdown.stop();
        self.broadcast.stop();
        self.screen.cleanup();

        let mut leftovers = Vec::new();
        if let Some(mut subscription) = self.subscription.take() {
            while let Some(event) = subscription.try_recv() {
                leftovers.push(event);
            }
            subscription.close();
        }
        leftovers
    }
}

impl Drop for LiveView {
    fn drop(&mut self) {
        let dropped = self.cleanup().len();
        if dropped > 0 {
            tracing::debug!(view = self.screen.name(), dropped, "view dropped with queued events");
        }
    }
}

/// Next event from the view's subscription; pends forever without one.
pub(crate) async fn next_session_event(
    subscription: &mut Option<Subscription>,
) -> Option<SessionEvent> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizcast_game::{HostGameStart, OptionSpec, QuestionBank, QuestionSpec};
    use quizcast_protocol::PlayerId;

    fn host_game() -> Screen {
        let bank = QuestionBank::new([QuestionSpec::new(
            "?",
            vec![OptionSpec::new("a", true)],
        )]);
        let start = HostGameStart {
            bank,
            scorecards: vec![Scorecard::new(PlayerId(1), "Ada")],
        };
        Screen::Game(GameMachine::host(Default::default(), start).unwrap())
    }

    #[tokio::test]
    async fn test_live_view_host_game_runs_both_timers() {
        let view = LiveView::new(host_game(), None, Duration::from_secs(1));
        assert!(!view.countdown.is_disabled());
        assert!(!view.broadcast.is_disabled());
        assert_eq!(view.screen.view(), View::HostGame);
    }

    #[tokio::test]
    async fn test_live_view_player_lobby_runs_no_timers() {
        let screen = Screen::PlayerLobby(PlayerLobby::new(PlayerId(2), "Bob"));
        let view = LiveView::new(screen, None, Duration::from_secs(1));
        assert!(view.countdown.is_disabled());
        assert!(view.broadcast.is_disabled());
    }

    #[tokio::test]
    async fn test_live_view_cleanup_is_idempotent() {
        let mut view = LiveView::new(host_game(), None, Duration::from_secs(1));
        assert!(view.cleanup().is_empty());
        assert!(view.cleanup().is_empty());
        assert!(view.countdown.is_stopped());
        let Screen::Game(game) = &view.screen else {
            panic!("expected a game screen");
        };
        assert!(game.is_inert());
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_question_changed_restarts_countdown_for_new_question_only() {
        let start = Instant::now();
        let mut view = LiveView::new(host_game(), None, Duration::from_secs(1));

        tokio::time::advance(Duration::from_millis(600)).await;
        // Same question again, as after selecting an option: cadence kept.
        view.on_question_changed(QuestionId(1));
        view.countdown.wait_for_tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));

        tokio::time::advance(Duration::from_millis(400)).await;
        view.on_question_changed(QuestionId(2));
        view.countdown.wait_for_tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(2400));
    }

    #[test]
    fn test_screen_messages_for_other_role_are_not_routed() {
        let mut screen = Screen::Welcome;
        let msg = PlayerMessage::new(PlayerId(1), "Ada", quizcast_protocol::PlayerPayload::Join);
        assert!(screen.handle_player_message(msg).is_none());
    }
}
