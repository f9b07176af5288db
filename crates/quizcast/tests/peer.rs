//! Integration tests for the peer runtime over the in-process network.
//!
//! Every peer runs its real actor with a 20 ms tick, so these tests use
//! wall-clock waits bounded by a timeout rather than paused time.

use std::time::Duration;

use quizcast::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, timeout};

// =========================================================================
// Helpers
// =========================================================================

const WAIT: Duration = Duration::from_secs(3);

fn config() -> PeerConfig {
    PeerConfig::default().with_tick_interval(Duration::from_millis(20))
}

fn bank() -> QuestionBank {
    QuestionBank::new([
        QuestionSpec::new(
            "Q1: largest planet?",
            vec![OptionSpec::new("Jupiter", true), OptionSpec::new("Mars", false)],
        ),
        QuestionSpec::new(
            "Q2: smallest prime?",
            vec![OptionSpec::new("2", true), OptionSpec::new("1", false)],
        ),
    ])
}

struct TestPeer {
    handle: PeerHandle,
    events: UnboundedReceiver<PeerEvent>,
}

async fn spawn_peer(net: &LocalNetwork, name: &str) -> TestPeer {
    let (transport, transport_events) = net.endpoint(name).await;
    let (handle, events) = Peer::builder()
        .config(config())
        .build(transport, transport_events);
    TestPeer { handle, events }
}

impl TestPeer {
    /// Waits for the first event matching `pred`, skipping the rest.
    async fn wait_for(&mut self, mut pred: impl FnMut(&PeerEvent) -> bool) -> PeerEvent {
        timeout(WAIT, async {
            loop {
                match self.events.recv().await {
                    Some(event) if pred(&event) => return event,
                    Some(_) => continue,
                    None => panic!("peer event stream closed"),
                }
            }
        })
        .await
        .expect("timed out waiting for a peer event")
    }

    /// Polls snapshots until `pred` holds.
    async fn wait_until(&self, pred: impl Fn(&PeerSnapshot) -> bool) -> PeerSnapshot {
        timeout(WAIT, async {
            loop {
                let snapshot = self.handle.snapshot().await.unwrap();
                if pred(&snapshot) {
                    return snapshot;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for peer state")
    }

    /// Discovers the first advertised session and joins it as `name`.
    async fn discover_and_join(&mut self, name: &str) -> PlayerId {
        self.handle.discover_sessions().await.unwrap();
        let PeerEvent::SessionFound(info) =
            self.wait_for(|e| matches!(e, PeerEvent::SessionFound(_))).await
        else {
            unreachable!()
        };
        self.handle.join_game(info, name).await.unwrap()
    }
}

/// A host lobby named "Quiz1" with Ada and Bob in it.
async fn lobby_with_two_players(net: &LocalNetwork) -> (TestPeer, TestPeer, TestPeer) {
    let host = spawn_peer(net, "Host").await;
    host.handle.host_game("Quiz1").await.unwrap();

    let mut ada = spawn_peer(net, "Ada").await;
    let mut bob = spawn_peer(net, "Bob").await;
    ada.discover_and_join("Ada").await;
    bob.discover_and_join("Bob").await;

    host.wait_until(|s| s.scorecards.len() == 2).await;
    (host, ada, bob)
}

fn is_navigated(event: &PeerEvent, view: &View) -> bool {
    matches!(event, PeerEvent::Navigated(v) if v.name() == view.name())
}

// =========================================================================
// Hosting and joining
// =========================================================================

#[tokio::test]
async fn test_host_game_opens_host_lobby() {
    let net = LocalNetwork::new();
    let mut host = spawn_peer(&net, "Host").await;

    let info = host.handle.host_game("Quiz1").await.unwrap();

    assert_eq!(info.display_name, "Quiz1");
    host.wait_for(|e| is_navigated(e, &View::HostLobby)).await;
    let snapshot = host.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.view, View::HostLobby);
    assert_eq!(snapshot.session_state, SessionState::Active);
    assert!(!snapshot.can_start_game);
}

#[tokio::test]
async fn test_host_game_from_lobby_returns_wrong_view() {
    let net = LocalNetwork::new();
    let host = spawn_peer(&net, "Host").await;
    host.handle.host_game("Quiz1").await.unwrap();

    let result = host.handle.host_game("Quiz2").await;

    assert!(matches!(result, Err(QuizError::WrongView { .. })));
}

#[tokio::test]
async fn test_discover_sessions_denied_returns_access_denied() {
    let net = LocalNetwork::new();
    net.deny_access("Eve").await;
    let eve = spawn_peer(&net, "Eve").await;

    let result = eve.handle.discover_sessions().await;

    assert!(matches!(
        result,
        Err(QuizError::Session(SessionError::AccessDenied))
    ));
    assert_eq!(eve.handle.snapshot().await.unwrap().view, View::Welcome);
}

#[tokio::test]
async fn test_stop_discovery_returns_to_welcome() {
    let net = LocalNetwork::new();
    let mut ada = spawn_peer(&net, "Ada").await;
    ada.handle.discover_sessions().await.unwrap();
    ada.wait_for(|e| is_navigated(e, &View::Joining)).await;

    ada.handle.stop_discovery().await.unwrap();

    ada.wait_for(|e| is_navigated(e, &View::Welcome)).await;
    assert_eq!(ada.handle.snapshot().await.unwrap().session_state, SessionState::Idle);
}

#[tokio::test]
async fn test_join_game_player_appears_in_host_lobby() {
    let net = LocalNetwork::new();
    let mut host = spawn_peer(&net, "Host").await;
    host.handle.host_game("Quiz1").await.unwrap();
    let mut ada = spawn_peer(&net, "Ada").await;

    let player_id = ada.discover_and_join("Ada").await;

    host.wait_for(|e| matches!(e, PeerEvent::ParticipantJoined(p) if p.display_name == "Ada"))
        .await;
    let snapshot = host.wait_until(|s| s.can_start_game).await;
    assert_eq!(snapshot.scorecards[0].player_id, player_id);
    assert_eq!(snapshot.scorecards[0].player_name, "Ada");
}

#[tokio::test]
async fn test_player_lobby_receives_roster_broadcast() {
    let net = LocalNetwork::new();
    let (_host, mut ada, _bob) = lobby_with_two_players(&net).await;

    ada.wait_for(|e| matches!(e, PeerEvent::ScoreboardChanged(cards) if cards.len() == 2))
        .await;
    let snapshot = ada.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.view, View::PlayerLobby);
    assert!(!snapshot.can_start_game);
}

#[tokio::test]
async fn test_player_leave_game_drops_from_host_lobby() {
    let net = LocalNetwork::new();
    let (host, _ada, mut bob) = lobby_with_two_players(&net).await;

    bob.handle.leave_game().await.unwrap();

    bob.wait_for(|e| is_navigated(e, &View::Welcome)).await;
    let snapshot = host.wait_until(|s| s.scorecards.len() == 1).await;
    assert_eq!(snapshot.scorecards[0].player_name, "Ada");
}

#[tokio::test]
async fn test_host_leave_game_sends_players_to_welcome() {
    let net = LocalNetwork::new();
    let (host, mut ada, _bob) = lobby_with_two_players(&net).await;

    host.handle.leave_game().await.unwrap();

    ada.wait_for(|e| matches!(e, PeerEvent::Disconnected { .. })).await;
    ada.wait_for(|e| is_navigated(e, &View::Welcome)).await;
    let snapshot = ada.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session_state, SessionState::Ended);
}

// =========================================================================
// Game
// =========================================================================

#[tokio::test]
async fn test_start_game_without_players_returns_no_players() {
    let net = LocalNetwork::new();
    let host = spawn_peer(&net, "Host").await;
    host.handle.host_game("Quiz1").await.unwrap();

    let result = host.handle.start_game(bank()).await;

    assert!(matches!(result, Err(QuizError::Game(GameError::NoPlayers))));
}

#[tokio::test]
async fn test_select_option_in_lobby_returns_wrong_view() {
    let net = LocalNetwork::new();
    let (_host, ada, _bob) = lobby_with_two_players(&net).await;

    let result = ada.handle.select_option(0).await;

    assert!(matches!(result, Err(QuizError::WrongView { .. })));
}

#[tokio::test]
async fn test_select_option_on_host_returns_host_cannot_answer() {
    let net = LocalNetwork::new();
    let (host, _ada, _bob) = lobby_with_two_players(&net).await;
    host.handle.start_game(bank()).await.unwrap();

    let result = host.handle.select_option(0).await;

    assert!(matches!(
        result,
        Err(QuizError::Game(GameError::HostCannotAnswer))
    ));
}

#[tokio::test]
async fn test_full_game_two_players_ends_with_descending_scores() {
    let net = LocalNetwork::new();
    let (mut host, mut ada, mut bob) = lobby_with_two_players(&net).await;

    host.handle.start_game(bank()).await.unwrap();
    host.wait_for(|e| is_navigated(e, &View::HostGame)).await;
    ada.wait_for(|e| is_navigated(e, &View::PlayerGame)).await;
    bob.wait_for(|e| is_navigated(e, &View::PlayerGame)).await;

    // Question 1: Ada right, Bob wrong.
    ada.handle.select_option(0).await.unwrap();
    bob.handle.select_option(1).await.unwrap();
    let snapshot = host.wait_until(|s| s.show_answers).await;
    let ada_card = snapshot.scorecards.iter().find(|c| c.player_name == "Ada").unwrap();
    let bob_card = snapshot.scorecards.iter().find(|c| c.player_name == "Bob").unwrap();
    assert!(ada_card.total_score > 0);
    assert_eq!(ada_card.answer_status, AnswerStatus::AnsweredCorrectly);
    assert_eq!(bob_card.total_score, 0);
    assert_eq!(bob_card.answer_status, AnswerStatus::AnsweredIncorrectly);

    // The scoreboard broadcast names Ada the leader on Bob's device.
    bob.wait_until(|s| {
        s.scorecards
            .iter()
            .any(|c| c.is_leader && c.player_name == "Ada")
    })
    .await;

    // Question 2: both right.
    host.handle.next_question().await.unwrap();
    for player in [&mut ada, &mut bob] {
        player
            .wait_for(|e| matches!(e, PeerEvent::QuestionChanged(q) if q.text.starts_with("Q2")))
            .await;
        player.handle.select_option(0).await.unwrap();
    }
    host.wait_until(|s| s.show_answers).await;

    // Past the last question.
    host.handle.next_question().await.unwrap();
    let host_end = host.wait_until(|s| s.view.name() == "EndGame").await;

    let PeerEvent::Navigated(View::EndGame(summary)) = ada
        .wait_for(|e| matches!(e, PeerEvent::Navigated(View::EndGame(_))))
        .await
    else {
        unreachable!()
    };
    assert_eq!(summary.winner_name.as_deref(), Some("Ada"));
    assert_eq!(summary.viewer_name.as_deref(), Some("Ada"));
    let scores: Vec<u32> = summary.scorecards.iter().map(|c| c.total_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(summary.scorecards[0].total_correct_answers, 2);
    assert_eq!(summary.scorecards[1].total_correct_answers, 1);
    assert_eq!(host_end.scorecards.len(), 2);

    // Nothing more to advance.
    assert!(host.handle.next_question().await.is_err());
}

#[tokio::test]
async fn test_player_disconnected_mid_game_returns_to_welcome() {
    let net = LocalNetwork::new();
    let (host, mut ada, _bob) = lobby_with_two_players(&net).await;
    host.handle.start_game(bank()).await.unwrap();
    ada.wait_for(|e| is_navigated(e, &View::PlayerGame)).await;

    host.handle.leave_game().await.unwrap();

    ada.wait_for(|e| is_navigated(e, &View::Welcome)).await;
    let result = ada.handle.select_option(0).await;
    assert!(matches!(result, Err(QuizError::WrongView { .. })));
}

#[tokio::test]
async fn test_countdown_ticks_during_game() {
    let net = LocalNetwork::new();
    let (host, mut ada, _bob) = lobby_with_two_players(&net).await;
    host.handle.start_game(bank()).await.unwrap();

    let PeerEvent::CountdownTick(first) = ada
        .wait_for(|e| matches!(e, PeerEvent::CountdownTick(_)))
        .await
    else {
        unreachable!()
    };

    assert!(first < GameConfig::default().countdown_start);
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn test_shutdown_closes_handle() {
    let net = LocalNetwork::new();
    let host = spawn_peer(&net, "Host").await;
    host.handle.host_game("Quiz1").await.unwrap();

    host.handle.shutdown().await.unwrap();

    timeout(WAIT, async {
        while !host.handle.is_closed() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("actor should stop");
    assert!(matches!(host.handle.snapshot().await, Err(QuizError::Closed)));
    assert!(net.sessions().await.is_empty());
}
