//! A host and two bot players on one in-process network.
//!
//! Run with `RUST_LOG=debug` to watch every message go by.

use std::time::Duration;

use quizcast::prelude::*;
use rand::Rng;
use tokio::time::sleep;

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

const QUESTIONS: &[u8] = br#"[
    { "text": "Which planet is the largest?",
      "options": [ { "text": "Mars" }, { "text": "Jupiter", "is_correct": true }, { "text": "Venus" } ] },
    { "text": "What is the smallest prime?",
      "options": [ { "text": "1" }, { "text": "2", "is_correct": true }, { "text": "3" } ] },
    { "text": "How many sides does a hexagon have?",
      "options": [ { "text": "6", "is_correct": true }, { "text": "8" }, { "text": "5" } ] }
]"#;

const PLAYERS: [&str; 2] = ["Ada", "Bob"];

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

/// Joins the first session it finds and answers every question after a
/// short random think, right about two times in three.
async fn run_bot(net: LocalNetwork, name: &'static str) -> Result<(), QuizError> {
    let (transport, transport_events) = net.endpoint(name).await;
    let (peer, mut events) = Peer::builder().build(transport, transport_events);

    peer.discover_sessions().await?;
    while let Some(event) = events.recv().await {
        match event {
            PeerEvent::SessionFound(info) => {
                let player_id = peer.join_game(info, name).await?;
                tracing::info!(name, %player_id, "bot joined");
            }
            PeerEvent::Navigated(View::PlayerGame) => {
                if let Some(question) = peer.snapshot().await?.question {
                    answer(&peer, name, &question).await;
                }
            }
            PeerEvent::QuestionChanged(question)
                if !question.options.iter().any(|o| o.locally_selected) =>
            {
                answer(&peer, name, &question).await;
            }
            PeerEvent::Navigated(View::EndGame(summary)) => {
                tracing::info!(name, winner = ?summary.winner_name, "bot saw the end");
                break;
            }
            PeerEvent::Disconnected { reason } => {
                tracing::info!(name, %reason, "bot disconnected");
                break;
            }
            _ => {}
        }
    }

    peer.shutdown().await
}

async fn answer(peer: &PeerHandle, name: &str, question: &Question) {
    let (think, index) = {
        let mut rng = rand::rng();
        let think = Duration::from_millis(rng.random_range(200..1500));
        let index = if rng.random_bool(2.0 / 3.0) {
            question.correct_index
        } else {
            rng.random_range(0..question.options.len().max(1))
        };
        (think, index)
    };
    sleep(think).await;
    if let Err(e) = peer.select_option(index).await {
        tracing::warn!(name, error = %e, "bot could not answer");
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

async fn run_host(net: LocalNetwork, bank: QuestionBank) -> Result<EndGameSummary, QuizError> {
    let (transport, transport_events) = net.endpoint("Host").await;
    let (peer, mut events) = Peer::builder().build(transport, transport_events);

    peer.host_game("Quiz1").await?;
    wait_until(&peer, |s| s.scorecards.len() == PLAYERS.len()).await?;
    peer.start_game(bank).await?;

    loop {
        // Move on once everyone answered or the countdown ran out.
        wait_until(&peer, |s| s.show_answers || s.countdown == Some(0)).await?;
        sleep(Duration::from_millis(500)).await;
        peer.next_question().await?;

        let snapshot = peer.snapshot().await?;
        if let View::EndGame(summary) = snapshot.view {
            while let Ok(event) = events.try_recv() {
                tracing::trace!(?event, "host event");
            }
            peer.shutdown().await?;
            return Ok(summary);
        }
    }
}

async fn wait_until(
    peer: &PeerHandle,
    pred: impl Fn(&PeerSnapshot) -> bool,
) -> Result<PeerSnapshot, QuizError> {
    loop {
        let snapshot = peer.snapshot().await?;
        if pred(&snapshot) {
            return Ok(snapshot);
        }
        sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), QuizError> {
    quizcast::logging::init();

    let bank = QuestionBank::from_json(QUESTIONS)?;
    let net = LocalNetwork::new();

    let host = tokio::spawn(run_host(net.clone(), bank));
    // Give the host a moment to advertise.
    sleep(Duration::from_millis(100)).await;
    let bots: Vec<_> = PLAYERS
        .into_iter()
        .map(|name| tokio::spawn(run_bot(net.clone(), name)))
        .collect();

    let summary = match host.await {
        Ok(result) => result?,
        Err(e) => {
            tracing::error!(error = %e, "host task failed");
            return Ok(());
        }
    };
    for bot in bots {
        if let Ok(Err(e)) = bot.await {
            tracing::warn!(error = %e, "bot ended with an error");
        }
    }

    println!("Final standings:");
    for (rank, card) in summary.scorecards.iter().enumerate() {
        println!(
            "  {}. {} - {} points, {} correct, {}",
            rank + 1,
            card.player_name,
            card.total_score,
            card.total_correct_answers,
            card.time_label(),
        );
    }
    Ok(())
}
