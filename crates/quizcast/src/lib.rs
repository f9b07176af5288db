//! # quizcast
//!
//! Peer-discovered multiplayer trivia. One device hosts a session and
//! reads out questions; nearby devices discover it, join as players and
//! race to answer. Scores are kept by the host and broadcast every second.
//!
//! The crate ties the layers together:
//!
//! ```text
//! PeerHandle (commands) ─→ peer actor ─→ quizcast-game   (lobby / game machines)
//!                              │     └──→ quizcast-protocol (JSON messages)
//!                              └──────→ quizcast-session  (session lifecycle)
//!                                            └─→ quizcast-transport (proximity network)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizcast::prelude::*;
//!
//! # async fn run() -> Result<(), QuizError> {
//! quizcast::logging::init();
//!
//! let network = LocalNetwork::new();
//! let (transport, events) = network.endpoint("Quiz1").await;
//! let (host, _host_events) = Peer::builder().build(transport, events);
//! host.host_game("Quiz1").await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod logging;
mod peer;
mod view;

pub use config::PeerConfig;
pub use error::QuizError;
pub use peer::{Peer, PeerBuilder, PeerEvent, PeerHandle, PeerSnapshot};
pub use view::View;

/// Everything needed to run a peer and drive it.
pub mod prelude {
    pub use crate::{
        Peer, PeerBuilder, PeerConfig, PeerEvent, PeerHandle, PeerSnapshot, QuizError, View,
    };
    pub use quizcast_game::{
        EndGameSummary, GameConfig, GameError, OptionSpec, QuestionBank, QuestionSpec,
    };
    pub use quizcast_protocol::{AnswerStatus, PlayerId, Question, QuestionId, Scorecard};
    pub use quizcast_session::{DebugMessage, SessionError, SessionState};
    #[cfg(feature = "local")]
    pub use quizcast_transport::{LocalNetwork, LocalTransport};
    pub use quizcast_transport::{Participant, ProximityTransport, SessionInfo, TransportEvent};
}
