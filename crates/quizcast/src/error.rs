//! Unified error type for quizcast.

use quizcast_game::GameError;
use quizcast_protocol::ProtocolError;
use quizcast_session::SessionError;
use quizcast_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// Each sub-crate error converts through `#[from]`, so `?` works across
/// layers. The two peer-specific variants cover talking to an actor that
/// is gone and asking a view for something it does not do.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// A transport-level error.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (access, limits, host not known).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A lobby or game rule was broken.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The operation does not apply to the current view.
    #[error("cannot {operation} from the {view} view")]
    WrongView {
        operation: &'static str,
        view: &'static str,
    },

    /// The peer actor has shut down.
    #[error("peer is no longer running")]
    Closed,
}
