//! Error types for the session layer.

use quizcast_transport::TransportError;

/// Errors that can occur while managing a session.
///
/// None of these are fatal: the coordinator stays usable and the caller
/// decides whether to retry, navigate away, or ignore.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The platform refused access to the proximity network.
    #[error("access to the proximity network was denied")]
    AccessDenied,

    /// Too many sessions are already hosted nearby.
    #[error("session limits exceeded")]
    LimitsExceeded,

    /// The transport could not create the session.
    #[error("session creation failed")]
    CreateFailed,

    /// The transport could not join the session.
    #[error("failed to join session {0:?}")]
    JoinFailed(String),

    /// The participant watcher has not identified the host yet.
    /// Soft failure: retry once enumeration completes.
    #[error("host not yet known")]
    HostNotYetKnown,

    /// The host tried to send to itself.
    #[error("the host cannot send to the host")]
    IsHost,

    /// The operation needs an active session.
    #[error("no active session")]
    NoSession,

    /// A session is already active; end it first.
    #[error("a session is already active")]
    AlreadyActive,

    /// Another subscription is still live.
    #[error("already subscribed")]
    AlreadySubscribed,

    /// The transport reported an error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
