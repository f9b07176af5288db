use crate::{ParticipantId, SessionId};

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The operation needs a session but this endpoint is not in one.
    #[error("not in a session")]
    NotInSession,

    /// The endpoint is already hosting or a member of a session.
    #[error("already in session {0}")]
    AlreadyInSession(SessionId),

    /// No endpoint with this id is reachable in the current session.
    #[error("unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    /// The session no longer exists.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// The peer's inbound event stream was dropped.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
