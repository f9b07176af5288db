use std::fmt;

/// Opaque identifier for one endpoint on the proximity network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(u64);

impl ParticipantId {
    /// Creates a new `ParticipantId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Opaque identifier for a hosted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A device taking part in a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
}

/// An advertised session, as seen by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionInfo {
    pub id: SessionId,
    /// The name the host gave the session, e.g. "Quiz1".
    pub display_name: String,
    /// Display name of the device that created it. The host is the
    /// participant whose display name matches this.
    pub controller_display_name: String,
}

/// Result of [`request_access`](crate::ProximityTransport::request_access).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    Allowed,
    Denied,
}

/// Result of [`create_session`](crate::ProximityTransport::create_session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCreation {
    Success(SessionInfo),
    SessionLimitsExceeded,
    Failed,
}

/// Result of [`join_session`](crate::ProximityTransport::join_session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionJoin {
    Success,
    Failed,
}

/// Everything the network can tell an endpoint without being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// (Host) a device asks to join the hosted session.
    JoinRequested(Participant),
    /// (Discovery) a session appeared.
    SessionAdded(SessionInfo),
    /// (Discovery) a session went away.
    SessionRemoved(SessionInfo),
    /// (Member) the participant watcher found a session member.
    ParticipantAdded(Participant),
    /// (Member) the participant watcher finished its initial enumeration.
    EnumerationCompleted,
    /// Bytes from another participant.
    MessageReceived { data: Vec<u8>, sender: Participant },
    /// The session dropped this endpoint.
    Disconnected { reason: String },
}

impl TransportEvent {
    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRequested(_) => "JoinRequested",
            Self::SessionAdded(_) => "SessionAdded",
            Self::SessionRemoved(_) => "SessionRemoved",
            Self::ParticipantAdded(_) => "ParticipantAdded",
            Self::EnumerationCompleted => "EnumerationCompleted",
            Self::MessageReceived { .. } => "MessageReceived",
            Self::Disconnected { .. } => "Disconnected",
        }
    }
}
