//! Events raised by the coordinator, and the subscription that carries
//! them.

use std::time::{SystemTime, UNIX_EPOCH};

use quizcast_transport::{Participant, SessionInfo};
use tokio::sync::mpsc;

/// A diagnostic line meant for the presentation's debug list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugMessage {
    pub message: String,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

impl DebugMessage {
    pub fn new(message: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            message: message.into(),
            timestamp,
        }
    }
}

/// Something the current view may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// (Host) a participant was admitted.
    ParticipantJoined(Participant),
    /// (Discovery) a session appeared.
    SessionFound(SessionInfo),
    /// (Discovery) a session went away. Keyed by controller name, which
    /// is ambiguous if two hosts share a display name.
    SessionRemoved {
        controller_display_name: String,
        info: SessionInfo,
    },
    /// Raw bytes from another participant.
    MessageReceived { data: Vec<u8>, sender: Participant },
    /// The session dropped us. The coordinator's state is left alone.
    Disconnected { reason: String },
    Debug(DebugMessage),
}

/// A live subscription to [`SessionEvent`]s.
///
/// At most one exists per coordinator. Dropping it (or calling
/// [`close`](Subscription::close)) releases the slot, so the next view
/// can subscribe.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        Self { rx }
    }

    /// Waits for the next event. `None` once the coordinator is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Returns an already-queued event without waiting.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }

    /// Unsubscribes. Same as dropping.
    pub fn close(self) {}
}
