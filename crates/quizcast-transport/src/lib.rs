//! Transport abstraction layer for quizcast.
//!
//! Provides the [`ProximityTransport`] trait over a proximity-style
//! network: sessions are advertised and discovered rather than dialled,
//! a host accepts join requests, and members exchange opaque byte
//! buffers either as a broadcast or to one participant.
//!
//! Inbound traffic never comes back from a method call. It arrives as
//! [`TransportEvent`]s on the unbounded channel handed out when the
//! endpoint is created, so the single state owner can `select!` on it.
//!
//! # Feature Flags
//!
//! - `local` (default): [`LocalNetwork`], an in-process network used by
//!   tests and the demo.

mod error;
#[cfg(feature = "local")]
mod local;
mod types;

pub use error::TransportError;
#[cfg(feature = "local")]
pub use local::{LocalNetwork, LocalTransport};
pub use types::{
    AccessStatus, Participant, ParticipantId, SessionCreation, SessionId, SessionInfo,
    SessionJoin, TransportEvent,
};

use std::future::Future;

/// One endpoint's view of the proximity network.
///
/// Every future is `Send` so a coordinator holding a transport can live
/// inside a spawned Tokio task.
pub trait ProximityTransport: Send + Sync + 'static {
    /// The local endpoint.
    fn local_participant(&self) -> &Participant;

    /// Asks the platform for permission to use the network.
    fn request_access(&self) -> impl Future<Output = AccessStatus> + Send;

    /// Creates and advertises a session named `name`, hosted by this
    /// endpoint.
    fn create_session(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<SessionCreation, TransportError>> + Send;

    /// Starts the session watcher. Sessions already advertised are
    /// reported as [`TransportEvent::SessionAdded`] right away.
    fn start_discovery(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Stops the session watcher. A no-op when not discovering.
    fn stop_discovery(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Joins `info` as `display_name`.
    ///
    /// On success the participant watcher reports every current member as
    /// [`TransportEvent::ParticipantAdded`], then
    /// [`TransportEvent::EnumerationCompleted`].
    fn join_session(
        &self,
        info: &SessionInfo,
        display_name: &str,
    ) -> impl Future<Output = Result<SessionJoin, TransportError>> + Send;

    /// (Host) admits a participant that raised
    /// [`TransportEvent::JoinRequested`].
    fn accept_join(
        &self,
        participant: &Participant,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Sends `data` to every other member of the current session.
    fn broadcast(&self, data: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Sends `data` to one participant.
    fn send_to(
        &self,
        data: &[u8],
        participant: &Participant,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Leaves the current session. When the host leaves, the session ends
    /// for everyone.
    fn leave_session(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_new_and_into_inner() {
        let id = ParticipantId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(ParticipantId::new(7).to_string(), "peer-7");
        assert_eq!(SessionId::new(3).to_string(), "session-3");
    }

    #[test]
    fn test_participant_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ParticipantId::new(1), "alice");
        map.insert(ParticipantId::new(2), "bob");
        assert_eq!(map[&ParticipantId::new(1)], "alice");
    }

    #[test]
    fn test_transport_event_kind() {
        assert_eq!(TransportEvent::EnumerationCompleted.kind(), "EnumerationCompleted");
        let ev = TransportEvent::Disconnected {
            reason: "gone".into(),
        };
        assert_eq!(ev.kind(), "Disconnected");
    }
}
