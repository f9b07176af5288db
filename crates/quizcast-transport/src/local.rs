//! In-process proximity network.
//!
//! [`LocalNetwork`] is a shared registry of endpoints and sessions. Every
//! endpoint gets an unbounded event channel; "sending" a message is pushing
//! a [`TransportEvent`] into the recipient's channel. Ordering per
//! sender/recipient pair is therefore FIFO, which is stronger than a real
//! radio link but enough to exercise every handshake.
//!
//! Test controls: [`deny_access`](LocalNetwork::deny_access),
//! [`set_session_limit`](LocalNetwork::set_session_limit) and
//! [`sever`](LocalNetwork::sever).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{
    AccessStatus, Participant, ParticipantId, ProximityTransport, SessionCreation, SessionId,
    SessionInfo, SessionJoin, TransportError, TransportEvent,
};

struct EndpointEntry {
    participant: Participant,
    events: mpsc::UnboundedSender<TransportEvent>,
    discovering: bool,
    session: Option<SessionId>,
}

struct SessionEntry {
    info: SessionInfo,
    host: ParticipantId,
    /// Accepted members, host excluded.
    members: Vec<ParticipantId>,
    /// Asked to join, not yet accepted by the host.
    pending: Vec<ParticipantId>,
}

impl SessionEntry {
    fn everyone(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        std::iter::once(self.host)
            .chain(self.members.iter().copied())
            .chain(self.pending.iter().copied())
    }

    fn contains(&self, id: ParticipantId) -> bool {
        self.everyone().any(|p| p == id)
    }
}

#[derive(Default)]
struct NetworkState {
    next_id: u64,
    endpoints: HashMap<ParticipantId, EndpointEntry>,
    sessions: HashMap<SessionId, SessionEntry>,
    denied: HashSet<String>,
    session_limit: Option<usize>,
}

impl NetworkState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Pushes an event to an endpoint. Returns `false` if the endpoint is
    /// gone or its receiver was dropped.
    fn deliver(&self, to: ParticipantId, event: TransportEvent) -> bool {
        match self.endpoints.get(&to) {
            Some(entry) => entry.events.send(event).is_ok(),
            None => false,
        }
    }

    fn participant(&self, id: ParticipantId) -> Option<Participant> {
        self.endpoints.get(&id).map(|e| e.participant.clone())
    }

    fn notify_discoverers(&self, event: &TransportEvent) {
        for entry in self.endpoints.values().filter(|e| e.discovering) {
            let _ = entry.events.send(event.clone());
        }
    }

    /// Tears a session down: members get `Disconnected`, discoverers get
    /// `SessionRemoved`.
    fn end_session(&mut self, session_id: SessionId, reason: &str) {
        let Some(session) = self.sessions.remove(&session_id) else {
            return;
        };
        let host = session.host;
        for id in session.everyone().collect::<Vec<_>>() {
            if let Some(entry) = self.endpoints.get_mut(&id) {
                entry.session = None;
            }
            if id != host {
                self.deliver(
                    id,
                    TransportEvent::Disconnected {
                        reason: reason.to_string(),
                    },
                );
            }
        }
        self.notify_discoverers(&TransportEvent::SessionRemoved(session.info));
        tracing::debug!(session = %session_id, reason, "local session ended");
    }

    /// Removes a non-host participant from whatever session it is in.
    fn detach(&mut self, id: ParticipantId) {
        let Some(session_id) = self.endpoints.get(&id).and_then(|e| e.session) else {
            return;
        };
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.members.retain(|m| *m != id);
            session.pending.retain(|m| *m != id);
        }
        if let Some(entry) = self.endpoints.get_mut(&id) {
            entry.session = None;
        }
    }
}

// ---------------------------------------------------------------------------
// LocalNetwork
// ---------------------------------------------------------------------------

/// A shared in-process network. Cheap to clone; all clones see the same
/// endpoints and sessions.
#[derive(Clone, Default)]
pub struct LocalNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl LocalNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new endpoint called `display_name`.
    ///
    /// Returns the transport handle plus the receiver on which every
    /// inbound [`TransportEvent`] for that endpoint arrives.
    pub async fn endpoint(
        &self,
        display_name: impl Into<String>,
    ) -> (LocalTransport, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().await;
        let id = ParticipantId::new(state.next_id());
        let participant = Participant {
            id,
            display_name: display_name.into(),
        };
        state.endpoints.insert(
            id,
            EndpointEntry {
                participant: participant.clone(),
                events: tx,
                discovering: false,
                session: None,
            },
        );
        tracing::debug!(%id, name = %participant.display_name, "local endpoint registered");

        (
            LocalTransport {
                network: self.clone(),
                me: participant,
            },
            rx,
        )
    }

    /// Makes `request_access` return `Denied` for endpoints with this
    /// display name.
    pub async fn deny_access(&self, display_name: impl Into<String>) {
        self.state.lock().await.denied.insert(display_name.into());
    }

    /// Caps the number of concurrently hosted sessions. `None` lifts the cap.
    pub async fn set_session_limit(&self, limit: Option<usize>) {
        self.state.lock().await.session_limit = limit;
    }

    /// Drops `participant` from its session as if the link failed.
    ///
    /// A severed host ends the whole session; a severed member alone
    /// receives `Disconnected`.
    pub async fn sever(&self, participant: ParticipantId) {
        let mut state = self.state.lock().await;
        let Some(session_id) = state.endpoints.get(&participant).and_then(|e| e.session) else {
            return;
        };
        let is_host = state
            .sessions
            .get(&session_id)
            .is_some_and(|s| s.host == participant);

        if is_host {
            state.end_session(session_id, "host unreachable");
            state.deliver(
                participant,
                TransportEvent::Disconnected {
                    reason: "connection lost".into(),
                },
            );
        } else {
            state.detach(participant);
            state.deliver(
                participant,
                TransportEvent::Disconnected {
                    reason: "connection lost".into(),
                },
            );
        }
        tracing::debug!(%participant, "local link severed");
    }

    /// Sessions currently advertised.
    pub async fn sessions(&self) -> Vec<SessionInfo> {
        let state = self.state.lock().await;
        let mut sessions: Vec<_> = state.sessions.values().map(|s| s.info.clone()).collect();
        sessions.sort_by_key(|s| s.id);
        sessions
    }
}

// ---------------------------------------------------------------------------
// LocalTransport
// ---------------------------------------------------------------------------

/// One endpoint on a [`LocalNetwork`].
#[derive(Clone)]
pub struct LocalTransport {
    network: LocalNetwork,
    me: Participant,
}

impl LocalTransport {
    fn id(&self) -> ParticipantId {
        self.me.id
    }
}

impl ProximityTransport for LocalTransport {
    fn local_participant(&self) -> &Participant {
        &self.me
    }

    async fn request_access(&self) -> AccessStatus {
        let state = self.network.state.lock().await;
        if state.denied.contains(&self.me.display_name) {
            AccessStatus::Denied
        } else {
            AccessStatus::Allowed
        }
    }

    async fn create_session(&self, name: &str) -> Result<SessionCreation, TransportError> {
        let mut state = self.network.state.lock().await;

        if let Some(existing) = state.endpoints.get(&self.id()).and_then(|e| e.session) {
            return Err(TransportError::AlreadyInSession(existing));
        }
        if state
            .session_limit
            .is_some_and(|limit| state.sessions.len() >= limit)
        {
            return Ok(SessionCreation::SessionLimitsExceeded);
        }

        let id = SessionId::new(state.next_id());
        let info = SessionInfo {
            id,
            display_name: name.to_string(),
            controller_display_name: self.me.display_name.clone(),
        };
        state.sessions.insert(
            id,
            SessionEntry {
                info: info.clone(),
                host: self.id(),
                members: Vec::new(),
                pending: Vec::new(),
            },
        );
        if let Some(entry) = state.endpoints.get_mut(&self.id()) {
            entry.session = Some(id);
        }
        state.notify_discoverers(&TransportEvent::SessionAdded(info.clone()));

        tracing::debug!(session = %id, name, "local session created");
        Ok(SessionCreation::Success(info))
    }

    async fn start_discovery(&self) -> Result<(), TransportError> {
        let mut state = self.network.state.lock().await;
        let mut existing: Vec<_> = state.sessions.values().map(|s| s.info.clone()).collect();
        existing.sort_by_key(|s| s.id);

        let entry = state
            .endpoints
            .get_mut(&self.id())
            .ok_or(TransportError::UnknownParticipant(self.id()))?;
        entry.discovering = true;
        for info in existing {
            let _ = entry.events.send(TransportEvent::SessionAdded(info));
        }
        Ok(())
    }

    async fn stop_discovery(&self) -> Result<(), TransportError> {
        let mut state = self.network.state.lock().await;
        if let Some(entry) = state.endpoints.get_mut(&self.id()) {
            entry.discovering = false;
        }
        Ok(())
    }

    async fn join_session(
        &self,
        info: &SessionInfo,
        display_name: &str,
    ) -> Result<SessionJoin, TransportError> {
        let mut state = self.network.state.lock().await;

        if let Some(existing) = state.endpoints.get(&self.id()).and_then(|e| e.session) {
            return Err(TransportError::AlreadyInSession(existing));
        }
        let Some(session) = state.sessions.get_mut(&info.id) else {
            return Ok(SessionJoin::Failed);
        };
        session.pending.push(self.id());
        let host = session.host;
        let roster: Vec<ParticipantId> = std::iter::once(host)
            .chain(session.members.iter().copied())
            .collect();

        if let Some(entry) = state.endpoints.get_mut(&self.id()) {
            entry.session = Some(info.id);
        }

        let requester = Participant {
            id: self.id(),
            display_name: display_name.to_string(),
        };
        state.deliver(host, TransportEvent::JoinRequested(requester));

        // Participant watcher: everyone already there, then done.
        for id in roster {
            if let Some(p) = state.participant(id) {
                state.deliver(self.id(), TransportEvent::ParticipantAdded(p));
            }
        }
        state.deliver(self.id(), TransportEvent::EnumerationCompleted);

        tracing::debug!(session = %info.id, name = display_name, "local join requested");
        Ok(SessionJoin::Success)
    }

    async fn accept_join(&self, participant: &Participant) -> Result<(), TransportError> {
        let mut state = self.network.state.lock().await;
        let session_id = state
            .endpoints
            .get(&self.id())
            .and_then(|e| e.session)
            .ok_or(TransportError::NotInSession)?;
        let session = state
            .sessions
            .get_mut(&session_id)
            .ok_or(TransportError::UnknownSession(session_id))?;

        let Some(pos) = session.pending.iter().position(|p| *p == participant.id) else {
            return Err(TransportError::UnknownParticipant(participant.id));
        };
        session.pending.remove(pos);
        let existing = session.members.clone();
        session.members.push(participant.id);

        // Existing members' watchers see the newcomer.
        for id in existing {
            state.deliver(id, TransportEvent::ParticipantAdded(participant.clone()));
        }
        Ok(())
    }

    async fn broadcast(&self, data: &[u8]) -> Result<(), TransportError> {
        let state = self.network.state.lock().await;
        let session_id = state
            .endpoints
            .get(&self.id())
            .and_then(|e| e.session)
            .ok_or(TransportError::NotInSession)?;
        let session = state
            .sessions
            .get(&session_id)
            .ok_or(TransportError::UnknownSession(session_id))?;

        let recipients: Vec<_> = std::iter::once(session.host)
            .chain(session.members.iter().copied())
            .filter(|id| *id != self.id())
            .collect();
        for id in recipients {
            state.deliver(
                id,
                TransportEvent::MessageReceived {
                    data: data.to_vec(),
                    sender: self.me.clone(),
                },
            );
        }
        Ok(())
    }

    async fn send_to(&self, data: &[u8], participant: &Participant) -> Result<(), TransportError> {
        let state = self.network.state.lock().await;
        let session_id = state
            .endpoints
            .get(&self.id())
            .and_then(|e| e.session)
            .ok_or(TransportError::NotInSession)?;
        let session = state
            .sessions
            .get(&session_id)
            .ok_or(TransportError::UnknownSession(session_id))?;
        if !session.contains(participant.id) {
            return Err(TransportError::UnknownParticipant(participant.id));
        }

        let delivered = state.deliver(
            participant.id,
            TransportEvent::MessageReceived {
                data: data.to_vec(),
                sender: self.me.clone(),
            },
        );
        if delivered {
            Ok(())
        } else {
            Err(TransportError::ConnectionClosed(participant.display_name.clone()))
        }
    }

    async fn leave_session(&self) -> Result<(), TransportError> {
        let mut state = self.network.state.lock().await;
        let Some(session_id) = state.endpoints.get(&self.id()).and_then(|e| e.session) else {
            return Ok(());
        };
        let is_host = state
            .sessions
            .get(&session_id)
            .is_some_and(|s| s.host == self.id());

        if is_host {
            state.end_session(session_id, "session ended by host");
        } else {
            state.detach(self.id());
        }
        Ok(())
    }
}
