//! The session coordinator: one session's lifecycle and roster.
//!
//! # Lifecycle
//!
//! ```text
//!         discover_sessions()            join_session()
//! Idle ─────────────────────→ Discovering ─────────────→ Joining ──→ Active
//!   │                                                                   │
//!   └── create_session() ──→ Hosting ──────────────────────────────────→┤
//!                                                                       ▼
//!                                                  end_session() ──→ Ended
//! ```
//!
//! The coordinator never spawns anything. Its owner feeds it every
//! [`TransportEvent`] through [`handle_transport_event`], and it turns them
//! into [`SessionEvent`]s for whoever holds the [`Subscription`].
//!
//! [`handle_transport_event`]: SessionCoordinator::handle_transport_event

use quizcast_transport::{
    AccessStatus, Participant, ProximityTransport, SessionCreation, SessionInfo, SessionJoin,
    TransportEvent,
};
use tokio::sync::mpsc;

use crate::{DebugMessage, SessionError, SessionEvent, Subscription};

/// Where the coordinator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Discovering,
    Hosting,
    Joining,
    Active,
    Ended,
}

/// Owns the current session for one device.
pub struct SessionCoordinator<T> {
    transport: T,
    state: SessionState,
    session: Option<SessionInfo>,
    is_host: bool,
    discovering: bool,
    /// Everyone we know to be in the session, excluding ourselves.
    participants: Vec<Participant>,
    host: Option<Participant>,
    enumeration_completed: bool,
    subscriber: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<T: ProximityTransport> SessionCoordinator<T> {
    /// Creates an idle coordinator over `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Idle,
            session: None,
            is_host: false,
            discovering: false,
            participants: Vec::new(),
            host: None,
            enumeration_completed: false,
            subscriber: None,
        }
    }

    // -----------------------------------------------------------------------
    // Subscription
    // -----------------------------------------------------------------------

    /// Opens the single event subscription.
    ///
    /// # Errors
    /// [`SessionError::AlreadySubscribed`] while a previous subscription is
    /// still alive.
    pub fn subscribe(&mut self) -> Result<Subscription, SessionError> {
        if self.subscriber.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(SessionError::AlreadySubscribed);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriber = Some(tx);
        Ok(Subscription::new(rx))
    }

    /// Whether a live subscription exists.
    pub fn has_subscriber(&self) -> bool {
        self.subscriber.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn emit(&mut self, event: SessionEvent) {
        let delivered = match &self.subscriber {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        };
        if !delivered {
            self.subscriber = None;
            tracing::trace!("session event dropped, no subscriber");
        }
    }

    fn debug(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "session debug");
        self.emit(SessionEvent::Debug(DebugMessage::new(message)));
    }

    async fn ensure_access(&mut self) -> Result<(), SessionError> {
        match self.transport.request_access().await {
            AccessStatus::Allowed => Ok(()),
            AccessStatus::Denied => {
                self.debug("access denied");
                Err(SessionError::AccessDenied)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Creates and hosts a session called `name`.
    ///
    /// Every later join request is accepted unconditionally.
    ///
    /// # Errors
    /// [`AccessDenied`](SessionError::AccessDenied),
    /// [`LimitsExceeded`](SessionError::LimitsExceeded),
    /// [`CreateFailed`](SessionError::CreateFailed) or a transport error.
    /// On error the coordinator is back where it started.
    pub async fn create_session(&mut self, name: &str) -> Result<SessionInfo, SessionError> {
        if self.state == SessionState::Active {
            return Err(SessionError::AlreadyActive);
        }
        self.ensure_access().await?;

        let previous = self.state;
        self.state = SessionState::Hosting;

        let outcome = match self.transport.create_session(name).await {
            Ok(SessionCreation::Success(info)) => Ok(info),
            Ok(SessionCreation::SessionLimitsExceeded) => Err(SessionError::LimitsExceeded),
            Ok(SessionCreation::Failed) => Err(SessionError::CreateFailed),
            Err(e) => Err(SessionError::Transport(e)),
        };

        match outcome {
            Ok(info) => {
                self.reset_roster();
                self.is_host = true;
                self.host = Some(self.transport.local_participant().clone());
                self.enumeration_completed = true;
                self.session = Some(info.clone());
                self.state = SessionState::Active;
                tracing::info!(session = %info.display_name, id = %info.id, "hosting session");
                Ok(info)
            }
            Err(e) => {
                self.state = previous;
                self.debug(format!("create session failed: {e}"));
                Err(e)
            }
        }
    }

    /// Starts watching for advertised sessions.
    pub async fn discover_sessions(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Active {
            return Err(SessionError::AlreadyActive);
        }
        self.ensure_access().await?;

        self.transport.start_discovery().await?;
        self.discovering = true;
        self.state = SessionState::Discovering;
        tracing::info!("discovering sessions");
        Ok(())
    }

    /// Stops the session watcher. Safe to call when not discovering.
    pub async fn stop_discovery(&mut self) -> Result<(), SessionError> {
        if !self.discovering {
            return Ok(());
        }
        self.transport.stop_discovery().await?;
        self.discovering = false;
        if self.state == SessionState::Discovering {
            self.state = SessionState::Idle;
        }
        tracing::debug!("discovery stopped");
        Ok(())
    }

    /// Joins `info` as `display_name`.
    ///
    /// On success the session is active, but the host is only known once
    /// the participant watcher has finished enumerating.
    pub async fn join_session(
        &mut self,
        info: &SessionInfo,
        display_name: &str,
    ) -> Result<(), SessionError> {
        if self.state == SessionState::Active {
            return Err(SessionError::AlreadyActive);
        }

        let previous = self.state;
        self.state = SessionState::Joining;
        self.reset_roster();
        self.session = Some(info.clone());

        let outcome = match self.transport.join_session(info, display_name).await {
            Ok(SessionJoin::Success) => Ok(()),
            Ok(SessionJoin::Failed) => Err(SessionError::JoinFailed(info.display_name.clone())),
            Err(e) => Err(SessionError::Transport(e)),
        };

        match outcome {
            Ok(()) => {
                self.is_host = false;
                self.state = SessionState::Active;
                tracing::info!(session = %info.display_name, name = display_name, "joined session");
                Ok(())
            }
            Err(e) => {
                self.session = None;
                self.state = previous;
                self.debug(format!("join failed: {e}"));
                Err(e)
            }
        }
    }

    /// Leaves the session and stops discovery. Idempotent.
    ///
    /// Transport failures are logged, not returned: the local side is
    /// torn down regardless.
    pub async fn end_session(&mut self) {
        if self.state == SessionState::Ended && self.session.is_none() && !self.discovering {
            return;
        }

        if self.session.is_some() {
            if let Err(e) = self.transport.leave_session().await {
                tracing::warn!(error = %e, "leave_session failed");
            }
        }
        if self.discovering {
            if let Err(e) = self.transport.stop_discovery().await {
                tracing::warn!(error = %e, "stop_discovery failed");
            }
            self.discovering = false;
        }

        if let Some(info) = self.session.take() {
            tracing::info!(session = %info.display_name, "session ended");
        }
        self.reset_roster();
        self.is_host = false;
        self.state = SessionState::Ended;
    }

    fn reset_roster(&mut self) {
        self.participants.clear();
        self.host = None;
        self.enumeration_completed = false;
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Applies one event from the transport.
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        tracing::trace!(kind = event.kind(), "transport event");

        match event {
            TransportEvent::JoinRequested(participant) => {
                if !(self.is_host && self.state == SessionState::Active) {
                    tracing::warn!(name = %participant.display_name, "join request while not hosting");
                    return;
                }
                if let Err(e) = self.transport.accept_join(&participant).await {
                    tracing::warn!(name = %participant.display_name, error = %e, "accept_join failed");
                    return;
                }
                tracing::info!(id = %participant.id, name = %participant.display_name, "participant joined");
                self.add_participant(participant.clone());
                self.emit(SessionEvent::ParticipantJoined(participant));
            }
            TransportEvent::SessionAdded(info) => {
                tracing::debug!(session = %info.display_name, "session found");
                self.emit(SessionEvent::SessionFound(info));
            }
            TransportEvent::SessionRemoved(info) => {
                tracing::debug!(session = %info.display_name, "session removed");
                self.emit(SessionEvent::SessionRemoved {
                    controller_display_name: info.controller_display_name.clone(),
                    info,
                });
            }
            TransportEvent::ParticipantAdded(participant) => {
                let is_host = self
                    .session
                    .as_ref()
                    .is_some_and(|s| s.controller_display_name == participant.display_name);
                if is_host && self.host.is_none() {
                    self.debug(format!("host found: {}", participant.display_name));
                    self.host = Some(participant.clone());
                }
                self.add_participant(participant);
            }
            TransportEvent::EnumerationCompleted => {
                self.enumeration_completed = true;
                if self.host.is_none() {
                    self.debug("host not found");
                }
            }
            TransportEvent::MessageReceived { data, sender } => {
                self.emit(SessionEvent::MessageReceived { data, sender });
            }
            TransportEvent::Disconnected { reason } => {
                tracing::info!(%reason, "disconnected from session");
                self.emit(SessionEvent::Disconnected { reason });
            }
        }
    }

    fn add_participant(&mut self, participant: Participant) {
        if !self.participants.iter().any(|p| p.id == participant.id) {
            self.participants.push(participant);
        }
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Sends `data` to every other member.
    pub async fn broadcast(&self, data: &[u8]) -> Result<(), SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::NoSession);
        }
        self.transport.broadcast(data).await?;
        Ok(())
    }

    /// Sends `data` to the host.
    ///
    /// # Errors
    /// [`HostNotYetKnown`](SessionError::HostNotYetKnown) until the
    /// participant watcher has found the host.
    pub async fn send_to_host(&self, data: &[u8]) -> Result<(), SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::NoSession);
        }
        if self.is_host {
            return Err(SessionError::IsHost);
        }
        let host = match (&self.host, self.enumeration_completed) {
            (Some(host), true) => host,
            _ => return Err(SessionError::HostNotYetKnown),
        };
        self.transport.send_to(data, host).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    /// Known members other than ourselves.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The host, once identified. On the host this is the local endpoint.
    pub fn host(&self) -> Option<&Participant> {
        self.host.as_ref()
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Whether [`send_to_host`](Self::send_to_host) can succeed: the host
    /// is identified and enumeration has finished.
    pub fn host_known(&self) -> bool {
        self.host.is_some() && self.enumeration_completed
    }

    pub fn is_discovering(&self) -> bool {
        self.discovering
    }

    /// The local endpoint.
    pub fn local_participant(&self) -> &Participant {
        self.transport.local_participant()
    }
}
