//! Session management for quizcast.
//!
//! This crate owns the lifecycle of one proximity session:
//!
//! 1. **Hosting or joining**: create, discover, join, end
//!    ([`SessionCoordinator`]).
//! 2. **Roster**: who is in the session, and which of them is the host.
//! 3. **Events**: turning raw [`TransportEvent`]s into [`SessionEvent`]s
//!    for the single live [`Subscription`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Game layer (above)     ← decodes MessageReceived, reacts to roster changes
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Transport layer (below) ← ProximityTransport, TransportEvent
//! ```
//!
//! [`TransportEvent`]: quizcast_transport::TransportEvent

mod coordinator;
mod error;
mod event;

pub use coordinator::{SessionCoordinator, SessionState};
pub use error::SessionError;
pub use event::{DebugMessage, SessionEvent, Subscription};
