//! Wire protocol for quizcast.
//!
//! Defines what host and players say to each other:
//!
//! - **Types** ([`Scorecard`], [`Question`], [`PlayerId`], ...) shared by
//!   both sides.
//! - **Messages** ([`HostMessage`], [`PlayerMessage`]), the two message
//!   families.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) for bytes in and out.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about sessions or game rules:
//!
//! ```text
//! Session (bytes) → Protocol (HostMessage / PlayerMessage) → Game
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{HostMessage, HostPayload, PlayerMessage, PlayerPayload, now_millis};
pub use types::{AnswerOption, AnswerStatus, PlayerId, Question, QuestionId, Scorecard};
