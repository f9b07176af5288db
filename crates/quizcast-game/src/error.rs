//! Error types for the game layer.

/// Errors returned by lobby and game operations.
///
/// Most of these are programmer errors (calling a player-only operation on
/// the host); the peer runtime logs them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Hosts never answer questions.
    #[error("hosts cannot answer questions")]
    HostCannotAnswer,

    /// Only the host drives question progression.
    #[error("only the host can advance questions")]
    NotHost,

    /// An option was selected while options were disabled (already
    /// answered, or the question has not arrived).
    #[error("options are disabled")]
    OptionsDisabled,

    /// The selected index is not one of the current question's options.
    #[error("no option at index {0}")]
    InvalidOption(usize),

    /// The game cannot start with an empty question bank.
    #[error("question bank is empty")]
    NoQuestions,

    /// The game cannot start without players.
    #[error("no players have joined")]
    NoPlayers,

    /// The game is over or the view was cleaned up.
    #[error("game is no longer running")]
    Finished,

    /// The question bank could not be parsed.
    #[error("invalid question bank: {0}")]
    InvalidBank(#[from] serde_json::Error),
}
