use thiserror::Error;

/// Errors reported by the game model, the search engine and the session.
///
/// Every variant is a precondition violation raised synchronously to the
/// caller. Nothing is retried or corrected internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move: {play} is not playable")]
    IllegalMove { play: String },

    #[error("no move to take back")]
    EmptyHistory,

    #[error("no search statistics for state {key}")]
    NoStatistics { key: String },

    #[error("the game is already decided")]
    GameOver,

    #[error("it is not {0}'s turn")]
    OutOfTurn(String),

    #[error("invalid search budget: {0}")]
    InvalidBudget(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
