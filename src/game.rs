//! Two-player, alternating-turn game abstraction.
//!
//! The search engine only sees games through the [`Game`] trait. It never
//! inspects plays or states itself: it enumerates plays, applies them, asks
//! who is to move and whether the game is over, and keys its tree by
//! [`Game::key`].

use std::fmt;
use std::hash::Hash;

use crate::error::Result;

/// One of the two players. `One` always moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player one"),
            Player::Two => write!(f, "player two"),
        }
    }
}

/// Result of inspecting a state for a winner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win(Player),
    Draw,
    InProgress,
}

impl Outcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    /// The winning player, if there is one.
    #[inline]
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(p) => write!(f, "{p} wins"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::InProgress => write!(f, "in progress"),
        }
    }
}

/// Rules of a two-player, perfect-information game on a finite board.
///
/// Implementations are expected to be pure: transitions return new states
/// and never mutate their input.
pub trait Game {
    /// Immutable game state.
    type State: Clone + fmt::Debug;

    /// A single move. Compared for equality when looking up legal plays.
    type Play: Clone + PartialEq + fmt::Debug + fmt::Display;

    /// Key identifying a state in the search tree.
    type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// The initial state.
    fn start(&self) -> Self::State;

    /// Legal plays for the player to move, in a stable order.
    /// Empty once the board is full.
    fn legal_plays(&self, state: &Self::State) -> Vec<Self::Play>;

    /// Apply `play` to `state`.
    ///
    /// # Errors
    /// [`GameError::IllegalMove`](crate::error::GameError::IllegalMove) if
    /// `play` is not in `legal_plays(state)`.
    fn next_state(&self, state: &Self::State, play: &Self::Play) -> Result<Self::State>;

    /// Undo the last play of `state`.
    ///
    /// # Errors
    /// [`GameError::EmptyHistory`](crate::error::GameError::EmptyHistory) on
    /// the initial state.
    fn prev_state(&self, state: &Self::State) -> Result<Self::State>;

    /// Whether the game is won, drawn or still going.
    fn winner(&self, state: &Self::State) -> Outcome;

    /// The player to move.
    fn player(&self, state: &Self::State) -> Player;

    /// Tree key for `state`.
    fn key(&self, state: &Self::State) -> Self::Key;
}
