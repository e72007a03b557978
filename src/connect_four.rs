//! Connect Four rules.
//!
//! States are immutable values: every transition clones the history and the
//! board and returns a new [`State`]. The tree key is derived from the move
//! history alone, so two move orders that reach the same board are different
//! states as far as the search tree is concerned.

use std::fmt;

use crate::board::Board;
use crate::constants::{N_COLS, RUN_LENGTH};
use crate::error::{GameError, Result};
use crate::game::{Game, Outcome, Player};

/// A placement, identified by the cell it fills.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Lookup key in the form `"row,col"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.row, self.col)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Tree key: the sequence of moves that produced a state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey(Vec<Move>);

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, mv) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{mv}")?;
        }
        write!(f, "]")
    }
}

/// A Connect Four position together with the moves that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    history: Vec<Move>,
    board: Board,
    player: Player,
}

impl State {
    /// Moves played so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The player to move.
    pub fn player(&self) -> Player {
        self.player
    }

    pub fn last_play(&self) -> Option<Move> {
        self.history.last().copied()
    }

    pub fn key(&self) -> StateKey {
        StateKey(self.history.clone())
    }
}

/// The Connect Four rule set.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConnectFour;

impl ConnectFour {
    pub fn new() -> Self {
        Self
    }

    /// The legal play dropping into `col` (0-based).
    ///
    /// # Errors
    /// [`GameError::IllegalMove`] if the column is full or out of range.
    pub fn play_for_column(&self, state: &State, col: usize) -> Result<Move> {
        state
            .board
            .drop_row(col)
            .map(|row| Move::new(row, col))
            .ok_or_else(|| GameError::IllegalMove {
                play: format!("column {}", col + 1),
            })
    }

    /// Drop a piece into `col` (0-based) for the player to move.
    pub fn play_column(&self, state: &State, col: usize) -> Result<State> {
        let play = self.play_for_column(state, col)?;
        self.next_state(state, &play)
    }

    /// The cells of the winning run, if the game has been won.
    pub fn winning_run(&self, state: &State) -> Option<[(usize, usize); RUN_LENGTH]> {
        state.board.find_run().map(|(_, run)| run)
    }
}

impl Game for ConnectFour {
    type State = State;
    type Play = Move;
    type Key = StateKey;

    fn start(&self) -> State {
        State {
            history: Vec::new(),
            board: Board::new(),
            player: Player::One,
        }
    }

    fn legal_plays(&self, state: &State) -> Vec<Move> {
        (0..N_COLS)
            .filter_map(|col| state.board.drop_row(col).map(|row| Move::new(row, col)))
            .collect()
    }

    fn next_state(&self, state: &State, play: &Move) -> Result<State> {
        if !self.legal_plays(state).contains(play) {
            return Err(GameError::IllegalMove {
                play: play.to_string(),
            });
        }

        let mut history = state.history.clone();
        history.push(*play);
        let mut board = state.board.clone();
        board.set(play.row, play.col, Some(state.player));

        Ok(State {
            history,
            board,
            player: state.player.opponent(),
        })
    }

    fn prev_state(&self, state: &State) -> Result<State> {
        let mut history = state.history.clone();
        let play = history.pop().ok_or(GameError::EmptyHistory)?;
        let mut board = state.board.clone();
        board.set(play.row, play.col, None);

        Ok(State {
            history,
            board,
            player: state.player.opponent(),
        })
    }

    fn winner(&self, state: &State) -> Outcome {
        if let Some((player, _)) = state.board.find_run() {
            Outcome::Win(player)
        } else if state.board.is_full() {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }

    fn player(&self, state: &State) -> Player {
        state.player
    }

    fn key(&self, state: &State) -> StateKey {
        state.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::N_ROWS;

    fn play_columns(game: &ConnectFour, cols: &[usize]) -> State {
        cols.iter().fold(game.start(), |state, &col| {
            game.play_column(&state, col).unwrap()
        })
    }

    #[test]
    fn test_start() {
        let game = ConnectFour::new();
        let state = game.start();
        assert!(state.history().is_empty());
        assert_eq!(state.board().count(), 0);
        assert_eq!(state.player(), Player::One);
        assert_eq!(game.winner(&state), Outcome::InProgress);
    }

    #[test]
    fn test_legal_plays_bottom_row_first() {
        let game = ConnectFour::new();
        let plays = game.legal_plays(&game.start());
        assert_eq!(plays.len(), N_COLS);
        for (col, play) in plays.iter().enumerate() {
            assert_eq!(*play, Move::new(N_ROWS - 1, col));
        }
    }

    #[test]
    fn test_next_state_does_not_mutate_input() {
        let game = ConnectFour::new();
        let start = game.start();
        let next = game.next_state(&start, &Move::new(5, 3)).unwrap();
        assert_eq!(start, game.start());
        assert_eq!(next.board().get(5, 3), Some(Player::One));
        assert_eq!(next.player(), Player::Two);
        assert_eq!(next.last_play(), Some(Move::new(5, 3)));
    }

    #[test]
    fn test_floating_move_is_illegal() {
        let game = ConnectFour::new();
        let err = game.next_state(&game.start(), &Move::new(2, 3)).unwrap_err();
        assert_eq!(
            err,
            GameError::IllegalMove {
                play: "2,3".to_string()
            }
        );
    }

    #[test]
    fn test_prev_state_on_start_fails() {
        let game = ConnectFour::new();
        assert_eq!(game.prev_state(&game.start()), Err(GameError::EmptyHistory));
    }

    #[test]
    fn test_move_key() {
        assert_eq!(Move::new(5, 0).key(), "5,0");
        assert_eq!(Move::new(0, 6).to_string(), "0,6");
    }

    #[test]
    fn test_state_key_display() {
        let game = ConnectFour::new();
        assert_eq!(game.key(&game.start()).to_string(), "[]");
        let state = play_columns(&game, &[3, 3]);
        assert_eq!(game.key(&state).to_string(), "[5,3;4,3]");
    }

    #[test]
    fn test_play_for_column_full() {
        let game = ConnectFour::new();
        let state = play_columns(&game, &[0; N_ROWS]);
        assert!(game.play_for_column(&state, 0).is_err());
        assert!(game.play_for_column(&state, N_COLS).is_err());
        assert_eq!(game.play_for_column(&state, 1).unwrap(), Move::new(5, 1));
    }
}
