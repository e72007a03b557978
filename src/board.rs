//! Fixed 6x7 grid of cells.
//!
//! Row 0 is the top of the board; pieces fall towards row `N_ROWS - 1`.

use std::fmt;

use crate::constants::{DIRECTIONS, N_COLS, N_ROWS, RUN_LENGTH};
use crate::game::Player;

/// A cell is either empty or holds one player's piece.
pub type Cell = Option<Player>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [[Cell; N_COLS]; N_ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell contents, or `None` for an empty or out-of-range cell.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        if row >= N_ROWS || col >= N_COLS {
            return None;
        }
        self.cells[row][col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// Lowest empty row of `col`, or `None` if the column is full.
    pub fn drop_row(&self, col: usize) -> Option<usize> {
        if col >= N_COLS {
            return None;
        }
        (0..N_ROWS).rev().find(|&row| self.cells[row][col].is_none())
    }

    /// Whether every cell is occupied. Only the top row needs checking
    /// since pieces stack from the bottom.
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(Option::is_some)
    }

    /// Number of occupied cells.
    pub fn count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Find a run of four same-player cells.
    ///
    /// Scans cells in row-major order, and for each occupied cell checks the
    /// four directions in [`DIRECTIONS`] order. Returns the owner and the
    /// cells of the first run found.
    pub fn find_run(&self) -> Option<(Player, [(usize, usize); RUN_LENGTH])> {
        for row in 0..N_ROWS {
            for col in 0..N_COLS {
                let Some(player) = self.cells[row][col] else {
                    continue;
                };
                for &(dr, dc) in &DIRECTIONS {
                    if let Some(run) = self.run_from(row, col, dr, dc, player) {
                        return Some((player, run));
                    }
                }
            }
        }
        None
    }

    /// The `RUN_LENGTH` cells starting at (row, col) along (dr, dc), if all
    /// of them belong to `player`.
    fn run_from(
        &self,
        row: usize,
        col: usize,
        dr: isize,
        dc: isize,
        player: Player,
    ) -> Option<[(usize, usize); RUN_LENGTH]> {
        let mut run = [(0, 0); RUN_LENGTH];
        for (step, slot) in run.iter_mut().enumerate() {
            let r = row as isize + dr * step as isize;
            let c = col as isize + dc * step as isize;
            if r < 0 || c < 0 || r >= N_ROWS as isize || c >= N_COLS as isize {
                return None;
            }
            let (r, c) = (r as usize, c as usize);
            if self.cells[r][c] != Some(player) {
                return None;
            }
            *slot = (r, c);
        }
        Some(run)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                let ch = match cell {
                    Some(Player::One) => 'X',
                    Some(Player::Two) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        for col in 1..=N_COLS {
            write!(f, "{col} ")?;
        }
        writeln!(f)
    }
}
