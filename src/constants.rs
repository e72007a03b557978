//! Constants for board geometry and search parameters.
//!
//! Connect Four is played on a fixed grid, so unlike engines for games with
//! several standard sizes there is no feature switch here.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows on the board. Row 0 is the top row.
pub const N_ROWS: usize = 6;

/// Number of columns on the board.
pub const N_COLS: usize = 7;

/// Total number of cells, which is also the longest possible game.
pub const N_CELLS: usize = N_ROWS * N_COLS;

/// Length of a winning run.
pub const RUN_LENGTH: usize = 4;

/// Scan directions as (row delta, column delta).
/// Order: horizontal, vertical, down-right diagonal, down-left diagonal.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

// =============================================================================
// MCTS Parameters
// =============================================================================

/// UCB1 exploration constant (sqrt 2).
pub const UCB1_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Default wall-clock budget per machine move, in seconds.
pub const DEFAULT_BUDGET_SECS: f64 = 1.0;

/// Progress report period (number of iterations between trace events).
pub const REPORT_PERIOD: u64 = 10_000;
