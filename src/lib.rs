//! Connect Four with a Monte Carlo Tree Search (MCTS) engine.
//!
//! This crate provides a two-player game abstraction, a Connect Four
//! implementation of it, and an MCTS engine that keeps one search tree for a
//! whole game so that work done for one move is reused for later moves.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine parameters
//! - [`error`] - Error type shared by the game, engine and session
//! - [`config`] - Runtime search settings
//! - [`game`] - The `Game` trait, players and outcomes
//! - [`board`] - 6x7 grid and four-in-a-row detection
//! - [`connect_four`] - Connect Four rules, moves and states
//! - [`tree`] - Arena-allocated search tree
//! - [`mcts`] - Monte Carlo Tree Search with UCB1
//! - [`playout`] - Random game simulation
//! - [`reached`] - States that already received a search budget
//! - [`session`] - Human-versus-engine game flow with undo and reset
//! - [`protocol`] - Text protocol front end
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use connect_four_mcts::connect_four::ConnectFour;
//! use connect_four_mcts::game::Game;
//! use connect_four_mcts::mcts::{BestPlayPolicy, MonteCarlo};
//!
//! let game = ConnectFour::new();
//! let mut mcts = MonteCarlo::new(game);
//!
//! // Play a move
//! let state = game.play_column(&game.start(), 3).unwrap();
//!
//! // Run MCTS to find the best response
//! mcts.run_search(&state, Duration::from_millis(100)).unwrap();
//! let reply = mcts.best_play(&state, BestPlayPolicy::Robust).unwrap();
//! let state = game.next_state(&state, &reply).unwrap();
//! println!("{}", state.board());
//! ```

pub mod board;
pub mod config;
pub mod connect_four;
pub mod constants;
pub mod error;
pub mod game;
pub mod mcts;
pub mod playout;
pub mod protocol;
pub mod reached;
pub mod session;
pub mod tree;
