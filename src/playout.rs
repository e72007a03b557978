//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves until the game is decided,
//! then reports the outcome. The random source is passed in by the caller so
//! a seeded generator makes playouts reproducible.

use fastrand::Rng;

use crate::error::Result;
use crate::game::{Game, Outcome};

/// Play random legal moves from `state` until the game ends.
///
/// Returns the terminal outcome. A state that is already decided is returned
/// as is without consuming any randomness.
pub fn rollout<G: Game>(game: &G, state: &G::State, rng: &mut Rng) -> Result<Outcome> {
    let mut state = state.clone();
    let mut outcome = game.winner(&state);

    while !outcome.is_terminal() {
        let plays = game.legal_plays(&state);
        // A non-terminal state always has a legal play.
        let play = &plays[rng.usize(..plays.len())];
        state = game.next_state(&state, play)?;
        outcome = game.winner(&state);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_four::ConnectFour;
    use crate::game::Player;

    #[test]
    fn test_rollout_reaches_terminal() {
        let game = ConnectFour::new();
        let mut rng = Rng::with_seed(7);
        for _ in 0..50 {
            let outcome = rollout(&game, &game.start(), &mut rng).unwrap();
            assert!(outcome.is_terminal());
        }
    }

    #[test]
    fn test_rollout_is_reproducible_with_seed() {
        let game = ConnectFour::new();
        let mut a = Rng::with_seed(42);
        let mut b = Rng::with_seed(42);
        for _ in 0..20 {
            assert_eq!(
                rollout(&game, &game.start(), &mut a).unwrap(),
                rollout(&game, &game.start(), &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_rollout_from_decided_state() {
        let game = ConnectFour::new();
        let mut state = game.start();
        for col in [2, 3, 2, 3, 2, 3, 2] {
            state = game.play_column(&state, col).unwrap();
        }
        let mut rng = Rng::with_seed(1);
        let mut untouched = Rng::with_seed(1);
        assert_eq!(
            rollout(&game, &state, &mut rng).unwrap(),
            Outcome::Win(Player::One)
        );
        assert_eq!(rng.u64(..), untouched.u64(..));
    }
}
