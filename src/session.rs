//! A human-versus-engine game session.
//!
//! The session ties one game model, one engine and one reached set together
//! for the length of a game. The engine's tree is kept across every move and
//! undo, and is only thrown away on [`Session::reset`].

use std::time::Duration;

use fastrand::Rng;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::constants::DEFAULT_BUDGET_SECS;
use crate::error::{GameError, Result};
use crate::game::{Game, Outcome, Player};
use crate::mcts::{BestPlayPolicy, MonteCarlo, NodeStats, SearchBudget};
use crate::reached::ReachedSet;

pub struct Session<G: Game + Clone> {
    game: G,
    config: SearchConfig,
    /// Seeds a fresh engine on every reset
    rng: Rng,
    engine: MonteCarlo<G>,
    reached: ReachedSet<G::Key>,
    state: G::State,
    outcome: Outcome,
    /// Statistics of the last machine decision on display
    shown: Option<NodeStats<G::Play>>,
    human: Player,
    budget: SearchBudget,
    policy: BestPlayPolicy,
}

impl<G: Game + Clone> Session<G> {
    /// New session with the human playing first.
    pub fn new(game: G, config: SearchConfig, mut rng: Rng) -> Self {
        let engine_rng = Rng::with_seed(rng.u64(..));
        let engine = MonteCarlo::with_rng(game.clone(), config.clone(), engine_rng);
        let state = game.start();
        let outcome = game.winner(&state);
        Self {
            game,
            config,
            rng,
            engine,
            reached: ReachedSet::new(),
            state,
            outcome,
            shown: None,
            human: Player::One,
            budget: SearchBudget::Time(Duration::from_secs_f64(DEFAULT_BUDGET_SECS)),
            policy: BestPlayPolicy::Max,
        }
    }

    /// Search budget for every machine move.
    ///
    /// # Errors
    /// [`GameError::InvalidBudget`] if `budget` is zero.
    pub fn with_budget(mut self, budget: SearchBudget) -> Result<Self> {
        self.budget = budget.checked()?;
        Ok(self)
    }

    pub fn with_policy(mut self, policy: BestPlayPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_human(mut self, human: Player) -> Self {
        self.human = human;
        self
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn engine(&self) -> &MonteCarlo<G> {
        &self.engine
    }

    pub fn reached(&self) -> &ReachedSet<G::Key> {
        &self.reached
    }

    pub fn human(&self) -> Player {
        self.human
    }

    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    pub fn policy(&self) -> BestPlayPolicy {
        self.policy
    }

    /// Statistics currently on display, if any.
    pub fn shown_stats(&self) -> Option<&NodeStats<G::Play>> {
        self.shown.as_ref()
    }

    pub fn is_human_turn(&self) -> bool {
        self.game.player(&self.state) == self.human
    }

    /// Share of visits per expanded child of the displayed statistics.
    pub fn visit_shares(&self) -> Vec<(G::Play, f64)> {
        self.shown
            .as_ref()
            .map(NodeStats::visit_shares)
            .unwrap_or_default()
    }

    /// Apply the human's `play`.
    pub fn play(&mut self, play: &G::Play) -> Result<Outcome> {
        self.ensure_turn(self.human)?;
        self.advance(play)
    }

    /// Let the engine pick the human's move, then answer it.
    pub fn auto(&mut self) -> Result<Outcome> {
        self.ensure_turn(self.human)?;
        let play = self.machine_play()?;
        self.advance(&play)?;
        if !self.outcome.is_terminal() {
            self.respond()?;
        }
        Ok(self.outcome)
    }

    /// Let the engine play its own move. Returns the move played.
    pub fn respond(&mut self) -> Result<G::Play> {
        self.ensure_turn(self.human.opponent())?;
        let play = self.machine_play()?;
        self.advance(&play)?;
        Ok(play)
    }

    /// Take back two plies, returning to the human's previous decision.
    ///
    /// # Errors
    /// [`GameError::EmptyHistory`] if fewer than two plies have been played.
    pub fn undo(&mut self) -> Result<()> {
        let prev = self.game.prev_state(&self.state)?;
        let state = self.game.prev_state(&prev)?;

        // Show the decision that produced the restored state, if any.
        self.shown = self
            .game
            .prev_state(&state)
            .ok()
            .and_then(|before| self.engine.stats(&before).ok());
        self.outcome = self.game.winner(&state);
        self.state = state;
        info!(key = %self.game.key(&self.state), "undo");
        Ok(())
    }

    /// Start over with an empty tree and an empty reached set.
    pub fn reset(&mut self) {
        let engine_rng = Rng::with_seed(self.rng.u64(..));
        self.engine = MonteCarlo::with_rng(self.game.clone(), self.config.clone(), engine_rng);
        self.reached.clear();
        self.state = self.game.start();
        self.outcome = self.game.winner(&self.state);
        self.shown = None;
        info!("reset");
    }

    fn ensure_turn(&self, player: Player) -> Result<()> {
        if self.outcome.is_terminal() {
            return Err(GameError::GameOver);
        }
        if self.game.player(&self.state) != player {
            return Err(GameError::OutOfTurn(player.to_string()));
        }
        Ok(())
    }

    /// Search the current state unless it was searched before, then pick a
    /// move by the session policy.
    ///
    /// A state only counts as reached once a move could be picked from it.
    fn machine_play(&mut self) -> Result<G::Play> {
        let key = self.game.key(&self.state);
        let searched = if self.reached.contains(&key) {
            debug!(%key, "state already searched");
            false
        } else {
            let report = self.engine.run(&self.state, self.budget)?;
            debug!(%key, iterations = report.iterations, "searched");
            true
        };
        self.shown = Some(self.engine.stats(&self.state)?);
        let play = self.engine.best_play(&self.state, self.policy)?;
        if searched {
            self.reached.insert(key);
        }
        Ok(play)
    }

    fn advance(&mut self, play: &G::Play) -> Result<Outcome> {
        let player = self.game.player(&self.state);
        self.state = self.game.next_state(&self.state, play)?;
        self.outcome = self.game.winner(&self.state);
        info!(%player, %play, outcome = %self.outcome, "move");
        Ok(self.outcome)
    }
}
