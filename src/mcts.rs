//! Monte Carlo Tree Search (MCTS) with UCB1 selection and random playouts.
//!
//! Each iteration runs four phases against the game model:
//! - Selection: descend through fully expanded nodes by UCB1
//! - Expansion: add one untried child, chosen uniformly at random
//! - Simulation: random playout to the end of the game
//! - Backpropagation: update visits and wins along the parent chain
//!
//! The engine keeps a single tree for its whole lifetime. A search rooted at
//! a state the tree has already seen continues from the existing node, and
//! backpropagation follows parent links all the way to the top of the tree,
//! so statistics gathered while answering one move stay available for later
//! moves by either player. Ancestors keep absorbing the visits of every
//! search below them, which makes their aggregate counts look inflated after
//! an undo; this is the intended reuse behaviour.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use fastrand::Rng;
use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::error::{GameError, Result};
use crate::game::{Game, Outcome};
use crate::playout::rollout;
use crate::tree::{Node, NodeId, SearchTree};

/// Rule for reporting the final move once a search is done.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BestPlayPolicy {
    /// Highest win rate; ties go to the first child in play order.
    #[default]
    Max,
    /// Most visits; ties go to the higher win rate, then play order.
    Robust,
}

impl FromStr for BestPlayPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max" => Ok(BestPlayPolicy::Max),
            "robust" => Ok(BestPlayPolicy::Robust),
            other => Err(format!("unknown policy '{other}', expected 'max' or 'robust'")),
        }
    }
}

impl fmt::Display for BestPlayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BestPlayPolicy::Max => write!(f, "max"),
            BestPlayPolicy::Robust => write!(f, "robust"),
        }
    }
}

/// Statistics of one expanded child.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildStats<P> {
    pub play: P,
    pub n_plays: u32,
    pub n_wins: u32,
}

impl<P> ChildStats<P> {
    pub fn win_rate(&self) -> f64 {
        if self.n_plays > 0 {
            self.n_wins as f64 / self.n_plays as f64
        } else {
            0.0
        }
    }
}

/// Read-only snapshot of a node and its expanded children.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStats<P> {
    pub n_plays: u32,
    pub n_wins: u32,
    pub children: Vec<ChildStats<P>>,
}

impl<P: Clone> NodeStats<P> {
    /// Share of the node's visits that went to each child.
    pub fn visit_shares(&self) -> Vec<(P, f64)> {
        self.children
            .iter()
            .map(|c| {
                let share = if self.n_plays > 0 {
                    c.n_plays as f64 / self.n_plays as f64
                } else {
                    0.0
                };
                (c.play.clone(), share)
            })
            .collect()
    }

    /// The child chosen by `policy`, or `None` if nothing was expanded.
    pub fn pick(&self, policy: BestPlayPolicy) -> Option<&ChildStats<P>> {
        let mut best: Option<&ChildStats<P>> = None;
        for child in &self.children {
            let better = match (best, policy) {
                (None, _) => true,
                (Some(b), BestPlayPolicy::Max) => child.win_rate() > b.win_rate(),
                (Some(b), BestPlayPolicy::Robust) => {
                    child.n_plays > b.n_plays
                        || (child.n_plays == b.n_plays && child.win_rate() > b.win_rate())
                }
            };
            if better {
                best = Some(child);
            }
        }
        best
    }
}

impl<P: fmt::Display> fmt::Display for NodeStats<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plays={} wins={}", self.n_plays, self.n_wins)?;
        for c in &self.children {
            write!(
                f,
                "\nmove {} n={} w={} wr={:.3}",
                c.play,
                c.n_plays,
                c.n_wins,
                c.win_rate()
            )?;
        }
        Ok(())
    }
}

/// How long a search may run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SearchBudget {
    /// Wall-clock time
    Time(Duration),
    /// Fixed number of iterations
    Iterations(u64),
}

impl SearchBudget {
    /// Wall-clock budget from a number of seconds.
    ///
    /// # Errors
    /// [`GameError::InvalidBudget`] for a negative, zero, non-finite or
    /// out-of-range number of seconds.
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        let duration = Duration::try_from_secs_f64(secs)
            .map_err(|e| GameError::InvalidBudget(format!("{secs}s: {e}")))?;
        SearchBudget::Time(duration).checked()
    }

    /// Whether the budget allows no search at all.
    pub fn is_zero(&self) -> bool {
        match self {
            SearchBudget::Time(d) => d.is_zero(),
            SearchBudget::Iterations(n) => *n == 0,
        }
    }

    /// The budget itself, unless it is zero.
    pub fn checked(self) -> Result<Self> {
        if self.is_zero() {
            return Err(GameError::InvalidBudget(self.to_string()));
        }
        Ok(self)
    }
}

impl fmt::Display for SearchBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBudget::Time(d) => write!(f, "{:.3}s", d.as_secs_f64()),
            SearchBudget::Iterations(n) => write!(f, "{n} iterations"),
        }
    }
}

/// Summary of one `run_search` / `run_iterations` call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchReport {
    pub iterations: u64,
    pub draws: u64,
    pub elapsed: Duration,
    /// Size of the whole tree after the search
    pub nodes: usize,
}

/// MCTS engine owning one persistent search tree.
pub struct MonteCarlo<G: Game> {
    game: G,
    config: SearchConfig,
    rng: Rng,
    tree: SearchTree<G>,
}

impl<G: Game> MonteCarlo<G> {
    /// Engine with default settings and an entropy-seeded generator.
    pub fn new(game: G) -> Self {
        Self::with_rng(game, SearchConfig::default(), Rng::new())
    }

    /// Engine with explicit settings and random source.
    pub fn with_rng(game: G, config: SearchConfig, rng: Rng) -> Self {
        Self {
            game,
            config,
            rng,
            tree: SearchTree::new(),
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn tree(&self) -> &SearchTree<G> {
        &self.tree
    }

    /// Whether any search has reached `state`.
    pub fn contains(&self, state: &G::State) -> bool {
        self.tree.find(&self.game.key(state)).is_some()
    }

    /// Search from `state` until `budget` of wall-clock time has elapsed.
    ///
    /// Statistics accumulate on top of whatever earlier searches gathered.
    pub fn run_search(&mut self, state: &G::State, budget: Duration) -> Result<SearchReport> {
        let start = Instant::now();
        self.search(state, start, |_| start.elapsed() < budget)
    }

    /// Search from `state` for exactly `iterations` iterations.
    pub fn run_iterations(&mut self, state: &G::State, iterations: u64) -> Result<SearchReport> {
        self.search(state, Instant::now(), |done| done < iterations)
    }

    /// Search from `state` within `budget`.
    pub fn run(&mut self, state: &G::State, budget: SearchBudget) -> Result<SearchReport> {
        match budget {
            SearchBudget::Time(d) => self.run_search(state, d),
            SearchBudget::Iterations(n) => self.run_iterations(state, n),
        }
    }

    fn search(
        &mut self,
        state: &G::State,
        start: Instant,
        mut keep_going: impl FnMut(u64) -> bool,
    ) -> Result<SearchReport> {
        let root = self.root_for(state)?;
        let mut iterations = 0;
        let mut draws = 0;

        while keep_going(iterations) {
            let leaf = self.select(root);
            let node = self.expand(leaf)?;
            let outcome = self.simulate(node)?;
            self.backpropagate(node, outcome);

            if outcome == Outcome::Draw {
                draws += 1;
            }
            iterations += 1;

            let period = self.config.report_period;
            if period > 0 && iterations % period == 0 {
                let root = self.tree.get(root);
                trace!(
                    iterations,
                    root_plays = root.n_plays,
                    root_wins = root.n_wins,
                    "search progress"
                );
            }
        }

        let report = SearchReport {
            iterations,
            draws,
            elapsed: start.elapsed(),
            nodes: self.tree.len(),
        };
        debug!(
            key = %self.game.key(state),
            iterations = report.iterations,
            draws = report.draws,
            elapsed_ms = report.elapsed.as_millis() as u64,
            nodes = report.nodes,
            "search finished"
        );
        Ok(report)
    }

    /// Statistics of the node for `state`.
    ///
    /// # Errors
    /// [`GameError::NoStatistics`] if no search has reached `state`.
    pub fn stats(&self, state: &G::State) -> Result<NodeStats<G::Play>> {
        let id = self.find(state)?;
        let node = self.tree.get(id);
        let children = node
            .edges
            .iter()
            .filter_map(|edge| {
                edge.child.map(|child| {
                    let child = self.tree.get(child);
                    ChildStats {
                        play: edge.play.clone(),
                        n_plays: child.n_plays,
                        n_wins: child.n_wins,
                    }
                })
            })
            .collect();

        Ok(NodeStats {
            n_plays: node.n_plays,
            n_wins: node.n_wins,
            children,
        })
    }

    /// The move to play from `state` under `policy`.
    ///
    /// # Errors
    /// [`GameError::NoStatistics`] if the node for `state` is missing or has
    /// no expanded children.
    pub fn best_play(&self, state: &G::State, policy: BestPlayPolicy) -> Result<G::Play> {
        let stats = self.stats(state)?;
        stats
            .pick(policy)
            .map(|c| c.play.clone())
            .ok_or_else(|| GameError::NoStatistics {
                key: self.game.key(state).to_string(),
            })
    }

    fn find(&self, state: &G::State) -> Result<NodeId> {
        let key = self.game.key(state);
        self.tree.find(&key).ok_or_else(|| GameError::NoStatistics {
            key: key.to_string(),
        })
    }

    /// Node for `state`, creating it if needed.
    ///
    /// A new node is hung under its parent when the parent state is already
    /// in the tree, so that it is the same node expansion would have made.
    fn root_for(&mut self, state: &G::State) -> Result<NodeId> {
        let key = self.game.key(state);
        if let Some(id) = self.tree.find(&key) {
            return Ok(id);
        }

        let id = self
            .tree
            .insert(key.clone(), Node::new(&self.game, state.clone(), None, None));

        let Ok(prev) = self.game.prev_state(state) else {
            return Ok(id);
        };
        let Some(parent) = self.tree.find(&self.game.key(&prev)) else {
            return Ok(id);
        };
        let mut found = None;
        for (edge, e) in self.tree.get(parent).edges.iter().enumerate() {
            let next = self.game.next_state(&prev, &e.play)?;
            if self.game.key(&next) == key {
                found = Some(edge);
                break;
            }
        }
        if let Some(edge) = found {
            self.tree.link(parent, edge, id);
        }
        Ok(id)
    }

    /// Descend from `root` by UCB1 until a node with untried plays or a
    /// terminal node.
    fn select(&self, root: NodeId) -> NodeId {
        let mut id = root;
        loop {
            let node = self.tree.get(id);
            if node.is_leaf() || !node.is_fully_expanded() {
                return id;
            }

            let mut best: Option<(NodeId, f64)> = None;
            for child in node.edges.iter().filter_map(|e| e.child) {
                let score = self
                    .tree
                    .get(child)
                    .ucb1(node.n_plays, self.config.exploration);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((child, score));
                }
            }

            match best {
                Some((child, _)) => id = child,
                None => return id,
            }
        }
    }

    /// Add one random untried child of `id` and return it. Terminal nodes
    /// and fully expanded nodes are returned unchanged.
    fn expand(&mut self, id: NodeId) -> Result<NodeId> {
        let node = self.tree.get(id);
        let open = node.unexpanded();
        if open.is_empty() {
            return Ok(id);
        }

        let edge = open[self.rng.usize(..open.len())];
        let play = node.edges[edge].play.clone();
        let state = self.game.next_state(&node.state, &play)?;
        let key = self.game.key(&state);

        let child = match self.tree.find(&key) {
            Some(existing) => existing,
            None => self
                .tree
                .insert(key, Node::new(&self.game, state, Some(play), Some(id))),
        };
        self.tree.link(id, edge, child);
        Ok(child)
    }

    fn simulate(&mut self, id: NodeId) -> Result<Outcome> {
        rollout(&self.game, &self.tree.get(id).state, &mut self.rng)
    }

    /// Credit `outcome` to `id` and every ancestor above it.
    fn backpropagate(&mut self, id: NodeId, outcome: Outcome) {
        let mut current = Some(id);
        while let Some(nid) = current {
            let node = self.tree.get_mut(nid);
            node.n_plays += 1;
            if outcome == Outcome::Win(node.player.opponent()) {
                node.n_wins += 1;
            }
            current = node.parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_four::{ConnectFour, Move};
    use crate::constants::{N_COLS, N_ROWS};
    use crate::game::Player;

    fn engine(seed: u64) -> MonteCarlo<ConnectFour> {
        MonteCarlo::with_rng(ConnectFour::new(), SearchConfig::default(), Rng::with_seed(seed))
    }

    fn play_columns(cols: &[usize]) -> <ConnectFour as Game>::State {
        let game = ConnectFour::new();
        cols.iter().fold(game.start(), |s, &c| game.play_column(&s, c).unwrap())
    }

    fn child(play: Move, n_plays: u32, n_wins: u32) -> ChildStats<Move> {
        ChildStats {
            play,
            n_plays,
            n_wins,
        }
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("max".parse::<BestPlayPolicy>(), Ok(BestPlayPolicy::Max));
        assert_eq!("Robust".parse::<BestPlayPolicy>(), Ok(BestPlayPolicy::Robust));
        assert!("greedy".parse::<BestPlayPolicy>().is_err());
        assert_eq!(BestPlayPolicy::Robust.to_string(), "robust");
    }

    #[test]
    fn test_pick_max_ties_go_first() {
        let stats = NodeStats {
            n_plays: 30,
            n_wins: 0,
            children: vec![
                child(Move::new(5, 0), 10, 5),
                child(Move::new(5, 1), 4, 2),
                child(Move::new(5, 2), 16, 4),
            ],
        };
        assert_eq!(stats.pick(BestPlayPolicy::Max).unwrap().play, Move::new(5, 0));
        assert_eq!(stats.pick(BestPlayPolicy::Robust).unwrap().play, Move::new(5, 2));
    }

    #[test]
    fn test_pick_robust_ties_by_win_rate() {
        let stats = NodeStats {
            n_plays: 30,
            n_wins: 0,
            children: vec![
                child(Move::new(5, 0), 10, 3),
                child(Move::new(5, 1), 10, 7),
                child(Move::new(5, 2), 10, 7),
            ],
        };
        assert_eq!(stats.pick(BestPlayPolicy::Robust).unwrap().play, Move::new(5, 1));
    }

    #[test]
    fn test_pick_empty() {
        let stats: NodeStats<Move> = NodeStats {
            n_plays: 3,
            n_wins: 1,
            children: Vec::new(),
        };
        assert!(stats.pick(BestPlayPolicy::Max).is_none());
        assert!(stats.visit_shares().is_empty());
    }

    #[test]
    fn test_budget_display() {
        assert_eq!(SearchBudget::Iterations(500).to_string(), "500 iterations");
        assert_eq!(SearchBudget::from_secs_f64(1.5).unwrap().to_string(), "1.500s");
    }

    #[test]
    fn test_budget_rejects_unusable_values() {
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e300] {
            assert!(matches!(
                SearchBudget::from_secs_f64(secs),
                Err(GameError::InvalidBudget(_))
            ));
        }
        assert_eq!(
            SearchBudget::Iterations(0).checked(),
            Err(GameError::InvalidBudget("0 iterations".to_string()))
        );
        assert!(SearchBudget::Time(Duration::ZERO).is_zero());
        assert_eq!(
            SearchBudget::Iterations(3).checked(),
            Ok(SearchBudget::Iterations(3))
        );
    }

    #[test]
    fn test_run_dispatches_on_budget() {
        let mut mc = engine(4);
        let start = mc.game().start();
        let report = mc.run(&start, SearchBudget::Iterations(25)).unwrap();
        assert_eq!(report.iterations, 25);
        let report = mc.run(&start, SearchBudget::Time(Duration::ZERO)).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(mc.stats(&start).unwrap().n_plays, 25);
    }

    #[test]
    fn test_best_play_without_search_fails() {
        let mc = engine(1);
        let start = mc.game().start();
        assert!(matches!(
            mc.best_play(&start, BestPlayPolicy::Robust),
            Err(GameError::NoStatistics { .. })
        ));
        assert!(matches!(mc.stats(&start), Err(GameError::NoStatistics { .. })));
    }

    #[test]
    fn test_first_iterations_expand_every_root_child() {
        let mut mc = engine(3);
        let start = mc.game().start();
        let report = mc.run_iterations(&start, N_COLS as u64).unwrap();
        assert_eq!(report.iterations, N_COLS as u64);
        assert_eq!(report.nodes, N_COLS + 1);

        let stats = mc.stats(&start).unwrap();
        assert_eq!(stats.n_plays, N_COLS as u32);
        assert_eq!(stats.children.len(), N_COLS);
        for (col, c) in stats.children.iter().enumerate() {
            assert_eq!(c.play, Move::new(N_ROWS - 1, col));
            assert_eq!(c.n_plays, 1);
        }
    }

    #[test]
    fn test_zero_budget_creates_root_only() {
        let mut mc = engine(5);
        let start = mc.game().start();
        let report = mc.run_search(&start, Duration::ZERO).unwrap();
        assert_eq!(report.iterations, 0);
        assert!(mc.contains(&start));

        let stats = mc.stats(&start).unwrap();
        assert_eq!(stats.n_plays, 0);
        assert!(stats.children.is_empty());
        assert!(matches!(
            mc.best_play(&start, BestPlayPolicy::Max),
            Err(GameError::NoStatistics { .. })
        ));
    }

    #[test]
    fn test_timed_search_runs_iterations() {
        let mut mc = engine(9);
        let start = mc.game().start();
        let report = mc.run_search(&start, Duration::from_millis(50)).unwrap();
        assert!(report.iterations > 0);
        assert!(report.elapsed >= Duration::from_millis(50));
        assert_eq!(mc.stats(&start).unwrap().n_plays as u64, report.iterations);
    }

    #[test]
    fn test_terminal_root_has_no_children() {
        let mut mc = engine(11);
        let won = play_columns(&[0, 1, 0, 1, 0, 1, 0]);
        mc.run_iterations(&won, 10).unwrap();
        let stats = mc.stats(&won).unwrap();
        assert_eq!(stats.n_plays, 10);
        // Player one moved into this state and won every "rollout".
        assert_eq!(stats.n_wins, 10);
        assert!(stats.children.is_empty());
        assert!(mc.best_play(&won, BestPlayPolicy::Max).is_err());
    }

    #[test]
    fn test_finds_immediate_win() {
        let mut mc = engine(21);
        // Three of player one's pieces in column 0, player one to move.
        let state = play_columns(&[0, 1, 0, 1, 0, 6]);
        assert_eq!(state.player(), Player::One);
        mc.run_iterations(&state, 3000).unwrap();

        let winning = Move::new(2, 0);
        assert_eq!(mc.best_play(&state, BestPlayPolicy::Max).unwrap(), winning);
        assert_eq!(mc.best_play(&state, BestPlayPolicy::Robust).unwrap(), winning);

        let stats = mc.stats(&state).unwrap();
        let win_child = stats.children.iter().find(|c| c.play == winning).unwrap();
        assert_eq!(win_child.n_wins, win_child.n_plays);
    }

    #[test]
    fn test_root_attaches_to_known_parent() {
        let mut mc = engine(13);
        let game = ConnectFour::new();
        let start = game.start();
        mc.run_search(&start, Duration::ZERO).unwrap();

        let child_state = game.play_column(&start, 4).unwrap();
        mc.run_iterations(&child_state, 5).unwrap();

        let parent = mc.stats(&start).unwrap();
        assert_eq!(parent.n_plays, 5);
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].play, Move::new(5, 4));
        assert_eq!(parent.children[0].n_plays, 5);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = engine(99);
        let mut b = engine(99);
        let start = a.game().start();
        a.run_iterations(&start, 500).unwrap();
        b.run_iterations(&start, 500).unwrap();
        assert_eq!(a.stats(&start).unwrap(), b.stats(&start).unwrap());
    }
}
