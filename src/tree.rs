//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`].
//! A map from state key to node id lets a search start from any state the
//! tree has already seen. Nodes are never removed: the tree only grows for
//! as long as the engine that owns it lives.

use std::collections::HashMap;

use crate::game::{Game, Outcome, Player};

/// Index of a node in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A legal play out of a node, with the child node once it has been expanded.
#[derive(Clone, Debug)]
pub struct Edge<P> {
    pub play: P,
    pub child: Option<NodeId>,
}

/// A node in the search tree.
///
/// `n_wins` counts rollouts won by the player who made the move into this
/// node, so a child's win rate reads from the perspective of the player
/// choosing among the children.
pub struct Node<G: Game> {
    /// The game state at this node
    pub state: G::State,
    /// Play that led here from the parent (None for a detached root)
    pub play: Option<G::Play>,
    /// Parent node, if any
    pub parent: Option<NodeId>,
    /// Player to move at this node
    pub player: Player,
    /// Terminal status of the state
    pub outcome: Outcome,
    /// Number of rollouts through this node
    pub n_plays: u32,
    /// Number of those rollouts won by `player.opponent()`
    pub n_wins: u32,
    /// One edge per legal play, in the game's play order. Empty when terminal.
    pub edges: Vec<Edge<G::Play>>,
}

impl<G: Game> Node<G> {
    /// Create a node with zero statistics for `state`.
    pub fn new(game: &G, state: G::State, play: Option<G::Play>, parent: Option<NodeId>) -> Self {
        let outcome = game.winner(&state);
        let edges = if outcome.is_terminal() {
            Vec::new()
        } else {
            game.legal_plays(&state)
                .into_iter()
                .map(|play| Edge { play, child: None })
                .collect()
        };
        Self {
            player: game.player(&state),
            state,
            play,
            parent,
            outcome,
            n_plays: 0,
            n_wins: 0,
            edges,
        }
    }

    /// Wins over plays, or 0.0 for an unvisited node.
    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.n_plays > 0 {
            self.n_wins as f64 / self.n_plays as f64
        } else {
            0.0
        }
    }

    /// UCB1 score of this node as a child of a parent with `parent_plays` visits.
    #[inline]
    pub fn ucb1(&self, parent_plays: u32, exploration: f64) -> f64 {
        if self.n_plays == 0 {
            return f64::INFINITY;
        }
        let n = self.n_plays as f64;
        self.win_rate() + exploration * ((parent_plays as f64).ln() / n).sqrt()
    }

    /// Terminal nodes have no edges.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.edges.iter().all(|e| e.child.is_some())
    }

    /// Indices of edges that have no child node yet.
    pub fn unexpanded(&self) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.child.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Arena of nodes plus a key index.
pub struct SearchTree<G: Game> {
    nodes: Vec<Node<G>>,
    index: HashMap<G::Key, NodeId>,
}

impl<G: Game> Default for SearchTree<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Game> SearchTree<G> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.0]
    }

    /// Node id for a state key.
    pub fn find(&self, key: &G::Key) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Allocate `node` under `key` and return its id.
    pub fn insert(&mut self, key: G::Key, node: Node<G>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.index.insert(key, id);
        id
    }

    /// Attach `child` as the node behind `edge` of `parent`.
    pub fn link(&mut self, parent: NodeId, edge: usize, child: NodeId) {
        let play = self.nodes[parent.0].edges[edge].play.clone();
        self.nodes[parent.0].edges[edge].child = Some(child);
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.play = Some(play);
    }
}
