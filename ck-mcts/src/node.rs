//! Search-tree node: visit statistics plus the not-yet-expanded move set.
//!
//! A node carries no game state of its own; the position it stands for is
//! reconstructed by replaying the edge moves along its path from the root.

use ck_core::Move;

pub type NodeId = u32;

pub struct Node {
    /// Parent index; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Expanded edges: the move applied and the child it leads to.
    pub children: Vec<(Move, NodeId)>,
    /// Legal moves not yet materialized as children.
    pub untried: Vec<Move>,
    pub visits: u32,
    pub value_sum: f64,
    pub terminal: bool,
}

impl Node {
    pub fn new(parent: Option<NodeId>, untried: Vec<Move>, terminal: bool) -> Self {
        Self {
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            value_sum: 0.0,
            terminal,
        }
    }

    pub fn fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }
}
