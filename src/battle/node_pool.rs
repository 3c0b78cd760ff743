//! Scratch search records, one per battlefield cell
//!
//! The pool is allocated once per battlefield and reset at the start of
//! every search. Predecessors are cell indices, never references.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::battle::battlefield::Battlefield;
use crate::battle::position::{Direction, Position};

/// Search state of a single cell
#[derive(Debug, Clone)]
pub struct PathNode {
    pub position: Position,
    /// TU spent to reach this cell
    pub cost: u32,
    /// Cost plus search-only penalties; orders the open set
    pub score: u32,
    /// Energy spent to reach this cell
    pub energy: u32,
    pub previous: Option<usize>,
    pub arrival: Option<Direction>,
    pub visited: bool,
    pub open: bool,
}

impl PathNode {
    fn new(position: Position) -> Self {
        Self {
            position,
            cost: u32::MAX,
            score: u32::MAX,
            energy: 0,
            previous: None,
            arrival: None,
            visited: false,
            open: false,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.position);
    }

    /// Record a better way of reaching this node and mark it open
    pub fn connect(
        &mut self,
        cost: u32,
        score: u32,
        energy: u32,
        previous: Option<usize>,
        arrival: Option<Direction>,
    ) {
        self.cost = cost;
        self.score = score;
        self.energy = energy;
        self.previous = previous;
        self.arrival = arrival;
        self.open = true;
    }
}

/// Node records for every cell plus the shared open set
#[derive(Debug, Clone)]
pub struct NodePool {
    nodes: Vec<PathNode>,
    open_set: BinaryHeap<Reverse<(u32, usize)>>,
}

impl NodePool {
    pub fn new(battlefield: &Battlefield) -> Self {
        let nodes = (0..battlefield.cell_count())
            .map(|i| PathNode::new(battlefield.position_of(i)))
            .collect();
        Self {
            nodes,
            open_set: BinaryHeap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether this pool was sized for `battlefield`
    pub fn fits(&self, battlefield: &Battlefield) -> bool {
        self.nodes.len() == battlefield.cell_count()
    }

    /// Forget every previous search
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
        self.open_set.clear();
    }

    pub fn node(&self, index: usize) -> &PathNode {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut PathNode {
        &mut self.nodes[index]
    }

    pub fn push_open(&mut self, priority: u32, index: usize) {
        self.open_set.push(Reverse((priority, index)));
    }

    /// Next unvisited node with the lowest priority
    ///
    /// Entries superseded by a cheaper push are skipped here instead of
    /// being removed when the node is relaxed.
    pub fn pop_open(&mut self) -> Option<usize> {
        while let Some(Reverse((_, index))) = self.open_set.pop() {
            if !self.nodes[index].visited {
                return Some(index);
            }
        }
        None
    }

    /// Directions from the search origin to `index`
    pub fn directions_to(&self, index: usize) -> Vec<Direction> {
        let mut directions = Vec::new();
        let mut current = index;
        while let (Some(previous), Some(arrival)) =
            (self.nodes[current].previous, self.nodes[current].arrival)
        {
            directions.push(arrival);
            current = previous;
            if directions.len() > self.nodes.len() {
                // A predecessor cycle means the pool was not reset
                tracing::warn!("Predecessor chain from node {} does not terminate", index);
                return Vec::new();
            }
        }
        directions.reverse();
        directions
    }
}
