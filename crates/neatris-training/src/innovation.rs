//! Global innovation and node-id counters.
//!
//! Every structural mutation (a new connection, or a node splitting a
//! connection) takes fresh numbers from one [`InnovationCounters`] owned by
//! the population. There is no per-generation cache: the same structural
//! change arising independently in two genomes gets two different numbers.

use crate::gene::{Innovation, NodeId};

/// First innovation number handed out.
pub const FIRST_INNOVATION: u32 = 1;
/// Smallest id given to a hidden node.
pub const FIRST_HIDDEN_NODE_ID: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnovationCounters {
    next_innovation: u32,
    next_node_id: u32,
}

impl Default for InnovationCounters {
    fn default() -> Self {
        Self {
            next_innovation: FIRST_INNOVATION,
            next_node_id: FIRST_HIDDEN_NODE_ID,
        }
    }
}

impl InnovationCounters {
    #[must_use]
    pub const fn new(next_innovation: u32, next_node_id: u32) -> Self {
        Self {
            next_innovation,
            next_node_id,
        }
    }

    /// Counters for fresh genomes with `node_count` initial nodes numbered
    /// from 0, keeping hidden ids clear of them.
    #[must_use]
    pub fn for_initial_nodes(node_count: u32) -> Self {
        Self {
            next_innovation: FIRST_INNOVATION,
            next_node_id: u32::max(FIRST_HIDDEN_NODE_ID, node_count),
        }
    }

    /// Returns the number the next new connection will get.
    #[must_use]
    pub const fn peek_innovation(&self) -> u32 {
        self.next_innovation
    }

    /// Returns the id the next new hidden node will get.
    #[must_use]
    pub const fn peek_node_id(&self) -> u32 {
        self.next_node_id
    }

    pub fn next_innovation(&mut self) -> Innovation {
        let innovation = Innovation(self.next_innovation);
        self.next_innovation += 1;
        innovation
    }

    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }
}
