//! Genomes and network evaluation.
//!
//! A [`Genome`] is a list of nodes and a list of connections between them.
//! The graph may contain cycles; it is evaluated by a fixed number of
//! propagation passes rather than in topological order.
//!
//! # Evaluation
//!
//! 1. Input nodes take the given values in declaration order (missing values
//!    are 0, extra values are ignored); the bias node is 1.0; every other
//!    node starts at 0
//! 2. Each pass walks the enabled connections in list order, adding
//!    `source × weight` to the destination. Updates are visible to later
//!    connections of the same pass
//! 3. At the end of each pass, hidden and output nodes are squashed with
//!    `1 / (1 + e^(-4.9x))`. Values carry over to the next pass
//! 4. After [`PROPAGATION_PASSES`] passes the score is the largest output value
//!
//! # Example
//!
//! ```
//! use neatris_training::{
//!     gene::{ConnectionGene, Innovation, NodeGene, NodeId, NodeKind},
//!     genome::Genome,
//! };
//!
//! let genome = Genome::new(
//!     vec![
//!         NodeGene::new(NodeId(0), NodeKind::Input),
//!         NodeGene::new(NodeId(1), NodeKind::Bias),
//!         NodeGene::new(NodeId(2), NodeKind::Output),
//!     ],
//!     vec![ConnectionGene::new(Innovation(1), NodeId(0), NodeId(2), 1.0)],
//! )
//! .unwrap();
//!
//! assert!(genome.evaluate(&[1.0]) > genome.evaluate(&[-1.0]));
//! ```

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::{
    gene::{ConnectionGene, Innovation, NodeGene, NodeId, NodeKind},
    innovation::InnovationCounters,
};

/// Number of propagation passes per evaluation.
pub const PROPAGATION_PASSES: usize = 3;
/// Steepness of the node activation.
pub const SIGMOID_SLOPE: f64 = 4.9;

/// Score of a genome that has no output node.
pub const NO_OUTPUT_SCORE: f64 = f64::MIN;

#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-SIGMOID_SLOPE * x).exp())
}

/// Error returned when genes do not form a valid genome.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenomeError {
    #[display("node id {id} appears more than once")]
    DuplicateNode { id: NodeId },
    #[display("innovation {innovation} appears more than once")]
    DuplicateInnovation { innovation: Innovation },
    #[display("connection {innovation} references unknown node {node}")]
    UnknownEndpoint { innovation: Innovation, node: NodeId },
    #[display("connection {innovation} runs from {from} to {to} against the feed direction")]
    InvalidDirection {
        innovation: Innovation,
        from: NodeId,
        to: NodeId,
    },
}

/// A candidate network: its genes and its last measured fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    nodes: Vec<NodeGene>,
    connections: Vec<ConnectionGene>,
    fitness: f64,
}

impl Genome {
    /// Builds a genome from genes, checking their consistency.
    ///
    /// Node ids and innovation numbers must be unique, every connection must
    /// join two listed nodes, and no connection may leave an output node or
    /// enter an input or bias node.
    pub fn new(
        nodes: Vec<NodeGene>,
        connections: Vec<ConnectionGene>,
    ) -> Result<Self, GenomeError> {
        let mut kinds = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            if kinds.insert(node.id, node.kind).is_some() {
                return Err(GenomeError::DuplicateNode { id: node.id });
            }
        }

        let mut innovations = HashSet::with_capacity(connections.len());
        for conn in &connections {
            if !innovations.insert(conn.innovation) {
                return Err(GenomeError::DuplicateInnovation {
                    innovation: conn.innovation,
                });
            }
            let endpoint_kind = |node| {
                kinds
                    .get(&node)
                    .copied()
                    .ok_or(GenomeError::UnknownEndpoint {
                        innovation: conn.innovation,
                        node,
                    })
            };
            let from = endpoint_kind(conn.source)?;
            let to = endpoint_kind(conn.destination)?;
            if from.is_output() || to.is_sensor() {
                return Err(GenomeError::InvalidDirection {
                    innovation: conn.innovation,
                    from: conn.source,
                    to: conn.destination,
                });
            }
        }

        Ok(Self::from_genes(nodes, connections))
    }

    /// Builds a genome without checking the genes.
    pub(crate) fn from_genes(nodes: Vec<NodeGene>, connections: Vec<ConnectionGene>) -> Self {
        Self {
            nodes,
            connections,
            fitness: 0.0,
        }
    }

    /// Creates a genome connecting every input and the bias to every output.
    ///
    /// Nodes are numbered `0..inputs` for inputs, `inputs` for the bias and
    /// `inputs + 1..` for outputs. Each connection gets a fresh innovation
    /// number and a uniform weight in `[-weight_range, weight_range]`.
    pub fn fully_connected<R>(
        inputs: u32,
        outputs: u32,
        weight_range: f64,
        counters: &mut InnovationCounters,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut nodes = Vec::new();
        nodes.extend((0..inputs).map(|id| NodeGene::new(NodeId(id), NodeKind::Input)));
        nodes.push(NodeGene::new(NodeId(inputs), NodeKind::Bias));
        nodes.extend(
            (inputs + 1..=inputs + outputs).map(|id| NodeGene::new(NodeId(id), NodeKind::Output)),
        );

        let mut connections = Vec::new();
        for sensor in nodes.iter().filter(|n| n.kind.is_sensor()) {
            for output in nodes.iter().filter(|n| n.kind.is_output()) {
                let weight = rng.random_range(-weight_range..=weight_range);
                connections.push(ConnectionGene::new(
                    counters.next_innovation(),
                    sensor.id,
                    output.id,
                    weight,
                ));
            }
        }

        Self::from_genes(nodes, connections)
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    #[must_use]
    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<NodeGene> {
        &mut self.nodes
    }

    pub(crate) fn connections_mut(&mut self) -> &mut Vec<ConnectionGene> {
        &mut self.connections
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Returns the id of the first listed node, if any.
    #[must_use]
    pub fn first_node_id(&self) -> Option<NodeId> {
        self.nodes.first().map(|n| n.id)
    }

    #[must_use]
    pub fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.iter().find(|n| n.id == id).map(|n| n.kind)
    }

    #[must_use]
    pub fn has_connection(&self, source: NodeId, destination: NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == source && c.destination == destination)
    }

    /// Scores a feature vector. Higher is better.
    ///
    /// Returns [`NO_OUTPUT_SCORE`] if the genome has no output node.
    #[must_use]
    pub fn evaluate(&self, inputs: &[f64]) -> f64 {
        let index: HashMap<NodeId, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();

        let mut values = vec![0.0; self.nodes.len()];
        let mut input_values = inputs.iter().copied();
        for (node, value) in self.nodes.iter().zip(&mut values) {
            match node.kind {
                NodeKind::Input => *value = input_values.next().unwrap_or(0.0),
                NodeKind::Bias => *value = 1.0,
                NodeKind::Hidden | NodeKind::Output => {}
            }
        }

        let links: Vec<(usize, usize, f64)> = self
            .connections
            .iter()
            .filter(|c| c.enabled)
            .filter_map(|c| Some((index.get(&c.source)?, index.get(&c.destination)?, c.weight)))
            .map(|(s, d, w)| (*s, *d, w))
            .collect();

        for _ in 0..PROPAGATION_PASSES {
            for &(source, destination, weight) in &links {
                values[destination] += values[source] * weight;
            }
            for (node, value) in self.nodes.iter().zip(&mut values) {
                if node.kind.is_activated() {
                    *value = sigmoid(*value);
                }
            }
        }

        self.nodes
            .iter()
            .zip(&values)
            .filter(|(node, _)| node.kind.is_output())
            .map(|(_, value)| *value)
            .reduce(f64::max)
            .unwrap_or(NO_OUTPUT_SCORE)
    }
}
