//! Mutation operators.
//!
//! - **Weight mutation** ([`Genome::mutate_weights`]) - perturb or replace every enabled weight
//! - **Add connection** ([`Genome::add_connection`]) - link two unconnected nodes
//! - **Add node** ([`Genome::add_node`]) - split an enabled connection with a hidden node
//!
//! Structural operators draw innovation numbers and node ids from the
//! population's [`InnovationCounters`]. All operators are no-ops on genomes
//! they cannot apply to, and report whether they changed anything.

use rand::Rng;
use rand_distr::Normal;

use crate::{
    gene::{ConnectionGene, NodeGene, NodeKind},
    genome::Genome,
    innovation::InnovationCounters,
};

/// Evolution constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeatParams {
    /// Probability that a weight is perturbed rather than replaced.
    pub weight_perturb_prob: f64,
    /// Standard deviation of the Gaussian weight perturbation.
    pub weight_perturb_sigma: f64,
    /// New and replaced weights are drawn from `[-weight_range, weight_range]`.
    pub weight_range: f64,
    /// Probability that an offspring gets an add-node mutation.
    pub add_node_prob: f64,
    /// Probability that an offspring gets an add-connection mutation.
    pub add_connection_prob: f64,
}

impl Default for NeatParams {
    fn default() -> Self {
        Self {
            weight_perturb_prob: 0.9,
            weight_perturb_sigma: 0.5,
            weight_range: 1.0,
            add_node_prob: 0.05,
            add_connection_prob: 0.2,
        }
    }
}

impl Genome {
    /// Perturbs or replaces the weight of every enabled connection.
    ///
    /// With probability `weight_perturb_prob` Gaussian noise is added;
    /// otherwise the weight is redrawn uniformly.
    ///
    /// # Panics
    ///
    /// Panics if `weight_perturb_sigma` is negative or not finite.
    pub fn mutate_weights<R>(&mut self, params: &NeatParams, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        let normal = Normal::new(0.0, params.weight_perturb_sigma)
            .expect("weight_perturb_sigma must be finite and non-negative");
        let mut changed = false;
        for conn in self.connections_mut().iter_mut().filter(|c| c.enabled) {
            if rng.random_bool(params.weight_perturb_prob) {
                conn.weight += rng.sample(normal);
            } else {
                conn.weight = rng.random_range(-params.weight_range..=params.weight_range);
            }
            changed = true;
        }
        changed
    }

    /// Adds a connection between two randomly chosen nodes.
    ///
    /// The pair is ordered by [`NodeKind::layer_rank`]. Nothing is added if
    /// the pair would leave an output, enter an input or the bias, or already
    /// exists (enabled or not).
    pub fn add_connection<R>(
        &mut self,
        params: &NeatParams,
        counters: &mut InnovationCounters,
        rng: &mut R,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        let nodes = self.nodes();
        if nodes.len() < 2 {
            return false;
        }
        let mut from = nodes[rng.random_range(0..nodes.len())];
        let mut to = nodes[rng.random_range(0..nodes.len())];
        if from.kind.layer_rank() > to.kind.layer_rank() {
            (from, to) = (to, from);
        }
        if from.kind.is_output() || to.kind.is_sensor() || self.has_connection(from.id, to.id) {
            return false;
        }

        let weight = rng.random_range(-params.weight_range..=params.weight_range);
        let innovation = counters.next_innovation();
        self.connections_mut()
            .push(ConnectionGene::new(innovation, from.id, to.id, weight));
        true
    }

    /// Splits a random enabled connection with a new hidden node.
    ///
    /// The split connection is disabled. The new node receives the source
    /// with weight 1.0 and feeds the destination with the old weight, so the
    /// network initially behaves much as before.
    pub fn add_node<R>(&mut self, counters: &mut InnovationCounters, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        let enabled: Vec<usize> = self
            .connections()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.enabled)
            .map(|(i, _)| i)
            .collect();
        if enabled.is_empty() {
            return false;
        }
        let index = enabled[rng.random_range(0..enabled.len())];

        let split = &mut self.connections_mut()[index];
        split.enabled = false;
        let split = *split;

        let node = NodeGene::new(counters.next_node_id(), NodeKind::Hidden);
        self.nodes_mut().push(node);
        let incoming = ConnectionGene::new(counters.next_innovation(), split.source, node.id, 1.0);
        let outgoing = ConnectionGene::new(
            counters.next_innovation(),
            node.id,
            split.destination,
            split.weight,
        );
        self.connections_mut().extend([incoming, outgoing]);
        true
    }
}
