//! Crossover of two parent genomes.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::genome::Genome;

impl Genome {
    /// Recombines two parents into a child genome.
    ///
    /// `a` is the primary parent:
    ///
    /// - Nodes are the union of both parents' nodes, sorted by id. On an id
    ///   collision `a`'s node is kept
    /// - Connections follow `a`'s innovation numbers in ascending order. A
    ///   gene present in both parents is copied from either with equal
    ///   probability, enabled flag included. Genes only in `a` are inherited;
    ///   genes only in `b` are dropped
    ///
    /// The child's fitness is 0.
    #[must_use]
    pub fn crossover<R>(a: &Genome, b: &Genome, rng: &mut R) -> Genome
    where
        R: Rng + ?Sized,
    {
        let mut nodes = BTreeMap::new();
        for node in b.nodes() {
            nodes.insert(node.id, *node);
        }
        for node in a.nodes() {
            nodes.insert(node.id, *node);
        }

        let b_genes: HashMap<_, _> = b.connections().iter().map(|c| (c.innovation, c)).collect();
        let mut a_genes: Vec<_> = a.connections().iter().collect();
        a_genes.sort_by_key(|c| c.innovation);

        let connections = a_genes
            .into_iter()
            .map(|gene| match b_genes.get(&gene.innovation) {
                Some(other) if rng.random_bool(0.5) => **other,
                _ => *gene,
            })
            .collect();

        Genome::from_genes(nodes.into_values().collect(), connections)
    }
}
