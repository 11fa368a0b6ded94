//! Population management and generational replacement.
//!
//! # Generation Cycle
//!
//! 1. **Evaluate Fitness** - every genome plays seeded games
//!    ([`Population::evaluate_fitness`])
//! 2. **Elite Selection** - the fittest genomes are copied unchanged
//! 3. **Biased Sampling** - parents are drawn with a bias toward the top of
//!    the ranking
//! 4. **Crossover** - the fitter parent is the primary one
//!    ([`Genome::crossover`])
//! 5. **Mutation** - weights always; structural mutations with small
//!    probabilities
//!
//! Steps 2 to 5 form one [`Population::epoch`].
//!
//! # Parent Sampling
//!
//! With genomes ranked best first, a parent index is `⌊u² · size⌋` for a
//! uniform `u ∈ [0, 1)`. Squaring skews the draw toward low indices: the
//! top 25% of the ranking is picked half of the time.
//!
//! There is no speciation or fitness sharing. Elitism and the biased draw
//! are the only selection pressure.
//!
//! # Example
//!
//! ```
//! use neatris_engine::GameParams;
//! use neatris_training::{fitness::FitnessEvaluator, population::Population};
//!
//! let mut population = Population::new(4, 4, 1, 7).unwrap();
//! let evaluator = FitnessEvaluator::new(GameParams {
//!     max_pieces: 20,
//!     ..GameParams::default()
//! });
//!
//! for generation in 0..2 {
//!     population
//!         .evaluate_fitness(&evaluator, |genome| {
//!             neatris_training::fitness::game_seeds(generation, genome, 1)
//!         })
//!         .unwrap();
//!     population.epoch(1);
//! }
//! assert_eq!(population.genomes().len(), 4);
//! ```

use std::{panic, thread};

use neatris_engine::PlacementError;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    fitness::FitnessEvaluator, genome::Genome, innovation::InnovationCounters,
    mutation::NeatParams,
};

/// Error returned when a population cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PopulationError {
    #[display("population must contain at least one genome")]
    EmptyPopulation,
    #[display("genomes must have at least one input")]
    NoInputs,
    #[display("genomes must have at least one output")]
    NoOutputs,
}

/// Fitness summary of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// The genomes of one generation with the state needed to breed the next.
#[derive(Debug, Clone)]
pub struct Population {
    genomes: Vec<Genome>,
    rng: Pcg32,
    counters: InnovationCounters,
    params: NeatParams,
}

impl Population {
    /// Creates `size` fully connected genomes with default evolution params.
    pub fn new(size: usize, inputs: u32, outputs: u32, seed: u64) -> Result<Self, PopulationError> {
        Self::with_params(size, inputs, outputs, seed, NeatParams::default())
    }

    /// Creates `size` fully connected genomes.
    ///
    /// Every genome links each input and the bias to each output with its
    /// own random weights. Each of those connections takes a fresh
    /// innovation number.
    pub fn with_params(
        size: usize,
        inputs: u32,
        outputs: u32,
        seed: u64,
        params: NeatParams,
    ) -> Result<Self, PopulationError> {
        if size == 0 {
            return Err(PopulationError::EmptyPopulation);
        }
        if inputs == 0 {
            return Err(PopulationError::NoInputs);
        }
        if outputs == 0 {
            return Err(PopulationError::NoOutputs);
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut counters = InnovationCounters::for_initial_nodes(inputs + 1 + outputs);
        let genomes = (0..size)
            .map(|_| {
                Genome::fully_connected(inputs, outputs, params.weight_range, &mut counters, &mut rng)
            })
            .collect();

        Ok(Self {
            genomes,
            rng,
            counters,
            params,
        })
    }

    /// Rebuilds a population from saved genomes and counters.
    ///
    /// The random stream is not saved, so a fresh `seed` is needed. Mutation
    /// parameters are not saved either; they are reset to
    /// [`NeatParams::default()`].
    pub fn from_parts(
        genomes: Vec<Genome>,
        counters: InnovationCounters,
        seed: u64,
    ) -> Result<Self, PopulationError> {
        if genomes.is_empty() {
            return Err(PopulationError::EmptyPopulation);
        }
        Ok(Self {
            genomes,
            rng: Pcg32::seed_from_u64(seed),
            counters,
            params: NeatParams::default(),
        })
    }

    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    #[must_use]
    pub fn counters(&self) -> &InnovationCounters {
        &self.counters
    }

    #[must_use]
    pub fn params(&self) -> &NeatParams {
        &self.params
    }

    /// Returns the genome with the highest fitness, the first one on ties.
    #[must_use]
    pub fn best(&self) -> &Genome {
        self.genomes
            .iter()
            .reduce(|best, g| if g.fitness() > best.fitness() { g } else { best })
            .expect("population is never empty")
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn fitness_stats(&self) -> FitnessStats {
        let fitness = self.genomes.iter().map(Genome::fitness);
        let min = fitness.clone().fold(f64::INFINITY, f64::min);
        let max = fitness.clone().fold(f64::NEG_INFINITY, f64::max);
        let mean = fitness.sum::<f64>() / self.genomes.len() as f64;
        FitnessStats { min, max, mean }
    }

    /// Evaluates every genome in parallel and stores its fitness.
    ///
    /// `seeds` gives the games each genome plays. Genomes are not reordered.
    pub fn evaluate_fitness<F, S>(
        &mut self,
        evaluator: &FitnessEvaluator,
        mut seeds: F,
    ) -> Result<(), PlacementError>
    where
        F: FnMut(&Genome) -> S,
        S: IntoIterator<Item = u64>,
    {
        thread::scope(|s| {
            let handles: Vec<_> = self
                .genomes
                .iter_mut()
                .map(|genome| {
                    let genome_seeds: Vec<u64> = seeds(genome).into_iter().collect();
                    s.spawn(move || -> Result<(), PlacementError> {
                        let lines = evaluator.evaluate_games(genome, genome_seeds)?;
                        genome.set_fitness(lines_to_fitness(lines));
                        Ok(())
                    })
                })
                .collect();

            for handle in handles {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))?;
            }
            Ok(())
        })
    }

    /// Evaluates every genome on the current thread and stores its fitness.
    pub fn evaluate_fitness_serial<F, S>(
        &mut self,
        evaluator: &FitnessEvaluator,
        mut seeds: F,
    ) -> Result<(), PlacementError>
    where
        F: FnMut(&Genome) -> S,
        S: IntoIterator<Item = u64>,
    {
        for genome in &mut self.genomes {
            let lines = evaluator.evaluate_games(genome, seeds(genome))?;
            genome.set_fitness(lines_to_fitness(lines));
        }
        Ok(())
    }

    /// Replaces the genomes with the next generation.
    ///
    /// Genomes are stably sorted by fitness, best first, and the top
    /// `elites` are copied unchanged. Each other slot is filled by crossing
    /// two sampled parents and mutating the child.
    pub fn epoch(&mut self, elites: usize) {
        self.genomes
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        let size = self.genomes.len();
        let mut next = Vec::with_capacity(size);
        next.extend(self.genomes.iter().take(elites).cloned());

        while next.len() < size {
            let a = sample_rank(&mut self.rng, size);
            let b = sample_rank(&mut self.rng, size);
            let (primary, secondary) = if self.genomes[a].fitness() > self.genomes[b].fitness() {
                (a, b)
            } else {
                (b, a)
            };

            let mut child = Genome::crossover(
                &self.genomes[primary],
                &self.genomes[secondary],
                &mut self.rng,
            );
            child.mutate_weights(&self.params, &mut self.rng);
            if self.rng.random_bool(self.params.add_node_prob) {
                child.add_node(&mut self.counters, &mut self.rng);
            }
            if self.rng.random_bool(self.params.add_connection_prob) {
                child.add_connection(&self.params, &mut self.counters, &mut self.rng);
            }
            child.set_fitness(0.0);
            next.push(child);
        }

        self.genomes = next;
    }
}

#[expect(clippy::cast_precision_loss)]
fn lines_to_fitness(lines: usize) -> f64 {
    lines as f64
}

/// Draws a rank in `0..size`, biased toward 0.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn sample_rank<R>(rng: &mut R, size: usize) -> usize
where
    R: Rng + ?Sized,
{
    let u: f64 = rng.random();
    usize::min(size - 1, (u * u * size as f64) as usize)
}

#[cfg(test)]
mod tests {
    use neatris_engine::GameParams;
    use rand::SeedableRng as _;

    use super::*;
    use crate::fitness::game_seeds;

    #[test]
    fn test_rejects_zero_sizes() {
        assert_eq!(
            Population::new(0, 4, 1, 0).unwrap_err(),
            PopulationError::EmptyPopulation
        );
        assert_eq!(
            Population::new(3, 0, 1, 0).unwrap_err(),
            PopulationError::NoInputs
        );
        assert_eq!(
            Population::new(3, 4, 0, 0).unwrap_err(),
            PopulationError::NoOutputs
        );
        assert_eq!(
            Population::from_parts(vec![], InnovationCounters::default(), 0).unwrap_err(),
            PopulationError::EmptyPopulation
        );
    }

    #[test]
    fn test_from_parts_resets_params() {
        let params = NeatParams {
            add_node_prob: 0.5,
            ..NeatParams::default()
        };
        let original = Population::with_params(2, 4, 1, 0, params).unwrap();
        let rebuilt = Population::from_parts(
            original.genomes().to_vec(),
            *original.counters(),
            0,
        )
        .unwrap();
        assert_eq!(rebuilt.params(), &NeatParams::default());
        assert_eq!(rebuilt.counters(), original.counters());
    }

    #[test]
    fn test_initial_genomes_take_fresh_innovations() {
        let population = Population::new(3, 4, 1, 1).unwrap();
        let innovations: Vec<Vec<u32>> = population
            .genomes()
            .iter()
            .map(|g| g.connections().iter().map(|c| c.innovation.0).collect())
            .collect();
        assert_eq!(innovations[0], [1, 2, 3, 4, 5]);
        assert_eq!(innovations[1], [6, 7, 8, 9, 10]);
        assert_eq!(innovations[2], [11, 12, 13, 14, 15]);
        assert_eq!(population.counters().peek_innovation(), 16);
        assert_eq!(population.counters().peek_node_id(), 1000);
    }

    #[test]
    fn test_epoch_keeps_elites() {
        let mut population = Population::new(5, 4, 1, 3).unwrap();
        // Shuffled order; the stable sort puts 10 and 8 first.
        for (genome, fitness) in population
            .genomes_mut()
            .iter_mut()
            .zip([6.0, 10.0, 2.0, 8.0, 4.0])
        {
            genome.set_fitness(fitness);
        }
        let best = population.genomes()[1].clone();
        let second = population.genomes()[3].clone();

        population.epoch(2);

        assert_eq!(population.genomes().len(), 5);
        assert_eq!(population.genomes()[0], best);
        assert_eq!(population.genomes()[1], second);
        for child in &population.genomes()[2..] {
            assert!(child.fitness().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_epoch_with_more_elites_than_genomes() {
        let mut population = Population::new(3, 2, 1, 3).unwrap();
        let before: Vec<_> = population.genomes().to_vec();
        population.epoch(10);
        assert_eq!(population.genomes(), before);
    }

    #[test]
    fn test_epoch_children_are_valid() {
        let params = NeatParams {
            add_node_prob: 0.5,
            add_connection_prob: 0.5,
            ..NeatParams::default()
        };
        let mut population = Population::with_params(20, 4, 1, 5, params).unwrap();
        for _ in 0..10 {
            population.epoch(2);
        }
        for genome in population.genomes() {
            assert!(Genome::new(genome.nodes().to_vec(), genome.connections().to_vec()).is_ok());
        }
        assert!(population.counters().peek_node_id() > 1000);
    }

    #[test]
    fn test_sample_rank_is_biased_toward_top() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut counts = [0_usize; 4];
        for _ in 0..4000 {
            counts[sample_rank(&mut rng, 4)] += 1;
        }
        assert!(counts[0] > counts[1]);
        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[3]);
    }

    #[test]
    fn test_parallel_and_serial_evaluation_agree() {
        let evaluator = FitnessEvaluator::new(GameParams {
            max_pieces: 60,
            garbage_interval: 25,
        });
        let mut parallel = Population::new(4, 4, 1, 11).unwrap();
        let mut serial = parallel.clone();

        parallel
            .evaluate_fitness(&evaluator, |g| game_seeds(1, g, 2))
            .unwrap();
        serial
            .evaluate_fitness_serial(&evaluator, |g| game_seeds(1, g, 2))
            .unwrap();

        assert_eq!(parallel.genomes(), serial.genomes());
        let stats = parallel.fitness_stats();
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!((parallel.best().fitness() - stats.max).abs() < f64::EPSILON);
    }
}
