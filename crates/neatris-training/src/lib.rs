//! Training system that evolves placement-scoring networks.
//!
//! Networks are evolved with a simplified NEAT-style genetic algorithm: the
//! structure of each network grows through mutation, and connections carry
//! innovation numbers so that genes of related networks line up during
//! crossover.
//!
//! # How Training Works
//!
//! 1. **Population** - genomes connect every input and the bias directly to
//!    every output
//! 2. **Evaluation** - each genome plays seeded games, choosing every
//!    placement by scoring its feature vector
//! 3. **Fitness** - total lines cleared over those games
//! 4. **Epoch** - elites survive; the rest are children of biased parent
//!    draws, crossed over and mutated
//! 5. **Repeat** - the orchestrator loops and saves state between generations
//!
//! # Architecture
//!
//! ```text
//! Population (genomes, rng, innovation counters)
//!     ↓ epoch
//! Crossover + Mutation
//!     ↓ produce
//! Genome (node and connection genes)
//!     ↓ scores placements for
//! Turn Evaluator (neatris-evaluator)
//!     ↓ played by
//! Fitness Evaluator (lines cleared)
//! ```
//!
//! # Modules
//!
//! - [`gene`] - node and connection genes
//! - [`innovation`] - innovation numbers and hidden node ids
//! - [`genome`] - genomes and the fixed-pass network evaluation
//! - [`mutation`] - weight and structural mutation
//! - [`crossover`] - innovation-aligned recombination
//! - [`population`] - generations and the epoch step
//! - [`fitness`] - playing games with a genome
//! - [`persistence`] - text format for genomes and populations
//!
//! # Current Limitations
//!
//! - **No speciation**: there is no species clustering or fitness sharing,
//!   so new structure competes with tuned weights from the start
//! - **No innovation cache**: the same structural mutation in two genomes of
//!   one generation gets two innovation numbers

pub mod crossover;
pub mod fitness;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod mutation;
pub mod persistence;
pub mod population;
