//! Fitness evaluation: playing games with a genome as the placement scorer.
//!
//! A genome scores each candidate placement from its four-value feature
//! vector. Fitness is the number of lines cleared over a few seeded games.

use std::ops::Range;

use neatris_engine::{GameParams, GameSession, PlacementError};
use neatris_evaluator::{
    placement_evaluator::PlacementEvaluator, placement_search::Placement,
    session_evaluator::SessionEvaluator, turn_evaluator::TurnEvaluator,
};

use crate::genome::Genome;

/// Default number of games played per genome and generation.
pub const DEFAULT_GAMES_PER_GENOME: u64 = 3;

impl PlacementEvaluator for Genome {
    fn evaluate_placement(&self, placement: &Placement) -> f64 {
        self.evaluate(&placement.features())
    }
}

/// Seeds of the games a genome plays in a generation.
///
/// Seed `s` of `games` is `generation * 10000 + first_node_id * 10 + s`.
/// Initial genomes all start with node 0, so every genome of a generation
/// usually plays the same games.
#[must_use]
pub fn game_seeds(generation: u64, genome: &Genome, games: u64) -> Range<u64> {
    let node = genome.first_node_id().map_or(0, |id| u64::from(id.0));
    let base = generation * 10_000 + node * 10;
    base..base + games
}

/// Plays games with a genome and counts cleared lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessEvaluator {
    session_evaluator: SessionEvaluator,
}

impl FitnessEvaluator {
    #[must_use]
    pub fn new(params: GameParams) -> Self {
        Self {
            session_evaluator: SessionEvaluator::new(params),
        }
    }

    #[must_use]
    pub fn params(&self) -> &GameParams {
        self.session_evaluator.params()
    }

    /// Plays one game and returns the lines it cleared.
    pub fn evaluate(&self, genome: &Genome, seed: u64) -> Result<usize, PlacementError> {
        let stats = self
            .session_evaluator
            .play_and_evaluate_session(&TurnEvaluator::new(Box::new(genome)), seed)?;
        Ok(stats.total_cleared_lines())
    }

    /// Plays one game per seed and returns the total lines cleared.
    pub fn evaluate_games<I>(&self, genome: &Genome, seeds: I) -> Result<usize, PlacementError>
    where
        I: IntoIterator<Item = u64>,
    {
        self.session_evaluator
            .play_and_evaluate_sessions(&TurnEvaluator::new(Box::new(genome)), seeds)
    }

    /// Plays one game and returns the finished session, calling
    /// `on_placement` with the session after every placement.
    pub fn replay<F>(
        &self,
        genome: &Genome,
        seed: u64,
        on_placement: F,
    ) -> Result<GameSession, PlacementError>
    where
        F: FnMut(&GameSession, &Placement),
    {
        let mut session = GameSession::with_seed(seed, *self.params());
        TurnEvaluator::new(Box::new(genome)).play_session(&mut session, on_placement)?;
        Ok(session)
    }
}
