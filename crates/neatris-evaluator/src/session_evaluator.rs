//! Session evaluation: playing whole games to measure an evaluator.
//!
//! A [`SessionEvaluator`] plays complete seeded games with a
//! [`TurnEvaluator`] and reports their statistics. Training uses the total
//! number of cleared lines over a few games as fitness.
//!
//! Games are deterministic: the same evaluator and seed always produce the
//! same [`GameStats`].

use neatris_engine::{GameParams, GameSession, GameStats, PlacementError};

use crate::turn_evaluator::TurnEvaluator;

/// Plays seeded games with fixed limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionEvaluator {
    params: GameParams,
}

impl SessionEvaluator {
    #[must_use]
    pub fn new(params: GameParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &GameParams {
        &self.params
    }

    /// Plays one game from `seed` and returns the finished session.
    pub fn play_session(
        &self,
        turn_evaluator: &TurnEvaluator,
        seed: u64,
    ) -> Result<GameSession, PlacementError> {
        let mut session = GameSession::with_seed(seed, self.params);
        turn_evaluator.play_session(&mut session, |_, _| {})?;
        Ok(session)
    }

    /// Plays one game from `seed` and returns its statistics.
    pub fn play_and_evaluate_session(
        &self,
        turn_evaluator: &TurnEvaluator,
        seed: u64,
    ) -> Result<GameStats, PlacementError> {
        let session = self.play_session(turn_evaluator, seed)?;
        Ok(session.stats().clone())
    }

    /// Plays one game per seed and returns the total number of cleared lines.
    pub fn play_and_evaluate_sessions<I>(
        &self,
        turn_evaluator: &TurnEvaluator,
        seeds: I,
    ) -> Result<usize, PlacementError>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut total_lines = 0;
        for seed in seeds {
            let stats = self.play_and_evaluate_session(turn_evaluator, seed)?;
            total_lines += stats.total_cleared_lines();
        }
        Ok(total_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{placement_evaluator::PlacementEvaluator, placement_search::Placement};

    #[derive(Debug)]
    struct Flat;

    impl PlacementEvaluator for Flat {
        #[expect(clippy::cast_precision_loss)]
        fn evaluate_placement(&self, placement: &Placement) -> f64 {
            placement.lines_cleared() as f64
                - 0.5 * f64::from(placement.aggregate_height())
                - 0.35 * f64::from(placement.hole_count())
                - 0.2 * f64::from(placement.bumpiness())
        }
    }

    #[test]
    fn test_games_are_deterministic() {
        let evaluator = SessionEvaluator::new(GameParams {
            max_pieces: 120,
            garbage_interval: 25,
        });
        let turn_evaluator = TurnEvaluator::new(Box::new(Flat));
        let a = evaluator
            .play_and_evaluate_session(&turn_evaluator, 2024)
            .unwrap();
        let b = evaluator
            .play_and_evaluate_session(&turn_evaluator, 2024)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_total_lines_sum_over_games() {
        let evaluator = SessionEvaluator::new(GameParams {
            max_pieces: 60,
            garbage_interval: 25,
        });
        let turn_evaluator = TurnEvaluator::new(Box::new(Flat));
        let seeds = [1, 2, 3];
        let expected: usize = seeds
            .iter()
            .map(|seed| {
                evaluator
                    .play_and_evaluate_session(&turn_evaluator, *seed)
                    .unwrap()
                    .total_cleared_lines()
            })
            .sum();
        let total = evaluator
            .play_and_evaluate_sessions(&turn_evaluator, seeds)
            .unwrap();
        assert_eq!(total, expected);
    }

    #[test]
    fn test_heuristic_player_clears_lines() {
        let evaluator = SessionEvaluator::default();
        let turn_evaluator = TurnEvaluator::new(Box::new(Flat));
        let stats = evaluator
            .play_and_evaluate_session(&turn_evaluator, 7)
            .unwrap();
        assert!(stats.completed_pieces() > 0);
        assert!(stats.total_cleared_lines() > 0);
    }
}
