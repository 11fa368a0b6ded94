//! Turn evaluation: selecting the best piece placement for the current turn.
//!
//! # How It Works
//!
//! 1. **Enumerate Placements** - every legal drop of the current piece
//!    ([`search_placements`])
//! 2. **Score Each Placement** - use the placement evaluator on each option
//! 3. **Select Best** - commit the highest score; the earliest candidate wins ties
//!
//! # Design: Greedy One-Step Lookahead
//!
//! Only the current piece is considered. The queued pieces are not looked at,
//! which keeps a turn to a few dozen evaluations.
//!
//! # Usage
//!
//! ```
//! use neatris_engine::{GameParams, GameSession};
//! use neatris_evaluator::{
//!     placement_evaluator::PlacementEvaluator, placement_search::Placement,
//!     turn_evaluator::TurnEvaluator,
//! };
//!
//! #[derive(Debug)]
//! struct LowestStack;
//!
//! impl PlacementEvaluator for LowestStack {
//!     fn evaluate_placement(&self, placement: &Placement) -> f64 {
//!         -f64::from(placement.aggregate_height())
//!     }
//! }
//!
//! let turn_evaluator = TurnEvaluator::new(Box::new(LowestStack));
//! let mut session = GameSession::with_seed(1, GameParams::default());
//! turn_evaluator.play_session(&mut session, |_, _| {}).unwrap();
//! assert!(!session.state().is_playing());
//! ```

use neatris_engine::{Board, GameSession, PieceKind, PlacementError};

use crate::{
    placement_evaluator::PlacementEvaluator,
    placement_search::{Placement, search_placements},
};

/// Evaluates and selects the best placement for the current turn.
#[derive(Debug)]
pub struct TurnEvaluator<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> TurnEvaluator<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Selects the highest-scoring placement of `kind` on `board`.
    ///
    /// Returns `None` if the piece has no legal placement, or if no placement
    /// scores above `f64::MIN`.
    #[must_use]
    pub fn select_best_placement(&self, board: &Board, kind: PieceKind) -> Option<(Placement, f64)> {
        let mut best_score = f64::MIN;
        let mut best_result = None;

        for placement in search_placements(board, kind) {
            let score = self.placement_evaluator.evaluate_placement(&placement);
            if score > best_score {
                best_score = score;
                best_result = Some((placement, score));
            }
        }

        best_result
    }

    /// Plays `session` to the end, committing the best placement each turn.
    ///
    /// `on_placement` is called after every committed placement with the
    /// updated session.
    pub fn play_session<F>(
        &self,
        session: &mut GameSession,
        mut on_placement: F,
    ) -> Result<(), PlacementError>
    where
        F: FnMut(&GameSession, &Placement),
    {
        while let Some(kind) = session.next_piece() {
            let Some((placement, _score)) = self.select_best_placement(session.board(), kind)
            else {
                session.end_without_placement();
                break;
            };
            session.complete_placement(placement.piece())?;
            on_placement(session, &placement);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use neatris_engine::{GameParams, PieceRotation};

    use super::*;

    #[derive(Debug)]
    struct Constant(f64);

    impl PlacementEvaluator for Constant {
        fn evaluate_placement(&self, _placement: &Placement) -> f64 {
            self.0
        }
    }

    #[derive(Debug)]
    struct PreferLines;

    impl PlacementEvaluator for PreferLines {
        #[expect(clippy::cast_precision_loss)]
        fn evaluate_placement(&self, placement: &Placement) -> f64 {
            placement.lines_cleared() as f64 * 10.0 - f64::from(placement.hole_count())
        }
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let evaluator = TurnEvaluator::new(Box::new(Constant(0.5)));
        let (placement, score) = evaluator
            .select_best_placement(&Board::EMPTY, PieceKind::T)
            .unwrap();
        let first = search_placements(&Board::EMPTY, PieceKind::T)[0];
        assert_eq!(placement, first);
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_scores_are_never_selected() {
        let evaluator = TurnEvaluator::new(Box::new(Constant(f64::MIN)));
        assert!(
            evaluator
                .select_best_placement(&Board::EMPTY, PieceKind::T)
                .is_none()
        );
    }

    #[test]
    fn test_selects_line_clear() {
        let board = Board::from_ascii(
            "
            ###.############
            ",
        );
        let evaluator = TurnEvaluator::new(Box::new(PreferLines));
        let (placement, _) = evaluator
            .select_best_placement(&board, PieceKind::I)
            .unwrap();
        assert_eq!(placement.lines_cleared(), 1);
        assert_eq!(placement.rotation(), PieceRotation::new(1));
    }

    #[test]
    fn test_play_session_reports_every_placement() {
        let evaluator = TurnEvaluator::new(Box::new(PreferLines));
        let params = GameParams {
            max_pieces: 40,
            garbage_interval: 25,
        };
        let mut session = GameSession::with_seed(17, params);
        let mut observed = 0;
        let mut lines = 0;
        evaluator
            .play_session(&mut session, |_, placement| {
                observed += 1;
                lines += placement.lines_cleared();
            })
            .unwrap();
        assert_eq!(observed, session.stats().completed_pieces());
        assert_eq!(lines, session.stats().total_cleared_lines());
        assert!(!session.state().is_playing());
    }
}
