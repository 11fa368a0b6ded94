//! Placement evaluation: scoring individual piece placements.
//!
//! A [`PlacementEvaluator`] maps one candidate [`Placement`] to a desirability
//! score. The turn evaluator calls it once per legal placement and commits
//! the highest-scoring one, so only the ordering of scores matters.
//!
//! The trained evaluator is the evolved network in the training crate; it
//! reads [`Placement::features`] and ignores everything else.

use std::fmt;

use crate::placement_search::Placement;

/// Evaluates piece placements by assigning scores.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Evaluates a placement and returns a score (higher is better).
    fn evaluate_placement(&self, placement: &Placement) -> f64;
}

impl<E> PlacementEvaluator for &E
where
    E: PlacementEvaluator + ?Sized,
{
    fn evaluate_placement(&self, placement: &Placement) -> f64 {
        (**self).evaluate_placement(placement)
    }
}
