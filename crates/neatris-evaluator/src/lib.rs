//! Evaluator system for choosing piece placements and playing whole games.
//!
//! # Architecture
//!
//! ```text
//! Session Evaluation (play seeded games, report statistics)
//!     ↓ uses
//! Turn Evaluation (select best placement)
//!     ↓ uses
//! Placement Evaluation (score single placement)
//!     ↓ reads
//! Placement Search (legal drops annotated with board metrics)
//! ```
//!
//! - [`placement_search`] - enumerates every legal drop of a piece and the
//!   surface metrics (aggregate height, holes, bumpiness, cleared lines) each
//!   would leave behind
//! - [`board_analysis`] - lazily computed board metrics used by the search
//! - [`placement_evaluator`] - the scoring seam implemented by trained networks
//! - [`turn_evaluator`] - greedy best-placement selection and the game loop
//! - [`session_evaluator`] - seeded games played to completion

pub mod board_analysis;
pub mod placement_evaluator;
pub mod placement_search;
pub mod session_evaluator;
pub mod turn_evaluator;
