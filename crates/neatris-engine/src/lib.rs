//! Deterministic block-stacking game simulation.
//!
//! - [`core`] - board occupancy grid and piece geometry
//! - [`engine`] - seeded piece bag, game sessions and statistics

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Error returned when a piece cannot be committed to a game session.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlacementError {
    #[display("piece {piece} collides with the board")]
    PieceCollision { piece: Piece },
    #[display("expected a {expected} piece, got {found}")]
    UnexpectedPiece { expected: PieceKind, found: PieceKind },
    #[display("no piece has been drawn")]
    NoCurrentPiece,
    #[display("game session has already ended")]
    SessionEnded,
}
