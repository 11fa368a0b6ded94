//! Game engine logic and state management.
//!
//! This module drives the core data structures through a complete game:
//!
//! - [`GameSession`] - one deterministic game (board, piece bag, garbage, statistics)
//! - [`GameStats`] - per-game statistics (pieces, lines, garbage)
//! - [`PieceBag`] - seeded 7-bag piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from a game seed
//! 2. Draw the next piece with [`GameSession::next_piece`]
//! 3. Choose a resting position and commit it with [`GameSession::complete_placement`]
//! 4. Lines are cleared; every few pieces a garbage row is pushed in from the bottom
//! 5. Repeat until the top row is occupied, the piece limit is reached or no
//!    placement exists
//!
//! # Example
//!
//! ```
//! use neatris_engine::{GameParams, GameSession, Piece, PieceRotation};
//!
//! let mut session = GameSession::with_seed(42, GameParams::default());
//!
//! let kind = session.next_piece().unwrap();
//! let piece = Piece::spawn(kind, PieceRotation::default(), 4)
//!     .simulate_drop_position(session.board());
//! let cleared = session.complete_placement(piece).unwrap();
//!
//! assert_eq!(cleared, 0);
//! assert_eq!(session.stats().completed_pieces(), 1);
//! ```

pub use self::{game_session::*, game_stats::*, piece_bag::*};

mod game_session;
mod game_stats;
mod piece_bag;
