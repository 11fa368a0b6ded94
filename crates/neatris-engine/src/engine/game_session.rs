use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    PlacementError,
    core::{
        board::Board,
        piece::{Piece, PieceKind},
    },
};

use super::{GameStats, piece_bag::PieceBag};

/// PCG stream garbage-row holes are drawn from.
const GARBAGE_STREAM: u64 = 0x6a4b;

/// Limits of a simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameParams {
    /// Game ends once this many pieces have been locked.
    pub max_pieces: usize,
    /// A garbage row is pushed in after every `garbage_interval` locked pieces.
    ///
    /// `0` disables garbage.
    pub garbage_interval: usize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            max_pieces: 500,
            garbage_interval: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Playing,
    /// A locked piece left a block in the top row.
    ToppedOut,
    /// The drawn piece had no legal resting position.
    NoPlacement,
    PieceLimitReached,
}

/// One deterministic game.
///
/// Everything random in a game (the piece sequence and the garbage holes)
/// is derived from the seed passed to [`GameSession::with_seed`], so two
/// sessions with the same seed fed the same placements stay identical.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    bag: PieceBag,
    garbage_rng: Pcg32,
    current_piece: Option<PieceKind>,
    stats: GameStats,
    params: GameParams,
    state: SessionState,
}

impl GameSession {
    #[must_use]
    pub fn with_seed(seed: u64, params: GameParams) -> Self {
        let state = if params.max_pieces == 0 {
            SessionState::PieceLimitReached
        } else {
            SessionState::Playing
        };
        Self {
            board: Board::EMPTY,
            bag: PieceBag::with_seed(seed),
            garbage_rng: Pcg32::new(seed, GARBAGE_STREAM),
            current_piece: None,
            stats: GameStats::new(),
            params,
            state,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn params(&self) -> &GameParams {
        &self.params
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the piece drawn by [`Self::next_piece`] that is awaiting placement.
    #[must_use]
    pub fn current_piece(&self) -> Option<PieceKind> {
        self.current_piece
    }

    /// Returns the piece to place next, drawing it from the bag if needed.
    ///
    /// Returns `None` once the game has ended. Calling this again before the
    /// piece is placed returns the same piece.
    pub fn next_piece(&mut self) -> Option<PieceKind> {
        if !self.state.is_playing() {
            return None;
        }
        Some(*self.current_piece.get_or_insert_with(|| self.bag.pop_next()))
    }

    /// Locks the current piece at its resting position and advances the game.
    ///
    /// Clears completed lines, records statistics, pushes a garbage row when
    /// the piece count reaches a multiple of the garbage interval, then ends
    /// the game if the top row is occupied or the piece limit is reached.
    /// Returns the number of lines the piece cleared.
    pub fn complete_placement(&mut self, piece: Piece) -> Result<usize, PlacementError> {
        if !self.state.is_playing() {
            return Err(PlacementError::SessionEnded);
        }
        let expected = self.current_piece.ok_or(PlacementError::NoCurrentPiece)?;
        if piece.kind() != expected {
            return Err(PlacementError::UnexpectedPiece {
                expected,
                found: piece.kind(),
            });
        }
        if self.board.is_colliding(piece) {
            return Err(PlacementError::PieceCollision { piece });
        }

        self.current_piece = None;
        self.board.fill_piece(piece);
        let cleared_lines = self.board.clear_lines();
        self.stats.complete_placement(cleared_lines);

        let completed = self.stats.completed_pieces();
        if self.params.garbage_interval > 0 && completed % self.params.garbage_interval == 0 {
            self.board.add_garbage_row(&mut self.garbage_rng);
            self.stats.add_garbage_row();
        }

        if self.board.is_game_over() {
            self.state = SessionState::ToppedOut;
        } else if completed >= self.params.max_pieces {
            self.state = SessionState::PieceLimitReached;
        }
        Ok(cleared_lines)
    }

    /// Ends the game because the current piece has nowhere to go.
    pub fn end_without_placement(&mut self) {
        if self.state.is_playing() {
            self.current_piece = None;
            self.state = SessionState::NoPlacement;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::{PiecePosition, PieceRotation};

    fn drop_at(session: &GameSession, kind: PieceKind, x: i8) -> Piece {
        Piece::new(kind, PieceRotation::default(), PiecePosition::new(x, -4))
            .simulate_drop_position(session.board())
    }

    #[test]
    fn test_same_seed_same_game() {
        let params = GameParams::default();
        let mut a = GameSession::with_seed(3, params);
        let mut b = GameSession::with_seed(3, params);
        for i in 0..30 {
            let kind = a.next_piece().unwrap();
            assert_eq!(Some(kind), b.next_piece());
            let x = i8::try_from(i % 12).unwrap();
            let piece = drop_at(&a, kind, x);
            if a.board().is_colliding(piece) {
                break;
            }
            assert_eq!(
                a.complete_placement(piece).unwrap(),
                b.complete_placement(piece).unwrap()
            );
            assert_eq!(a.board(), b.board());
            if !a.state().is_playing() {
                break;
            }
        }
    }

    #[test]
    fn test_next_piece_is_stable_until_placed() {
        let mut session = GameSession::with_seed(11, GameParams::default());
        let first = session.next_piece();
        assert_eq!(session.next_piece(), first);
        assert_eq!(session.current_piece(), first);
    }

    #[test]
    fn test_rejects_wrong_piece_kind() {
        let mut session = GameSession::with_seed(11, GameParams::default());
        let kind = session.next_piece().unwrap();
        let other = PieceKind::ALL
            .into_iter()
            .find(|k| *k != kind)
            .unwrap();
        let piece = drop_at(&session, other, 4);
        assert!(matches!(
            session.complete_placement(piece),
            Err(PlacementError::UnexpectedPiece { .. })
        ));
    }

    #[test]
    fn test_rejects_placement_without_draw() {
        let mut session = GameSession::with_seed(11, GameParams::default());
        let piece = drop_at(&session, PieceKind::O, 4);
        assert!(matches!(
            session.complete_placement(piece),
            Err(PlacementError::NoCurrentPiece)
        ));
    }

    #[test]
    fn test_garbage_every_interval() {
        let params = GameParams {
            max_pieces: 10,
            garbage_interval: 2,
        };
        let mut session = GameSession::with_seed(8, params);
        for i in 0..4 {
            let kind = session.next_piece().unwrap();
            let x = if i % 2 == 0 { 0 } else { 8 };
            let piece = drop_at(&session, kind, x);
            session.complete_placement(piece).unwrap();
        }
        assert_eq!(session.stats().garbage_rows(), 2);
    }

    #[test]
    fn test_piece_limit_ends_game() {
        let params = GameParams {
            max_pieces: 1,
            garbage_interval: 0,
        };
        let mut session = GameSession::with_seed(8, params);
        let kind = session.next_piece().unwrap();
        let piece = drop_at(&session, kind, 4);
        session.complete_placement(piece).unwrap();
        assert!(session.state().is_piece_limit_reached());
        assert_eq!(session.next_piece(), None);
    }

    #[test]
    fn test_zero_piece_limit() {
        let params = GameParams {
            max_pieces: 0,
            garbage_interval: 25,
        };
        let mut session = GameSession::with_seed(8, params);
        assert_eq!(session.next_piece(), None);
    }

    #[test]
    fn test_end_without_placement() {
        let mut session = GameSession::with_seed(8, GameParams::default());
        session.next_piece();
        session.end_without_placement();
        assert!(session.state().is_no_placement());
        assert_eq!(session.next_piece(), None);
    }
}
