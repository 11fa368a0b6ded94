//! Exhaustive placement enumeration for a single piece.
//!
//! For every distinct rotation of a piece and every column its 4×4 box can be
//! anchored at, the piece is dropped straight down from above the board.
//! Each legal resting position becomes a [`Placement`], annotated with the
//! surface metrics of the board it would leave behind.
//!
//! # Legality
//!
//! A (rotation, column) pair is skipped when the piece already collides at
//! the spawn row ([`PIECE_SPAWN_Y`]), either because part of it would be
//! outside the side walls or because the stack has reached the top.
//!
//! # Example
//!
//! ```
//! use neatris_engine::{Board, PieceKind};
//! use neatris_evaluator::placement_search::search_placements;
//!
//! let placements = search_placements(&Board::EMPTY, PieceKind::O);
//! // The O piece has one rotation and 15 columns it fits in.
//! assert_eq!(placements.len(), 15);
//! assert!(placements.iter().all(|p| p.lines_cleared() == 0));
//! ```

use neatris_engine::{
    Board, PIECE_DROP_START_Y, PIECE_MIN_X, PIECE_SPAWN_Y, Piece, PieceKind, PiecePosition,
    PieceRotation,
};

use crate::board_analysis::BoardAnalysis;

/// Divisor applied to the aggregate height, hole count and bumpiness features.
pub const SURFACE_FEATURE_SCALE: f64 = 400.0;
/// Divisor applied to the cleared-lines feature.
pub const LINES_FEATURE_SCALE: f64 = 4.0;
/// Number of values in [`Placement::features`].
pub const FEATURE_COUNT: usize = 4;

/// A legal resting position of a piece and the board metrics it results in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    piece: Piece,
    lines_cleared: usize,
    aggregate_height: u16,
    hole_count: u16,
    bumpiness: u16,
}

impl Placement {
    /// Analyzes the result of locking `piece` onto a copy of `before_placement`.
    #[must_use]
    pub fn from_board(before_placement: &Board, piece: Piece) -> Self {
        let mut board = before_placement.clone();
        board.fill_piece(piece);
        let lines_cleared = board.clear_lines();
        let analysis = BoardAnalysis::from_board(&board);

        Self {
            piece,
            lines_cleared,
            aggregate_height: analysis.aggregate_height(),
            hole_count: analysis.hole_count(),
            bumpiness: analysis.bumpiness(),
        }
    }

    #[must_use]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.piece.rotation()
    }

    #[must_use]
    pub fn column(&self) -> i32 {
        self.piece.position().x()
    }

    #[must_use]
    pub fn resting_row(&self) -> i32 {
        self.piece.position().y()
    }

    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.lines_cleared
    }

    #[must_use]
    pub fn aggregate_height(&self) -> u16 {
        self.aggregate_height
    }

    #[must_use]
    pub fn hole_count(&self) -> u16 {
        self.hole_count
    }

    #[must_use]
    pub fn bumpiness(&self) -> u16 {
        self.bumpiness
    }

    /// Returns the normalized network input vector:
    /// `[aggregate_height/400, holes/400, bumpiness/400, lines_cleared/4]`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.aggregate_height) / SURFACE_FEATURE_SCALE,
            f64::from(self.hole_count) / SURFACE_FEATURE_SCALE,
            f64::from(self.bumpiness) / SURFACE_FEATURE_SCALE,
            self.lines_cleared as f64 / LINES_FEATURE_SCALE,
        ]
    }

    /// Locks the placement onto `board` and clears lines, returning the cleared count.
    pub fn apply(&self, board: &mut Board) -> usize {
        board.fill_piece(self.piece);
        board.clear_lines()
    }
}

/// Enumerates every legal placement of `kind` on `board`, ordered by
/// (rotation, column).
#[must_use]
pub fn search_placements(board: &Board, kind: PieceKind) -> Vec<Placement> {
    let mut placements = vec![];
    for rotation in kind.distinct_rotations() {
        for x in column_range() {
            let spawn = Piece::new(kind, rotation, PiecePosition::new(x, PIECE_SPAWN_Y));
            if board.is_colliding(spawn) {
                continue;
            }
            let start = Piece::new(kind, rotation, PiecePosition::new(x, PIECE_DROP_START_Y));
            let resting = start.simulate_drop_position(board);
            placements.push(Placement::from_board(board, resting));
        }
    }
    placements
}

fn column_range() -> std::ops::Range<i8> {
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let width = Board::WIDTH as i8;
    PIECE_MIN_X..width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_o_piece_at_column_zero() {
        let placements = search_placements(&Board::EMPTY, PieceKind::O);
        // The O piece's box columns 1-2 are filled, so column 0 is reached at x = -1.
        let placement = placements
            .iter()
            .find(|p| p.piece().occupied_positions().any(|(x, _)| x == 0))
            .unwrap();
        assert_eq!(placement.column(), -1);
        assert_eq!(placement.resting_row(), 20);
        assert_eq!(placement.lines_cleared(), 0);
        assert_eq!(placement.hole_count(), 0);
        assert_eq!(placement.aggregate_height(), 4);
        assert_eq!(placement.bumpiness(), 2);
    }

    #[test]
    fn test_o_piece_box_at_column_zero() {
        let placements = search_placements(&Board::EMPTY, PieceKind::O);
        let placement = placements.iter().find(|p| p.column() == 0).unwrap();
        assert_eq!(placement.resting_row(), 20);
        assert_eq!(placement.lines_cleared(), 0);
        assert_eq!(placement.hole_count(), 0);
    }

    #[test]
    fn test_placement_counts_on_empty_board() {
        let expected = [
            (PieceKind::I, 13 + 16),
            (PieceKind::O, 15),
            (PieceKind::T, 2 * 14 + 2 * 15),
            (PieceKind::S, 14 + 15),
        ];
        for (kind, count) in expected {
            assert_eq!(
                search_placements(&Board::EMPTY, kind).len(),
                count,
                "{kind}"
            );
        }
    }

    #[test]
    fn test_placements_ordered_by_rotation_then_column() {
        let placements = search_placements(&Board::EMPTY, PieceKind::T);
        let keys: Vec<_> = placements
            .iter()
            .map(|p| (p.rotation(), p.column()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_every_placement_locks_inside_the_grid() {
        let boards = [
            Board::EMPTY,
            Board::from_ascii(
                "
                ....#...........
                ..###.....##....
                #####.#########.
                ",
            ),
        ];
        for board in &boards {
            for kind in PieceKind::ALL {
                for placement in search_placements(board, kind) {
                    for (x, y) in placement.piece().occupied_positions() {
                        assert!((0..16).contains(&x), "{}", placement.piece());
                        assert!((0..22).contains(&y), "{}", placement.piece());
                        assert!(!board.is_occupied(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn test_line_clear_is_detected() {
        let board = Board::from_ascii(
            "
            ###.############
            ",
        );
        // Vertical I occupies box column 2.
        let placement = search_placements(&board, PieceKind::I)
            .into_iter()
            .find(|p| p.rotation() == PieceRotation::new(1) && p.column() == 1)
            .unwrap();
        assert_eq!(placement.lines_cleared(), 1);
        assert_eq!(placement.resting_row(), 18);
        assert_eq!(placement.aggregate_height(), 3);
        assert_eq!(placement.features(), [3.0 / 400.0, 0.0, 6.0 / 400.0, 0.25]);

        let mut applied = board.clone();
        assert_eq!(placement.apply(&mut applied), 1);
        assert!(applied.is_occupied(3, 21));
        assert!(!applied.is_occupied(0, 21));
    }

    #[test]
    fn test_piece_can_rest_above_a_full_stack() {
        let art = "###############.\n".repeat(Board::HEIGHT);
        let board = Board::from_ascii(&art);
        let placements = search_placements(&board, PieceKind::O);
        assert!(!placements.is_empty());
        assert!(placements.iter().all(|p| p.resting_row() == -2));
    }
}
