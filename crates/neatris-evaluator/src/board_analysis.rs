use std::{cell::OnceCell, iter};

use arrayvec::ArrayVec;
use neatris_engine::Board;

/// Surface metrics of a board, computed on first access.
///
/// Column height is the distance from a column's topmost occupied cell to the
/// floor, 0 for an empty column. A hole is an empty cell below the topmost
/// occupied cell of its column.
#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    column_heights: OnceCell<[u8; Board::WIDTH]>,
    column_occupied_cells: OnceCell<[u8; Board::WIDTH]>,
    aggregate_height: OnceCell<u16>,
    hole_count: OnceCell<u16>,
    bumpiness: OnceCell<u16>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self {
            board: board.clone(),
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
            aggregate_height: OnceCell::new(),
            hole_count: OnceCell::new(),
            bumpiness: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn column_heights(&self) -> &[u8; Board::WIDTH] {
        self.column_heights.get_or_init(|| {
            let mut column_heights = [0; Board::WIDTH];
            for (x, h) in column_heights.iter_mut().enumerate() {
                let Some(min_y) = self.board.rows().position(|row| row.is_cell_occupied(x)) else {
                    continue;
                };
                *h = height_from_row(min_y);
            }
            column_heights
        })
    }

    #[must_use]
    pub fn column_occupied_cells(&self) -> &[u8; Board::WIDTH] {
        self.column_occupied_cells.get_or_init(|| {
            let mut column_occupied_cells = [0; Board::WIDTH];
            for row in self.board.rows() {
                for (occupied, o) in iter::zip(row.iter_cells(), &mut column_occupied_cells) {
                    if occupied {
                        *o += 1;
                    }
                }
            }
            column_occupied_cells
        })
    }

    /// Sum of all column heights.
    #[must_use]
    pub fn aggregate_height(&self) -> u16 {
        *self.aggregate_height.get_or_init(|| {
            self.column_heights()
                .iter()
                .map(|h| u16::from(*h))
                .sum()
        })
    }

    #[must_use]
    pub fn hole_count(&self) -> u16 {
        *self.hole_count.get_or_init(|| {
            iter::zip(self.column_heights(), self.column_occupied_cells())
                .map(|(h, occ)| u16::from(h - occ))
                .sum()
        })
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> u16 {
        *self.bumpiness.get_or_init(|| {
            let heights: ArrayVec<u16, { Board::WIDTH }> = self
                .column_heights()
                .iter()
                .map(|h| u16::from(*h))
                .collect();
            heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum()
        })
    }
}

fn height_from_row(y: usize) -> u8 {
    #[expect(clippy::cast_possible_truncation)]
    let height = (Board::HEIGHT - y) as u8;
    height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let analysis = BoardAnalysis::from_board(&Board::EMPTY);
        assert_eq!(analysis.column_heights(), &[0; Board::WIDTH]);
        assert_eq!(analysis.aggregate_height(), 0);
        assert_eq!(analysis.hole_count(), 0);
        assert_eq!(analysis.bumpiness(), 0);
    }

    #[test]
    fn test_heights_holes_and_bumpiness() {
        let board = Board::from_ascii(
            "
            .#..............
            ##.#............
            #..#............
            ",
        );
        let analysis = BoardAnalysis::from_board(&board);
        let heights = analysis.column_heights();
        assert_eq!(&heights[..5], &[2, 3, 0, 2, 0]);
        assert_eq!(analysis.aggregate_height(), 7);
        // column 1: one hole under its top; column 3: none
        assert_eq!(analysis.hole_count(), 1);
        // |2-3| + |3-0| + |0-2| + |2-0|
        assert_eq!(analysis.bumpiness(), 8);
    }

    #[test]
    fn test_full_height_column() {
        let art = "#...............\n".repeat(Board::HEIGHT);
        let analysis = BoardAnalysis::from_board(&Board::from_ascii(&art));
        assert_eq!(analysis.column_heights()[0], 22);
        assert_eq!(analysis.bumpiness(), 22);
    }
}
