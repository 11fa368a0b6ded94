use std::{fmt, iter};

use rand::Rng;

use super::{BOARD_HEIGHT, BOARD_WIDTH, piece::Piece};

const FULL_ROW_MASK: u16 = u16::MAX;

/// Single row of the board.
///
/// Stores one row as a 16-bit bitmask, bit `x` set when column `x` is
/// occupied. The board is exactly 16 columns wide so every bit is playable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BitRow {
    bits: u16,
}

impl BitRow {
    pub const EMPTY: Self = Self { bits: 0 };
    pub const FULL: Self = Self {
        bits: FULL_ROW_MASK,
    };

    #[inline]
    #[must_use]
    pub fn is_filled(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub fn is_cell_occupied(self, x: usize) -> bool {
        (self.bits & (1 << x)) != 0
    }

    #[inline]
    fn occupy_cell(&mut self, x: usize) {
        self.bits |= 1 << x;
    }

    /// Iterates over all cells in the row, returning their occupied status.
    #[inline]
    pub fn iter_cells(self) -> impl Iterator<Item = bool> {
        (0..BOARD_WIDTH).map(move |x| self.is_cell_occupied(x))
    }
}

/// Shifts a 4-bit piece row so that its bit 0 lands on column `x`.
///
/// Returns `None` if any filled bit would leave the board horizontally.
fn shift_row_mask(mask: u16, x: i32) -> Option<u16> {
    if mask == 0 {
        return Some(0);
    }
    let shift = x.unsigned_abs();
    if x >= 0 {
        (mask.leading_zeros() >= shift).then(|| mask << shift)
    } else {
        (mask.trailing_zeros() >= shift).then(|| mask >> shift)
    }
}

/// Occupancy grid of the playing field.
///
/// 16 columns by 22 rows. Row 0 is the top, row 21 the bottom. Cells above
/// row 0 are treated as empty space pieces may pass through; cells outside
/// the side walls or below the floor are treated as solid.
///
/// # Example
///
/// ```
/// use neatris_engine::Board;
///
/// let mut board = Board::from_ascii("################\n#######.########");
/// assert_eq!(board.clear_lines(), 1);
/// assert!(board.row(21).is_cell_occupied(0));
/// assert!(!board.row(21).is_cell_occupied(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BitRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for occupied in row.iter_cells() {
                f.write_str(if occupied { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [BitRow::EMPTY; BOARD_HEIGHT],
    };

    #[must_use]
    pub fn row(&self, y: usize) -> BitRow {
        self.rows[y]
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows.iter().copied()
    }

    /// Returns whether the cell at `(x, y)` is occupied.
    ///
    /// Coordinates outside the grid are reported as unoccupied.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) if x < BOARD_WIDTH && y < BOARD_HEIGHT => {
                self.rows[y].is_cell_occupied(x)
            }
            _ => false,
        }
    }

    /// Checks if the piece collides with the walls, the floor or occupied cells.
    ///
    /// Cells above the top row never collide.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        for (dy, mask) in iter::zip(0_i32.., piece.mask()) {
            if mask == 0 {
                continue;
            }
            let Some(bits) = shift_row_mask(mask, x0) else {
                return true;
            };
            let Ok(y) = usize::try_from(y0 + dy) else {
                continue;
            };
            if y >= BOARD_HEIGHT || (self.rows[y].bits & bits) != 0 {
                return true;
            }
        }
        false
    }

    /// Locks a piece onto the board by setting its occupied cells.
    ///
    /// Cells outside the grid are dropped.
    pub fn fill_piece(&mut self, piece: Piece) {
        for (x, y) in piece.occupied_positions() {
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
                if x < BOARD_WIDTH && y < BOARD_HEIGHT {
                    self.rows[y].occupy_cell(x);
                }
            }
        }
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Rows above each cleared line shift down and empty rows enter at the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;

        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(BitRow::EMPTY);
        count
    }

    /// Pushes a garbage row in from the bottom.
    ///
    /// Every row moves up by one, the top row is discarded and the new bottom
    /// row is full except for a single hole at a random column.
    pub fn add_garbage_row<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.rows.copy_within(1.., 0);
        let hole = rng.random_range(0..BOARD_WIDTH);
        self.rows[BOARD_HEIGHT - 1] = BitRow {
            bits: FULL_ROW_MASK & !(1 << hole),
        };
    }

    /// Returns whether any cell in the top row is occupied.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        !self.rows[0].is_empty()
    }

    /// Creates a `Board` from ASCII art representation for testing.
    ///
    /// '#' represents an occupied cell, '.' represents an empty cell.
    /// Each row must be 16 cells wide; rows are aligned to the bottom of the
    /// board so only the interesting part needs to be drawn.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::EMPTY;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "Board must have at most {BOARD_HEIGHT} rows, got {}",
            lines.len()
        );
        let top = BOARD_HEIGHT - lines.len();

        for (y, line) in (top..).zip(&lines) {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                BOARD_WIDTH,
                "Each row must have exactly {BOARD_WIDTH} cells, got {} at row {y}",
                chars.len(),
            );

            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    board.rows[y].occupy_cell(x);
                }
            }
        }
        board
    }
}
