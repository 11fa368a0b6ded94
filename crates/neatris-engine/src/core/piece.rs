use std::{fmt, iter};

use arrayvec::ArrayVec;

use super::{BOARD_HEIGHT, board::Board};

/// Row a piece is tested at to decide whether it can enter the board at all.
pub const PIECE_SPAWN_Y: i8 = -2;
/// Row hard drops start scanning from.
pub const PIECE_DROP_START_Y: i8 = -4;
/// Leftmost column a piece's 4×4 box may be anchored at.
///
/// Masks may have empty leading columns, so the box has to be allowed to
/// hang over the left wall for the piece itself to reach column 0.
pub const PIECE_MIN_X: i8 = -3;

/// A piece kind at a specific rotation and position.
///
/// Pieces are immutable - movement operations return new `Piece` instances.
///
/// # Coordinate System
///
/// - Position is the top-left corner of the piece's 4×4 box
/// - X increases rightward, Y increases downward
/// - Coordinates are signed: the box may hang over the left wall or above
///   the top of the board
///
/// # Example
///
/// ```
/// use neatris_engine::{Board, Piece, PieceKind, PiecePosition, PieceRotation};
///
/// let piece = Piece::new(PieceKind::O, PieceRotation::default(), PiecePosition::new(0, -4));
/// let dropped = piece.simulate_drop_position(&Board::EMPTY);
/// assert_eq!(dropped.position().y(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        )
    }
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, position: PiecePosition) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    /// Creates a piece at the spawn row in the given column.
    #[must_use]
    pub const fn spawn(kind: PieceKind, rotation: PieceRotation, x: i8) -> Self {
        Self::new(kind, rotation, PiecePosition::new(x, PIECE_SPAWN_Y))
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn mask(&self) -> PieceMask {
        self.kind.mask(self.rotation)
    }

    /// Returns the board coordinates of the piece's filled cells.
    ///
    /// Coordinates may lie outside the board.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.kind
            .occupied_cells(self.rotation)
            .map(move |(dx, dy)| (self.position.x() + dx, self.position.y() + dy))
    }

    #[must_use]
    pub fn with_position(&self, position: PiecePosition) -> Self {
        Self { position, ..*self }
    }

    #[must_use]
    pub fn down(&self) -> Option<Self> {
        let new_pos = self.position.down()?;
        Some(self.with_position(new_pos))
    }

    /// Moves the piece down until the next step would collide.
    ///
    /// The piece is assumed not to collide at its current position.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while let Some(piece) = dropped.down().filter(|m| !board.is_colliding(*m)) {
            dropped = piece;
        }
        dropped
    }
}

/// Position of a piece's 4×4 box on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePosition {
    x: i8,
    y: i8,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> i32 {
        i32::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> i32 {
        i32::from(self.y)
    }

    /// Returns the position one row lower, or `None` once the box is
    /// entirely below the floor.
    #[must_use]
    pub const fn down(&self) -> Option<Self> {
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        const FLOOR: i8 = BOARD_HEIGHT as i8;
        if self.y >= FLOOR {
            None
        } else {
            Some(Self::new(self.x, self.y + 1))
        }
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Kinds with fewer than four distinct states map rotations onto their
/// distinct ones modulo the distinct count.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    #[must_use]
    pub const fn new(rotation: u8) -> Self {
        Self(rotation % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// L-piece.
    L = 3,
    /// J-piece.
    J = 4,
    /// S-piece.
    S = 5,
    /// Z-piece.
    Z = 6,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Number of rotation states that produce different shapes.
    #[must_use]
    pub const fn distinct_rotation_count(self) -> usize {
        match self {
            PieceKind::O => 1,
            PieceKind::I | PieceKind::S | PieceKind::Z => 2,
            PieceKind::T | PieceKind::L | PieceKind::J => 4,
        }
    }

    /// Returns the rotation states that produce different shapes.
    #[must_use]
    pub fn distinct_rotations(self) -> ArrayVec<PieceRotation, 4> {
        PieceRotation::ALL[..self.distinct_rotation_count()]
            .iter()
            .copied()
            .collect()
    }

    /// Returns the 4×4 bitmask of the piece in the given rotation.
    #[must_use]
    pub fn mask(self, rotation: PieceRotation) -> PieceMask {
        let state = rotation.as_usize() % self.distinct_rotation_count();
        PIECE_MASKS[self as usize][state]
    }

    /// Returns an iterator of filled `(dx, dy)` offsets within the 4×4 box.
    pub fn occupied_cells(self, rotation: PieceRotation) -> impl Iterator<Item = (i32, i32)> {
        iter::zip(0.., self.mask(rotation)).flat_map(|(dy, row)| {
            (0..4)
                .filter(move |dx| row & (1 << dx) != 0)
                .map(move |dx| (dx, dy))
        })
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use neatris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
        }
    }
}

/// Bitmask of a piece within its 4×4 box.
///
/// One `u16` per box row, top to bottom; bit `dx` is set when column `dx` of
/// that row is filled.
pub type PieceMask = [u16; 4];

/// Generates all 4 rotation states of a piece mask by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I)
/// * `mask` - Initial piece mask at 0° rotation
const fn mask_rotations(size: usize, mask: PieceMask) -> [PieceMask; 4] {
    let mut rotates = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_mask = [0; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if (rotates[i - 1][size - 1 - x] & (1 << y)) != 0 {
                    new_mask[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_mask;
        i += 1;
    }
    rotates
}

const PIECE_MASKS: [[PieceMask; 4]; PieceKind::LEN] = {
    const fn m(bits: [bool; 4]) -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if bits[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: u16 = m([E; 4]);
    const O_ROW: u16 = m([E, C, C, E]);

    [
        // I-piece
        mask_rotations(4, [EEEE, m([C, C, C, C]), EEEE, EEEE]),
        // O-piece: the same shape in every state
        [[O_ROW, O_ROW, EEEE, EEEE]; 4],
        // T-piece
        mask_rotations(3, [m([E, C, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // L-piece
        mask_rotations(3, [m([E, E, C, E]), m([C, C, C, E]), EEEE, EEEE]),
        // J-piece
        mask_rotations(3, [m([C, E, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // S-piece
        mask_rotations(3, [m([E, C, C, E]), m([C, C, E, E]), EEEE, EEEE]),
        // Z-piece
        mask_rotations(3, [m([C, C, E, E]), m([E, C, C, E]), EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(kind: PieceKind, rotation: u8) -> Vec<(i32, i32)> {
        kind.occupied_cells(PieceRotation::new(rotation)).collect()
    }

    #[test]
    fn test_every_state_has_four_cells() {
        for kind in PieceKind::ALL {
            for rotation in PieceRotation::ALL {
                assert_eq!(
                    kind.occupied_cells(rotation).count(),
                    4,
                    "{kind} rotation {rotation:?}"
                );
            }
        }
    }

    #[test]
    fn test_distinct_rotation_counts() {
        assert_eq!(PieceKind::O.distinct_rotations().len(), 1);
        for kind in [PieceKind::I, PieceKind::S, PieceKind::Z] {
            assert_eq!(kind.distinct_rotations().len(), 2);
        }
        for kind in [PieceKind::T, PieceKind::L, PieceKind::J] {
            assert_eq!(kind.distinct_rotations().len(), 4);
        }
    }

    #[test]
    fn test_distinct_rotations_are_distinct() {
        for kind in PieceKind::ALL {
            let masks: Vec<_> = kind
                .distinct_rotations()
                .into_iter()
                .map(|r| kind.mask(r))
                .collect();
            for (i, a) in masks.iter().enumerate() {
                for b in &masks[i + 1..] {
                    assert_ne!(a, b, "{kind} has duplicate rotation states");
                }
            }
        }
    }

    #[test]
    fn test_rotation_wraps_to_distinct_state() {
        assert_eq!(
            PieceKind::I.mask(PieceRotation::new(2)),
            PieceKind::I.mask(PieceRotation::new(0))
        );
        assert_eq!(
            PieceKind::O.mask(PieceRotation::new(3)),
            PieceKind::O.mask(PieceRotation::new(0))
        );
    }

    #[test]
    fn test_canonical_shapes() {
        // .##.
        // ##..
        assert_eq!(cells(PieceKind::S, 0), vec![(1, 0), (2, 0), (0, 1), (1, 1)]);
        // .#..
        // .##.
        // ..#.
        assert_eq!(cells(PieceKind::S, 1), vec![(1, 0), (1, 1), (2, 1), (2, 2)]);
        // ....
        // ####
        assert_eq!(cells(PieceKind::I, 0), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
        // ..#.
        assert_eq!(cells(PieceKind::I, 1), vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
        // .##.
        // .##.
        assert_eq!(cells(PieceKind::O, 0), vec![(1, 0), (2, 0), (1, 1), (2, 1)]);
        // .#..
        // ##..
        // .#..
        assert_eq!(cells(PieceKind::T, 3), vec![(1, 0), (0, 1), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_piece_display() {
        let piece = Piece::new(
            PieceKind::S,
            PieceRotation::new(1),
            PiecePosition::new(-1, -2),
        );
        assert_eq!(piece.to_string(), "S#1@-1,-2");
    }
}
