use serde::Serialize;

/// Statistics of a single game.
///
/// - **Completed pieces**: total number of pieces locked
/// - **Cleared lines**: total lines removed, and how often each clear size occurred
/// - **Garbage rows**: rows pushed in from the bottom
///
/// # Example
///
/// ```
/// use neatris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_placement(4);
/// stats.complete_placement(0);
///
/// assert_eq!(stats.completed_pieces(), 2);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    garbage_rows: usize,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            garbage_rows: 0,
        }
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of line clears by count.
    ///
    /// - `[0]`: placements that cleared nothing
    /// - `[1]` to `[4]`: single, double, triple and quadruple clears
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    #[must_use]
    pub const fn garbage_rows(&self) -> usize {
        self.garbage_rows
    }

    /// Records a locked piece that cleared `cleared_lines` lines.
    pub const fn complete_placement(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_lines] += 1;
        }
    }

    pub const fn add_garbage_row(&mut self) {
        self.garbage_rows += 1;
    }
}
