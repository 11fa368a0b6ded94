use std::path::PathBuf;

use chrono::{DateTime, Utc};
use neatris_engine::{GameStats, SessionState};
use serde::Serialize;

/// Result of replaying one game with a saved genome.
#[derive(Debug, Clone, Serialize)]
pub struct PlaySummary {
    pub played_at: DateTime<Utc>,
    pub genome_path: PathBuf,
    pub genome: GenomeShape,
    pub seed: u64,
    pub max_pieces: usize,
    pub end_state: SessionState,
    pub stats: GameStats,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenomeShape {
    pub nodes: usize,
    pub connections: usize,
    pub enabled_connections: usize,
}
