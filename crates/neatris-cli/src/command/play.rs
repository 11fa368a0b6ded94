use std::path::PathBuf;

use chrono::Utc;
use neatris_engine::GameParams;
use neatris_training::fitness::FitnessEvaluator;

use crate::{
    schema::play_summary::{GenomeShape, PlaySummary},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to the genome file
    #[arg(long, default_value = "saved_genome.txt")]
    genome: PathBuf,
    /// Game seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Maximum number of pieces
    #[arg(long, default_value_t = GameParams::default().max_pieces)]
    max_pieces: usize,
    /// Print the board to stderr after every placement
    #[arg(long, default_value_t = false)]
    show: bool,
    /// Output file path for the JSON summary (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        genome: genome_path,
        seed,
        max_pieces,
        show,
        output,
    } = arg;

    let genome = util::read_genome_file(genome_path)?;
    let evaluator = FitnessEvaluator::new(GameParams {
        max_pieces: *max_pieces,
        ..GameParams::default()
    });

    let session = evaluator.replay(&genome, *seed, |session, placement| {
        if *show {
            let stats = session.stats();
            eprintln!(
                "Piece #{}: {} | lines {} (total {})",
                stats.completed_pieces(),
                placement.piece(),
                placement.lines_cleared(),
                stats.total_cleared_lines(),
            );
            eprintln!("{}", session.board());
        }
    })?;

    let summary = PlaySummary {
        played_at: Utc::now(),
        genome_path: genome_path.clone(),
        genome: GenomeShape {
            nodes: genome.nodes().len(),
            connections: genome.connections().len(),
            enabled_connections: genome.connections().iter().filter(|c| c.enabled).count(),
        },
        seed: *seed,
        max_pieces: *max_pieces,
        end_state: session.state(),
        stats: session.stats().clone(),
    };

    eprintln!(
        "Game finished ({:?}): {} pieces, {} lines",
        summary.end_state,
        summary.stats.completed_pieces(),
        summary.stats.total_cleared_lines()
    );
    Output::save_json(&summary, output.clone())?;

    Ok(())
}
