use std::{io::Write as _, path::PathBuf, time::Instant};

use anyhow::Context;
use neatris_engine::GameParams;
use neatris_evaluator::placement_search::FEATURE_COUNT;
use neatris_training::{
    fitness::{self, FitnessEvaluator},
    genome::Genome,
    population::Population,
};

use crate::util::{self, Output};

const OUTPUT_COUNT: u32 = 1;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of genomes in a new population
    #[arg(long, default_value_t = 100)]
    population: usize,
    /// Number of generations to run
    #[arg(long, default_value_t = 50)]
    generations: u64,
    /// Number of top genomes copied unchanged into the next generation
    #[arg(long, default_value_t = 4)]
    elites: usize,
    /// Games played by each genome per generation
    #[arg(long, default_value_t = fitness::DEFAULT_GAMES_PER_GENOME)]
    games: u64,
    /// Maximum number of pieces per game
    #[arg(long, default_value_t = GameParams::default().max_pieces)]
    max_pieces: usize,
    /// Population state file, read on start if present and written every generation
    #[arg(long, default_value = "population_state.txt")]
    state: PathBuf,
    /// File the best genome of the latest generation is written to
    #[arg(long, default_value = "saved_genome.txt")]
    best: PathBuf,
    /// CSV file with one row of fitness statistics per generation
    #[arg(long, default_value = "training_log.csv")]
    log: PathBuf,
    /// Seed of the evolution random stream (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Evaluate genomes on the main thread only
    #[arg(long, default_value_t = false)]
    serial: bool,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        population: population_size,
        generations,
        elites,
        games,
        max_pieces,
        state,
        best,
        log,
        seed,
        serial,
    } = arg;

    let seed = seed.unwrap_or_else(rand::random);
    let mut population = if state.exists() {
        eprintln!("Resuming training from {}", state.display());
        util::read_population_file(state, seed)?
    } else {
        eprintln!("Starting new training session (seed: {seed})");
        let input_count = u32::try_from(FEATURE_COUNT)?;
        Population::new(*population_size, input_count, OUTPUT_COUNT, seed)?
    };
    eprintln!(
        "  Genomes: {}, next innovation: {}, next node id: {}",
        population.genomes().len(),
        population.counters().peek_innovation(),
        population.counters().peek_node_id()
    );

    let evaluator = FitnessEvaluator::new(GameParams {
        max_pieces: *max_pieces,
        ..GameParams::default()
    });

    let mut log_output = Output::open(log.clone())?;
    writeln!(
        log_output,
        "generation,average_fitness,best_fitness,best_fitness_per_game,elapsed_ms"
    )
    .with_context(|| format!("Failed to write {}", log_output.display_path()))?;

    for generation in 0..*generations {
        let start = Instant::now();
        let seeds = |genome: &Genome| fitness::game_seeds(generation, genome, *games);
        if *serial {
            population.evaluate_fitness_serial(&evaluator, seeds)?;
        } else {
            population.evaluate_fitness(&evaluator, seeds)?;
        }
        let elapsed = start.elapsed();

        let stats = population.fitness_stats();
        #[expect(clippy::cast_precision_loss)]
        let best_per_game = stats.max / (*games).max(1) as f64;
        eprintln!(
            "Generation #{generation}: time {}ms | avg fitness {:.3} | best fitness {} ({best_per_game:.3}/game)",
            elapsed.as_millis(),
            stats.mean,
            stats.max,
        );

        writeln!(
            log_output,
            "{generation},{},{},{best_per_game},{}",
            stats.mean,
            stats.max,
            elapsed.as_millis()
        )
        .and_then(|()| log_output.flush())
        .with_context(|| format!("Failed to write {}", log_output.display_path()))?;

        util::save_genome_file(population.best(), best)?;

        population.epoch(*elites);
        util::save_population_file(&population, state)?;
    }

    eprintln!();
    eprintln!("Training finished");
    eprintln!("  Best genome: {}", best.display());
    eprintln!("  Population state: {}", state.display());
    eprintln!("  Log: {}", log_output.display_path());

    Ok(())
}
