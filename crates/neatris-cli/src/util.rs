use std::{
    fs::File,
    io::{self, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use neatris_training::{genome::Genome, population::Population};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Writes a file through `write`, replacing any previous content.
fn save_text_file<F>(file_kind: &str, path: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut Output) -> io::Result<()>,
{
    let mut output = Output::open(path.to_path_buf())?;
    write(&mut output)
        .and_then(|()| output.flush())
        .with_context(|| format!("Failed to write {} file: {}", file_kind, path.display()))
}

pub fn save_genome_file<P>(genome: &Genome, path: P) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    save_text_file("genome", path.as_ref(), |w| genome.write_text(w))
}

pub fn save_population_file<P>(population: &Population, path: P) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    save_text_file("population state", path.as_ref(), |w| {
        population.write_text(w)
    })
}

/// Read a genome from a text file
pub fn read_genome_file<P>(path: P) -> anyhow::Result<Genome>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open genome file: {}", path.display()))?;
    let genome = Genome::read_text(BufReader::new(file))
        .with_context(|| format!("Failed to parse genome file: {}", path.display()))?;
    Ok(genome)
}

/// Read a population state from a text file
///
/// The random stream is not part of the file; `seed` starts a new one.
pub fn read_population_file<P>(path: P, seed: u64) -> anyhow::Result<Population>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open population state file: {}", path.display()))?;
    let population = Population::read_text(BufReader::new(file), seed).with_context(|| {
        format!(
            "Failed to parse population state file: {}",
            path.display()
        )
    })?;
    Ok(population)
}
