//! Text format for genomes and populations.
//!
//! The format is whitespace separated; line breaks are only for readability.
//!
//! ```text
//! genome     := node-count node* connection-count connection*
//! node       := id kind                       (kind: 0 input, 1 hidden, 2 output, 3 bias)
//! connection := innovation source destination weight enabled   (enabled: 0 or 1)
//! population := next-innovation next-node-id genome-count genome*
//! ```
//!
//! Weights are written in their shortest round-trip form, so reading back
//! what was written gives the same genes exactly. Fitness and the random
//! stream of a population are not saved.

use std::{
    io::{self, Read, Write},
    str::{FromStr, SplitWhitespace},
};

use crate::{
    gene::{ConnectionGene, Innovation, NodeGene, NodeId, NodeKind},
    genome::{Genome, GenomeError},
    innovation::InnovationCounters,
    population::Population,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PersistenceError {
    #[display("I/O error: {_0}")]
    Io(io::Error),
    #[display("corrupt state at token {position}: {reason}")]
    CorruptState {
        position: usize,
        reason: CorruptReason,
    },
}

/// What was wrong with a saved state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CorruptReason {
    #[display("unexpected end of input")]
    MissingToken,
    #[display("invalid number {token:?}")]
    InvalidNumber { token: String },
    #[display("unknown node kind {code}")]
    UnknownNodeKind { code: u8 },
    #[display("invalid enabled flag {token:?}")]
    InvalidEnabledFlag { token: String },
    #[display("unexpected data after the end")]
    TrailingData,
    #[display("population has no genomes")]
    NoGenomes,
    #[display("next node id {next} is not above existing node {existing}")]
    StaleNodeIdCounter { next: u32, existing: NodeId },
    #[display("next innovation {next} is not above existing innovation {existing}")]
    StaleInnovationCounter { next: u32, existing: Innovation },
    #[display("{_0}")]
    Genome(GenomeError),
}

impl PersistenceError {
    /// Returns the reason if the error is about the content of the state.
    #[must_use]
    pub fn corrupt_reason(&self) -> Option<&CorruptReason> {
        match self {
            PersistenceError::Io(_) => None,
            PersistenceError::CorruptState { reason, .. } => Some(reason),
        }
    }
}

struct TokenReader<'a> {
    tokens: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> TokenReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            tokens: text.split_whitespace(),
            position: 0,
        }
    }

    fn corrupt(&self, reason: CorruptReason) -> PersistenceError {
        PersistenceError::CorruptState {
            position: self.position,
            reason,
        }
    }

    fn next_token(&mut self) -> Result<&'a str, PersistenceError> {
        let token = self
            .tokens
            .next()
            .ok_or_else(|| self.corrupt(CorruptReason::MissingToken))?;
        self.position += 1;
        Ok(token)
    }

    fn next_number<T>(&mut self) -> Result<T, PersistenceError>
    where
        T: FromStr,
    {
        let token = self.next_token()?;
        token.parse().map_err(|_| {
            self.corrupt(CorruptReason::InvalidNumber {
                token: token.to_owned(),
            })
        })
    }

    fn finish(mut self) -> Result<(), PersistenceError> {
        if self.tokens.next().is_some() {
            self.position += 1;
            return Err(self.corrupt(CorruptReason::TrailingData));
        }
        Ok(())
    }

    fn read_genome(&mut self) -> Result<Genome, PersistenceError> {
        let node_count: usize = self.next_number()?;
        let mut nodes = Vec::new();
        for _ in 0..node_count {
            let id = NodeId(self.next_number()?);
            let code = self.next_number()?;
            let kind = NodeKind::from_code(code)
                .ok_or_else(|| self.corrupt(CorruptReason::UnknownNodeKind { code }))?;
            nodes.push(NodeGene::new(id, kind));
        }

        let connection_count: usize = self.next_number()?;
        let mut connections = Vec::new();
        for _ in 0..connection_count {
            let innovation = Innovation(self.next_number()?);
            let source = NodeId(self.next_number()?);
            let destination = NodeId(self.next_number()?);
            let weight = self.next_number()?;
            let enabled = match self.next_token()? {
                "0" => false,
                "1" => true,
                token => {
                    return Err(self.corrupt(CorruptReason::InvalidEnabledFlag {
                        token: token.to_owned(),
                    }));
                }
            };
            connections.push(ConnectionGene {
                innovation,
                source,
                destination,
                weight,
                enabled,
            });
        }

        Genome::new(nodes, connections).map_err(|e| self.corrupt(CorruptReason::Genome(e)))
    }
}

fn read_to_string<R>(mut reader: R) -> Result<String, PersistenceError>
where
    R: Read,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(PersistenceError::Io)?;
    Ok(text)
}

impl Genome {
    pub fn write_text<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        writeln!(writer, "{}", self.nodes().len())?;
        for node in self.nodes() {
            writeln!(writer, "{} {}", node.id, node.kind.code())?;
        }
        writeln!(writer, "{}", self.connections().len())?;
        for conn in self.connections() {
            writeln!(
                writer,
                "{} {} {} {} {}",
                conn.innovation,
                conn.source,
                conn.destination,
                conn.weight,
                u8::from(conn.enabled)
            )?;
        }
        Ok(())
    }

    /// Parses one genome. The fitness of the result is 0.
    pub fn from_text(text: &str) -> Result<Self, PersistenceError> {
        let mut reader = TokenReader::new(text);
        let genome = reader.read_genome()?;
        reader.finish()?;
        Ok(genome)
    }

    pub fn read_text<R>(reader: R) -> Result<Self, PersistenceError>
    where
        R: Read,
    {
        Self::from_text(&read_to_string(reader)?)
    }
}

impl Population {
    pub fn write_text<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        let counters = self.counters();
        writeln!(
            writer,
            "{} {}",
            counters.peek_innovation(),
            counters.peek_node_id()
        )?;
        writeln!(writer, "{}", self.genomes().len())?;
        for genome in self.genomes() {
            genome.write_text(writer)?;
        }
        Ok(())
    }

    /// Parses a population, seeding its random stream with `seed`.
    pub fn from_text(text: &str, seed: u64) -> Result<Self, PersistenceError> {
        let mut reader = TokenReader::new(text);
        let next_innovation: u32 = reader.next_number()?;
        let innovation_position = reader.position;
        let next_node_id: u32 = reader.next_number()?;
        let node_id_position = reader.position;
        let genome_count: usize = reader.next_number()?;
        let count_position = reader.position;
        if genome_count == 0 {
            return Err(reader.corrupt(CorruptReason::NoGenomes));
        }
        let genomes = (0..genome_count)
            .map(|_| reader.read_genome())
            .collect::<Result<Vec<_>, _>>()?;
        reader.finish()?;

        // New genes must not reuse an id or innovation already present.
        let max_node = genomes
            .iter()
            .flat_map(|g| g.nodes().iter().map(|n| n.id))
            .max();
        if let Some(existing) = max_node.filter(|id| next_node_id <= id.0) {
            return Err(PersistenceError::CorruptState {
                position: node_id_position,
                reason: CorruptReason::StaleNodeIdCounter {
                    next: next_node_id,
                    existing,
                },
            });
        }
        let max_innovation = genomes
            .iter()
            .flat_map(|g| g.connections().iter().map(|c| c.innovation))
            .max();
        if let Some(existing) = max_innovation.filter(|inn| next_innovation <= inn.0) {
            return Err(PersistenceError::CorruptState {
                position: innovation_position,
                reason: CorruptReason::StaleInnovationCounter {
                    next: next_innovation,
                    existing,
                },
            });
        }

        let counters = InnovationCounters::new(next_innovation, next_node_id);
        Population::from_parts(genomes, counters, seed).map_err(|_| {
            PersistenceError::CorruptState {
                position: count_position,
                reason: CorruptReason::NoGenomes,
            }
        })
    }

    pub fn read_text<R>(reader: R, seed: u64) -> Result<Self, PersistenceError>
    where
        R: Read,
    {
        Self::from_text(&read_to_string(reader)?, seed)
    }
}
