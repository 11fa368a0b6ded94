//! Gene types of a genome.
//!
//! - [`NodeGene`]: a neuron identified by a [`NodeId`]
//! - [`ConnectionGene`]: a weighted link tagged with an [`Innovation`] number

/// Identifier of a node, unique within a genome.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
)]
pub struct NodeId(pub u32);

/// Historical marker of the structural mutation that created a connection.
///
/// Numbers are handed out in increasing order by [`InnovationCounters`], so
/// genes from different genomes sharing a number share an ancestor.
///
/// [`InnovationCounters`]: crate::innovation::InnovationCounters
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
)]
pub struct Innovation(pub u32);

/// The role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum NodeKind {
    /// Receives one feature value.
    Input,
    /// Added by mutation; squashed each pass.
    Hidden,
    /// Squashed each pass; the score is the largest output value.
    Output,
    /// Always 1.0.
    Bias,
}

impl NodeKind {
    /// Returns the numeric code used by the text format.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            NodeKind::Input => 0,
            NodeKind::Hidden => 1,
            NodeKind::Output => 2,
            NodeKind::Bias => 3,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NodeKind::Input),
            1 => Some(NodeKind::Hidden),
            2 => Some(NodeKind::Output),
            3 => Some(NodeKind::Bias),
            _ => None,
        }
    }

    /// Position of the node kind in the feed direction.
    ///
    /// Inputs and the bias come first, then hidden nodes, then outputs. A new
    /// connection always runs from the lower rank to the higher (or equal) one.
    #[must_use]
    pub const fn layer_rank(self) -> u8 {
        match self {
            NodeKind::Input | NodeKind::Bias => 0,
            NodeKind::Hidden => 1,
            NodeKind::Output => 2,
        }
    }

    /// Returns whether the node's value is set from outside instead of computed.
    #[must_use]
    pub const fn is_sensor(self) -> bool {
        matches!(self, NodeKind::Input | NodeKind::Bias)
    }

    /// Returns whether the sigmoid is applied to this node after each pass.
    #[must_use]
    pub const fn is_activated(self) -> bool {
        matches!(self, NodeKind::Hidden | NodeKind::Output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeGene {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl NodeGene {
    #[must_use]
    pub const fn new(id: NodeId, kind: NodeKind) -> Self {
        Self { id, kind }
    }
}

/// A weighted link between two nodes.
///
/// Disabled connections are skipped during evaluation but kept for crossover
/// alignment and duplicate checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionGene {
    pub innovation: Innovation,
    pub source: NodeId,
    pub destination: NodeId,
    pub weight: f64,
    pub enabled: bool,
}

impl ConnectionGene {
    /// Creates an enabled connection.
    #[must_use]
    pub const fn new(
        innovation: Innovation,
        source: NodeId,
        destination: NodeId,
        weight: f64,
    ) -> Self {
        Self {
            innovation,
            source,
            destination,
            weight,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_codes() {
        for kind in [
            NodeKind::Input,
            NodeKind::Hidden,
            NodeKind::Output,
            NodeKind::Bias,
        ] {
            assert_eq!(NodeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(NodeKind::from_code(4), None);
    }

    #[test]
    fn test_layer_rank_orders_bias_with_inputs() {
        assert_eq!(NodeKind::Bias.layer_rank(), NodeKind::Input.layer_rank());
        assert!(NodeKind::Bias.layer_rank() < NodeKind::Hidden.layer_rank());
        assert!(NodeKind::Hidden.layer_rank() < NodeKind::Output.layer_rank());
    }

    #[test]
    fn test_ids_parse_and_display() {
        let id: NodeId = "1004".parse().unwrap();
        assert_eq!(id, NodeId(1004));
        assert_eq!(Innovation(17).to_string(), "17");
    }
}
