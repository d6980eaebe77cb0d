//! Fact tree built from a computed detail
//!
//! Presentation layers do not read `FrameStatistics` directly. They walk a
//! small tree of typed facts, so every front end shows the same facts in the
//! same order and only decides how to word and draw them.

use crate::j1939::{J1939Fields, PduFormat};
use crate::session::Detail;
use serde::Serialize;

/// A single fact about the selected identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    /// Root: the identifier the tree describes
    Identifier { id: u32, extended: bool },
    /// J1939 PDU2 message sent to all nodes
    BroadcastFrame,
    /// J1939 PDU1 destination address
    Destination { address: u16 },
    SourceAddress { address: u8 },
    Pgn { pgn: u32 },
    PduFormat { pf: u8 },
    PduSpecific { ps: u8 },
    /// Number of matching frames
    FrameCount { count: usize },
    DataLength { min: u8, max: u8 },
    /// Mean inter-frame gap; `None` when a single frame matched
    AverageInterval { micros: Option<u64> },
    /// Group node for one byte position
    DataByte { position: usize },
    ChangedBits { mask: u8 },
    Range { min: u8, max: u8 },
    /// Group node for the non-zero value counts of one byte position
    Histogram,
    ValueCount { value: u8, count: u32 },
    /// Group node for per-bit set counts
    BitfieldHistogram,
    BitCount { index: usize, count: u32 },
}

/// A fact with its child facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactNode {
    pub fact: Fact,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FactNode>,
}

impl FactNode {
    /// Leaf node
    pub fn leaf(fact: Fact) -> Self {
        Self {
            fact,
            children: Vec::new(),
        }
    }

    /// Node with children
    pub fn with_children(fact: Fact, children: Vec<FactNode>) -> Self {
        Self { fact, children }
    }

    /// Total number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(FactNode::node_count).sum::<usize>()
    }

    /// First direct child matching `predicate`
    pub fn find_child(&self, predicate: impl Fn(&Fact) -> bool) -> Option<&FactNode> {
        self.children.iter().find(|c| predicate(&c.fact))
    }
}

/// Build the fact tree for a computed detail
pub fn build_fact_tree(detail: &Detail) -> FactNode {
    let stats = &detail.stats;
    let mut children = Vec::new();

    if let Some(j1939) = &detail.j1939 {
        children.extend(j1939_facts(j1939));
    }

    children.push(FactNode::leaf(Fact::FrameCount { count: stats.count() }));
    children.push(FactNode::leaf(Fact::DataLength {
        min: stats.min_length(),
        max: stats.max_length(),
    }));
    children.push(FactNode::leaf(Fact::AverageInterval {
        micros: stats.avg_interval_us(),
    }));

    for byte in stats.bytes() {
        let histogram = byte
            .observed_values()
            .map(|(value, count)| FactNode::leaf(Fact::ValueCount { value, count }))
            .collect();

        children.push(FactNode::with_children(
            Fact::DataByte { position: byte.position },
            vec![
                FactNode::leaf(Fact::ChangedBits { mask: byte.changed_bits }),
                FactNode::leaf(Fact::Range { min: byte.min, max: byte.max }),
                FactNode::with_children(Fact::Histogram, histogram),
            ],
        ));
    }

    let bits = stats
        .bit_histogram()
        .iter()
        .enumerate()
        .map(|(index, &count)| FactNode::leaf(Fact::BitCount { index, count }))
        .collect();
    children.push(FactNode::with_children(Fact::BitfieldHistogram, bits));

    FactNode::with_children(
        Fact::Identifier {
            id: detail.id,
            extended: stats.extended(),
        },
        children,
    )
}

fn j1939_facts(j1939: &J1939Fields) -> Vec<FactNode> {
    let addressing = match j1939.pdu_format() {
        PduFormat::Pdu2 => Fact::BroadcastFrame,
        PduFormat::Pdu1 => Fact::Destination { address: j1939.destination },
    };

    vec![
        FactNode::leaf(addressing),
        FactNode::leaf(Fact::SourceAddress { address: j1939.source_address }),
        FactNode::leaf(Fact::Pgn { pgn: j1939.pgn }),
        FactNode::leaf(Fact::PduFormat { pf: j1939.pf }),
        FactNode::leaf(Fact::PduSpecific { ps: j1939.ps }),
    ]
}
