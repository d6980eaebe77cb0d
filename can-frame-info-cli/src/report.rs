//! Text rendering of identifier lists and fact trees

use can_frame_info::{format_identifier, CanFrame, DisplayConfig, Fact, FactNode, IdentifierIndex};
use std::fmt::Write;

/// Header line plus one identifier per line, ascending
pub fn render_id_list(index: &IdentifierIndex, display: &DisplayConfig) -> String {
    let mut out = format!("Frame IDs: ({} unique ids)\n", index.len());
    for id in index.iter() {
        let _ = writeln!(out, "  {}", format_identifier(id, display.number_format));
    }
    out
}

/// Wall-clock span of the capture, first to last frame
///
/// `None` for an empty history.
pub fn render_capture_span(frames: &[CanFrame]) -> Option<String> {
    let (first, last) = (frames.first()?, frames.last()?);
    let format = "%Y-%m-%d %H:%M:%S%.6f";
    Some(format!(
        "Capture: {} to {} UTC ({} frames)\n",
        first.timestamp().format(format),
        last.timestamp().format(format),
        frames.len()
    ))
}

/// Render a fact tree as indented text
///
/// With `auto_expand` off only the root and its direct children are shown;
/// collapsed group nodes carry a `[+N]` marker with their hidden node count.
pub fn render_tree(root: &FactNode, display: &DisplayConfig) -> String {
    let mut out = String::new();
    render_node(&mut out, root, 0, display);
    out
}

fn render_node(out: &mut String, node: &FactNode, depth: usize, display: &DisplayConfig) {
    let expanded = display.auto_expand || depth == 0;
    let indent = "  ".repeat(depth);
    let label = fact_label(&node.fact, display);

    if !expanded && !node.children.is_empty() {
        let hidden = node.node_count() - 1;
        let _ = writeln!(out, "{}{} [+{}]", indent, label, hidden);
        return;
    }

    let _ = writeln!(out, "{}{}", indent, label);
    for child in &node.children {
        render_node(out, child, depth + 1, display);
    }
}

/// Human readable label for a single fact
pub fn fact_label(fact: &Fact, display: &DisplayConfig) -> String {
    let num = |value: u64| display.format_number(value);

    match fact {
        Fact::Identifier { id, extended } => {
            let kind = if *extended { " (extended)" } else { "" };
            format!("ID: {}{}", format_identifier(*id, display.number_format), kind)
        }
        Fact::BroadcastFrame => "Broadcast Frame".to_string(),
        Fact::Destination { address } => format!("Destination ID: {}", num(*address as u64)),
        Fact::SourceAddress { address } => format!("SRC: {}", num(*address as u64)),
        Fact::Pgn { pgn } => format!("PGN: {}", num(*pgn as u64)),
        Fact::PduFormat { pf } => format!("PF: {}", num(*pf as u64)),
        Fact::PduSpecific { ps } => format!("PS: {}", num(*ps as u64)),
        Fact::FrameCount { count } => format!("# of frames: {}", count),
        Fact::DataLength { min, max } if min < max => format!("Data Length: {} to {}", min, max),
        Fact::DataLength { min, .. } => format!("Data Length: {}", min),
        Fact::AverageInterval { micros: Some(us) } => {
            format!("Average inter-frame interval: {}us", us)
        }
        Fact::AverageInterval { micros: None } => {
            "Average inter-frame interval: n/a (single frame)".to_string()
        }
        Fact::DataByte { position } => format!("Data Byte {}", position),
        Fact::ChangedBits { mask } => format!("Changed bits: 0x{:x}  ({:08b})", mask, mask),
        Fact::Range { min, max } => {
            format!("Range: {} to {}", num(*min as u64), num(*max as u64))
        }
        Fact::Histogram => "Histogram".to_string(),
        Fact::ValueCount { value, count } => {
            format!("{}/0x{:x} ({:08b}) -> {}", value, value, value, count)
        }
        Fact::BitfieldHistogram => "Bitfield Histogram".to_string(),
        Fact::BitCount { index, count } => {
            format!("{} (Byte {} Bit {}) :{}", index, index / 8, index % 8, count)
        }
    }
}
