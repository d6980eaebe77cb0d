//! Identifier index
//!
//! Tracks the de-duplicated set of identifiers present in a frame history and
//! hands them out in ascending order for selection lists. The index can be
//! rebuilt from scratch when the history is replaced, or extended when frames
//! are appended.

use crate::config::NumberFormat;
use crate::types::{CanFrame, FrameInfoError, Result};
use std::collections::BTreeSet;

/// De-duplicated, ordered set of identifiers seen in a frame history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierIndex {
    ids: BTreeSet<u32>,
}

impl IdentifierIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the entire frame sequence and build a new index
    pub fn rebuild(frames: &[CanFrame]) -> Self {
        let ids: BTreeSet<u32> = frames.iter().map(|f| f.id).collect();
        log::debug!("Rebuilt identifier index: {} unique ids from {} frames", ids.len(), frames.len());
        Self { ids }
    }

    /// Absorb identifiers not yet known and return them in ascending order
    ///
    /// `frames` is the full history; the index must have been built from a
    /// prefix of it. Only identifiers that were not already present are
    /// returned (the delta since the last call).
    pub fn extend(&mut self, frames: &[CanFrame]) -> Vec<u32> {
        let mut added = BTreeSet::new();
        for frame in frames {
            if self.ids.insert(frame.id) {
                added.insert(frame.id);
            }
        }
        if !added.is_empty() {
            log::debug!("Identifier index extended by {} ids", added.len());
        }
        added.into_iter().collect()
    }

    /// Identifiers in ascending order
    pub fn sorted(&self) -> Vec<u32> {
        self.ids.iter().copied().collect()
    }

    /// Iterate identifiers in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    /// Lowest known identifier, the default selection
    pub fn lowest(&self) -> Option<u32> {
        self.ids.first().copied()
    }

    /// Whether any frame carried `id`
    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Number of unique identifiers
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no frame has been indexed
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Parse a user-facing identifier string
///
/// Accepts `0x1A3` / `0X1A3`, the `1A3x` / `1A3h` suffix forms used by log
/// tools, and plain decimal `419`. Surrounding whitespace is ignored.
pub fn parse_identifier(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    let malformed = || FrameInfoError::MalformedIdentifierText(text.to_string());

    let (digits, radix) = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(hex) = trimmed
        .strip_suffix(['x', 'X', 'h', 'H'])
    {
        (hex, 16)
    } else {
        (trimmed, 10)
    };

    // from_str_radix alone would also take a leading '+'
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(malformed());
    }

    u32::from_str_radix(digits, radix).map_err(|_| malformed())
}

/// Render an identifier the way selection lists show it
pub fn format_identifier(id: u32, format: NumberFormat) -> String {
    format.format(id as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: u32) -> CanFrame {
        CanFrame::new(id, id > 0x7FF, 0, &[])
    }

    #[test]
    fn test_rebuild_deduplicates_and_sorts() {
        let frames = vec![frame(0x300), frame(0x100), frame(0x300), frame(0x200)];
        let index = IdentifierIndex::rebuild(&frames);
        assert_eq!(index.sorted(), vec![0x100, 0x200, 0x300]);
        assert_eq!(index.lowest(), Some(0x100));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_rebuild_empty() {
        let index = IdentifierIndex::rebuild(&[]);
        assert!(index.is_empty());
        assert_eq!(index.lowest(), None);
    }

    #[test]
    fn test_extend_returns_only_new_ids() {
        let mut frames = vec![frame(0x10), frame(0x20)];
        let mut index = IdentifierIndex::rebuild(&frames);

        frames.extend([frame(0x20), frame(0x05), frame(0x30), frame(0x05)]);
        let added = index.extend(&frames);

        assert_eq!(added, vec![0x05, 0x30]);
        assert_eq!(index.sorted(), vec![0x05, 0x10, 0x20, 0x30]);

        // Nothing new the second time around
        assert!(index.extend(&frames).is_empty());
    }

    #[test]
    fn test_numeric_not_textual_order() {
        let frames = vec![frame(0x18FEF100), frame(0x7DF), frame(0x80)];
        let index = IdentifierIndex::rebuild(&frames);
        assert_eq!(index.sorted(), vec![0x80, 0x7DF, 0x18FEF100]);
    }

    #[test]
    fn test_parse_identifier_forms() {
        assert_eq!(parse_identifier("0x123").unwrap(), 0x123);
        assert_eq!(parse_identifier("0X18FEF100").unwrap(), 0x18FEF100);
        assert_eq!(parse_identifier("18FEF100x").unwrap(), 0x18FEF100);
        assert_eq!(parse_identifier("7DFh").unwrap(), 0x7DF);
        assert_eq!(parse_identifier(" 291 ").unwrap(), 291);
    }

    #[test]
    fn test_parse_identifier_malformed() {
        assert!(matches!(
            parse_identifier("engine"),
            Err(FrameInfoError::MalformedIdentifierText(_))
        ));
        assert!(parse_identifier("").is_err());
        assert!(parse_identifier("0x").is_err());
        assert!(parse_identifier("12G").is_err());
        assert!(parse_identifier("-5").is_err());
    }

    #[test]
    fn test_parse_identifier_rejects_sign() {
        for text in ["+5", "0x+5", "+7DFh", "0x-1"] {
            assert!(
                matches!(
                    parse_identifier(text),
                    Err(FrameInfoError::MalformedIdentifierText(_))
                ),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_format_identifier() {
        assert_eq!(format_identifier(0x123, NumberFormat::Hex), "0x123");
        assert_eq!(format_identifier(0x123, NumberFormat::Decimal), "291");
        assert_eq!(
            parse_identifier(&format_identifier(0x18FEF100, NumberFormat::Hex)).unwrap(),
            0x18FEF100
        );
    }
}
