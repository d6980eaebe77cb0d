//! Per-identifier frame statistics
//!
//! Aggregates the ordered subsequence of frames sharing one identifier into a
//! `FrameStatistics` value: length bounds, average inter-frame interval,
//! per-byte value ranges and histograms, a per-bit set-count histogram and a
//! mask of bits that ever changed relative to the first frame.
//!
//! The engine is a pure function over a borrowed slice. It never mutates the
//! history and holds no state between calls, so callers that want to compute
//! several identifiers concurrently only need an immutable snapshot.

use crate::types::{CanFrame, MAX_DATA_LEN};

/// Number of distinct byte values
const BYTE_VALUES: usize = 256;

/// Number of bits in a full classic CAN payload
pub const PAYLOAD_BITS: usize = MAX_DATA_LEN * 8;

/// Aggregated statistics for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStatistics {
    id: u32,
    extended: bool,
    count: usize,
    min_length: u8,
    max_length: u8,
    avg_interval_us: Option<u64>,
    min_by_position: [Option<u8>; MAX_DATA_LEN],
    max_by_position: [Option<u8>; MAX_DATA_LEN],
    value_histogram: [[u32; BYTE_VALUES]; MAX_DATA_LEN],
    bit_histogram: [u32; PAYLOAD_BITS],
    changed_bits: [u8; MAX_DATA_LEN],
}

/// Borrowed view of the statistics for one byte position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteStatistics<'a> {
    /// Byte position within the payload
    pub position: usize,
    /// Smallest observed value
    pub min: u8,
    /// Largest observed value
    pub max: u8,
    /// Bits that differed from the first frame at any point
    pub changed_bits: u8,
    /// Occurrence count of each value 0..=255
    pub histogram: &'a [u32; BYTE_VALUES],
}

impl ByteStatistics<'_> {
    /// Values that occurred at least once, with their counts, ascending
    pub fn observed_values(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.histogram
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(value, &count)| (value as u8, count))
    }

    /// Number of frames that carried this byte position
    pub fn samples(&self) -> u32 {
        self.histogram.iter().sum()
    }
}

/// Compute statistics for every frame in `frames` whose identifier is `id`
///
/// Returns `None` when no frame matches.
pub fn compute(frames: &[CanFrame], id: u32) -> Option<FrameStatistics> {
    let matching: Vec<&CanFrame> = frames.iter().filter(|f| f.id == id).collect();
    log::trace!("Identifier 0x{:X}: {} matching frames of {}", id, matching.len(), frames.len());
    FrameStatistics::from_matching(matching)
}

impl FrameStatistics {
    fn from_matching<'a, I>(frames: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a CanFrame>,
    {
        let mut frames = frames.into_iter();
        let first = frames.next()?;

        let reference = first.data;
        let mut stats = FrameStatistics {
            id: first.id,
            extended: first.extended,
            count: 0,
            min_length: MAX_DATA_LEN as u8,
            max_length: 0,
            avg_interval_us: None,
            min_by_position: [None; MAX_DATA_LEN],
            max_by_position: [None; MAX_DATA_LEN],
            value_histogram: [[0; BYTE_VALUES]; MAX_DATA_LEN],
            bit_histogram: [0; PAYLOAD_BITS],
            changed_bits: [0; MAX_DATA_LEN],
        };

        let mut interval_sum: u64 = 0;
        let mut previous_ts: Option<u64> = None;

        for frame in std::iter::once(first).chain(frames) {
            if let Some(prev) = previous_ts {
                interval_sum += frame.timestamp_us.saturating_sub(prev);
            }
            previous_ts = Some(frame.timestamp_us);
            stats.accumulate(frame, &reference);
        }

        if stats.count > 1 {
            stats.avg_interval_us = Some(interval_sum / (stats.count as u64 - 1));
        }

        Some(stats)
    }

    fn accumulate(&mut self, frame: &CanFrame, reference: &[u8; MAX_DATA_LEN]) {
        self.count += 1;
        self.min_length = self.min_length.min(frame.length);
        self.max_length = self.max_length.max(frame.length);

        for (pos, &byte) in frame.payload().iter().enumerate() {
            self.min_by_position[pos] = Some(self.min_by_position[pos].map_or(byte, |m| m.min(byte)));
            self.max_by_position[pos] = Some(self.max_by_position[pos].map_or(byte, |m| m.max(byte)));
            self.value_histogram[pos][byte as usize] += 1;

            for bit in 0..8 {
                if byte & (1 << bit) != 0 {
                    self.bit_histogram[pos * 8 + bit] += 1;
                }
            }

            self.changed_bits[pos] |= reference[pos] ^ byte;
        }
    }

    /// Identifier these statistics describe
    pub fn id(&self) -> u32 {
        self.id
    }

    /// True if the first matching frame used the extended format
    pub fn extended(&self) -> bool {
        self.extended
    }

    /// Number of matching frames
    pub fn count(&self) -> usize {
        self.count
    }

    /// Shortest observed data length
    pub fn min_length(&self) -> u8 {
        self.min_length
    }

    /// Longest observed data length
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// True if every matching frame had the same length
    pub fn length_is_fixed(&self) -> bool {
        self.min_length == self.max_length
    }

    /// Mean gap between consecutive matching frames in microseconds
    ///
    /// `None` when only a single frame matched: there is no interval.
    pub fn avg_interval_us(&self) -> Option<u64> {
        self.avg_interval_us
    }

    /// Statistics for one byte position, `None` beyond the longest frame
    pub fn byte(&self, position: usize) -> Option<ByteStatistics<'_>> {
        if position >= self.max_length as usize {
            return None;
        }
        Some(ByteStatistics {
            position,
            min: self.min_by_position[position]?,
            max: self.max_by_position[position]?,
            changed_bits: self.changed_bits[position],
            histogram: &self.value_histogram[position],
        })
    }

    /// Statistics for every reported byte position (`0..max_length`)
    pub fn bytes(&self) -> impl Iterator<Item = ByteStatistics<'_>> + '_ {
        (0..self.max_length as usize).filter_map(move |pos| self.byte(pos))
    }

    /// Set-count for each reported bit, indexed `byte * 8 + bit`
    pub fn bit_histogram(&self) -> &[u32] {
        &self.bit_histogram[..self.max_length as usize * 8]
    }

    /// Changed-bit masks for each reported byte position
    pub fn changed_bits(&self) -> &[u8] {
        &self.changed_bits[..self.max_length as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: u32, ts: u64, payload: &[u8]) -> CanFrame {
        CanFrame::new(id, false, ts, payload)
    }

    #[test]
    fn test_mixed_lengths_and_histogram() {
        let frames = vec![
            frame(0x123, 0, &[0xFF; 8]),
            frame(0x123, 100, &[0x00; 8]),
            frame(0x456, 150, &[0x11]),
            frame(0x123, 300, &[0xFF, 0x00, 0x00, 0x00]),
        ];

        let stats = compute(&frames, 0x123).unwrap();
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.min_length(), 4);
        assert_eq!(stats.max_length(), 8);
        assert!(!stats.length_is_fixed());

        let byte0 = stats.byte(0).unwrap();
        assert_eq!(byte0.histogram[0xFF], 2);
        assert_eq!(byte0.histogram[0x00], 1);
        assert_eq!(byte0.min, 0x00);
        assert_eq!(byte0.max, 0xFF);
        assert_eq!(byte0.changed_bits, 0xFF);

        // Positions 4..8 only seen in the two full-length frames
        assert_eq!(stats.byte(5).unwrap().samples(), 2);
        assert!(stats.byte(8).is_none());

        assert_eq!(stats.avg_interval_us(), Some(150));
    }

    #[test]
    fn test_no_matching_frames() {
        let frames = vec![frame(0x100, 0, &[1, 2])];
        assert!(compute(&frames, 0x200).is_none());
        assert!(compute(&[], 0x100).is_none());
    }

    #[test]
    fn test_single_frame_has_no_interval() {
        let frames = vec![frame(0x7E8, 5_000, &[0x02, 0x41])];
        let stats = compute(&frames, 0x7E8).unwrap();
        assert_eq!(stats.count(), 1);
        assert_eq!(stats.avg_interval_us(), None);
        assert_eq!(stats.changed_bits(), &[0, 0]);
        assert!(stats.length_is_fixed());
    }

    #[test]
    fn test_interval_uses_integer_mean() {
        let frames = vec![
            frame(0x1, 0, &[0]),
            frame(0x1, 10, &[0]),
            frame(0x1, 21, &[0]),
        ];
        let stats = compute(&frames, 0x1).unwrap();
        // (10 + 11) / 2
        assert_eq!(stats.avg_interval_us(), Some(10));
    }

    #[test]
    fn test_interval_ignores_other_ids() {
        let frames = vec![
            frame(0x1, 0, &[0]),
            frame(0x2, 5, &[0]),
            frame(0x1, 1_000, &[0]),
            frame(0x2, 1_005, &[0]),
            frame(0x1, 2_000, &[0]),
        ];
        assert_eq!(compute(&frames, 0x1).unwrap().avg_interval_us(), Some(1_000));
    }

    #[test]
    fn test_bit_histogram_counts_set_bits() {
        let frames = vec![
            frame(0x10, 0, &[0b0000_0001, 0b1000_0000]),
            frame(0x10, 1, &[0b0000_0011, 0b1000_0000]),
            frame(0x10, 2, &[0b0000_0001, 0b0000_0000]),
        ];
        let stats = compute(&frames, 0x10).unwrap();
        let bits = stats.bit_histogram();
        assert_eq!(bits.len(), 16);
        assert_eq!(bits[0], 3);
        assert_eq!(bits[1], 1);
        assert_eq!(bits[2], 0);
        assert_eq!(bits[15], 2);
    }

    #[test]
    fn test_changed_bits_against_first_frame() {
        let frames = vec![
            frame(0x10, 0, &[0b1010_0000]),
            frame(0x10, 1, &[0b1010_0001]),
            frame(0x10, 2, &[0b0010_0000]),
            frame(0x10, 3, &[0b1010_0000]),
        ];
        let stats = compute(&frames, 0x10).unwrap();

        let mut expected = 0u8;
        for f in &frames {
            expected |= frames[0].data[0] ^ f.data[0];
        }
        assert_eq!(stats.changed_bits(), &[expected]);
        assert_eq!(expected, 0b1000_0001);
    }

    #[test]
    fn test_short_first_frame_baseline_is_padding() {
        // The first frame only carries one byte; byte 1 is compared against
        // its zero padding.
        let frames = vec![frame(0x10, 0, &[0x01]), frame(0x10, 1, &[0x01, 0x0F])];
        let stats = compute(&frames, 0x10).unwrap();
        assert_eq!(stats.changed_bits(), &[0x00, 0x0F]);
        assert_eq!(stats.byte(1).unwrap().samples(), 1);
    }

    #[test]
    fn test_range_and_histogram_invariants() {
        let frames: Vec<CanFrame> = (0u64..40)
            .map(|i| {
                let len = (i % 9) as usize;
                let payload: Vec<u8> = (0..len).map(|p| (i as u8).wrapping_mul(37).wrapping_add(p as u8)).collect();
                frame(0x55, i * 10, &payload)
            })
            .collect();

        let stats = compute(&frames, 0x55).unwrap();
        assert!(stats.min_length() <= stats.max_length());
        assert!(stats.max_length() as usize <= MAX_DATA_LEN);

        for byte in stats.bytes() {
            let carriers: Vec<&CanFrame> = frames.iter().filter(|f| f.len() > byte.position).collect();
            assert_eq!(byte.samples() as usize, carriers.len());
            for f in carriers {
                let value = f.data[byte.position];
                assert!(byte.min <= value && value <= byte.max);
            }
        }
    }

    #[test]
    fn test_zero_length_frames() {
        let frames = vec![frame(0x3, 0, &[]), frame(0x3, 10, &[])];
        let stats = compute(&frames, 0x3).unwrap();
        assert_eq!(stats.min_length(), 0);
        assert_eq!(stats.max_length(), 0);
        assert_eq!(stats.bytes().count(), 0);
        assert!(stats.bit_histogram().is_empty());
        assert_eq!(stats.avg_interval_us(), Some(10));
    }

    #[test]
    fn test_deterministic() {
        let frames = vec![frame(0x9, 0, &[1, 2, 3]), frame(0x9, 7, &[3, 2, 1])];
        assert_eq!(compute(&frames, 0x9), compute(&frames, 0x9));
    }
}
