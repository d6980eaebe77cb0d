//! Core types for the CAN frame info library
//!
//! This module defines the captured frame record that every other module reads,
//! and the error type shared by the library. Frames are plain values: the
//! library never mutates the history it is handed.

use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp type used when presenting capture times
pub type Timestamp = DateTime<Utc>;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, FrameInfoError>;

/// Maximum number of data bytes in a classic CAN frame
pub const MAX_DATA_LEN: usize = 8;

/// Highest identifier representable in the 11-bit standard format
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Highest identifier representable in the 29-bit extended format
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// A single captured CAN frame
///
/// Frames are immutable once captured. Only the first `length` bytes of
/// `data` are meaningful; the rest are zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    /// CAN identifier (11-bit or 29-bit)
    pub id: u32,
    /// True if `id` uses the 29-bit extended format
    pub extended: bool,
    /// Capture time in microseconds, non-decreasing across a capture
    pub timestamp_us: u64,
    /// Bus/channel number as reported by the log file
    pub channel: u8,
    /// Number of valid bytes in `data` (0-8)
    pub length: u8,
    /// Payload bytes, zero padded
    pub data: [u8; MAX_DATA_LEN],
}

impl CanFrame {
    /// Create a frame from a payload slice
    ///
    /// At most eight bytes are copied; `length` reflects the copied count.
    pub fn new(id: u32, extended: bool, timestamp_us: u64, payload: &[u8]) -> Self {
        let length = payload.len().min(MAX_DATA_LEN);
        let mut data = [0u8; MAX_DATA_LEN];
        data[..length].copy_from_slice(&payload[..length]);

        Self {
            id,
            extended,
            timestamp_us,
            channel: 0,
            length: length as u8,
            data,
        }
    }

    /// Builder method: set the bus/channel number
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// The valid payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Data length as a byte count
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// True if the frame carries no data bytes
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Convert the microsecond timestamp to a DateTime<Utc>
    pub fn timestamp(&self) -> Timestamp {
        let secs = (self.timestamp_us / 1_000_000) as i64;
        let nsecs = ((self.timestamp_us % 1_000_000) * 1_000) as u32;
        DateTime::from_timestamp(secs, nsecs).unwrap_or_default()
    }
}

impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extended {
            write!(f, "{:08X} [{}]", self.id, self.length)?;
        } else {
            write!(f, "{:03X} [{}]", self.id, self.length)?;
        }
        for byte in self.payload() {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// Errors that can occur in the library
#[derive(Debug, thiserror::Error)]
pub enum FrameInfoError {
    #[error("Malformed identifier text: {0:?}")]
    MalformedIdentifierText(String),

    #[error("Failed to parse log file (line {line}): {message}")]
    LogParseError { line: usize, message: String },

    #[error("Unsupported log file format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FrameInfoError {
    /// Shorthand for a log parse error at a 1-based line number
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FrameInfoError::LogParseError {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_payload() {
        let frame = CanFrame::new(0x123, false, 10, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(frame.length, 3);
        assert_eq!(frame.payload(), &[0xAA, 0xBB, 0xCC]);
        assert_eq!(frame.data[3..], [0u8; 5]);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_frame_payload_truncated_to_eight() {
        let frame = CanFrame::new(0x1, false, 0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(frame.len(), 8);
        assert_eq!(frame.payload(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_frame_timestamp_conversion() {
        let frame = CanFrame::new(0x1, false, 1_500_000, &[]);
        let ts = frame.timestamp();
        assert_eq!(ts.timestamp(), 1);
        assert_eq!(ts.timestamp_subsec_micros(), 500_000);
    }

    #[test]
    fn test_frame_display() {
        let std = CanFrame::new(0x7DF, false, 0, &[0x02, 0x01]);
        assert_eq!(format!("{}", std), "7DF [2] 02 01");

        let ext = CanFrame::new(0x18FEF100, true, 0, &[0xFF]).with_channel(1);
        assert_eq!(format!("{}", ext), "18FEF100 [1] FF");
        assert_eq!(ext.channel, 1);
    }
}
