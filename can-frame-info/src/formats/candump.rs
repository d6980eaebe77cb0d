//! candump log file reader
//!
//! Reads the log format written by `candump -l` from can-utils:
//!
//! ```text
//! (1436509052.249713) can0 18FEF100#0102030405060708
//! (1436509052.250001) can0 123#R
//! ```
//!
//! Identifiers written with more than three hex digits are extended (29-bit).
//! Remote frames carry no data. CAN-FD records (`##`) are rejected because
//! their payload exceeds a classic frame.

use crate::types::{
    CanFrame, FrameInfoError, Result, MAX_DATA_LEN, MAX_EXTENDED_ID, MAX_STANDARD_ID,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::LogFileParser;

/// Iterator over CAN frames from a candump log
pub struct CandumpReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> CandumpReader<R> {
    /// Read frames from any buffered reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl LogFileParser for CandumpReader<BufReader<File>> {
    fn parse(path: &Path) -> Result<Self> {
        log::info!("Parsing candump log: {:?}", path);
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for CandumpReader<R> {
    type Item = Result<CanFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(parse_line(trimmed, self.line_no));
        }
    }
}

/// Parse one `(timestamp) interface id#data` record
fn parse_line(line: &str, line_no: usize) -> Result<CanFrame> {
    let mut parts = line.split_whitespace();
    let (Some(ts), Some(interface), Some(record)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FrameInfoError::parse(line_no, "expected '(timestamp) interface id#data'"));
    };

    let ts = ts
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| FrameInfoError::parse(line_no, format!("bad timestamp field {:?}", ts)))?;
    let timestamp_us = parse_seconds_to_micros(ts)
        .ok_or_else(|| FrameInfoError::parse(line_no, format!("bad timestamp {:?}", ts)))?;

    let (id_text, data_text) = record
        .split_once('#')
        .ok_or_else(|| FrameInfoError::parse(line_no, format!("missing '#' in {:?}", record)))?;

    if data_text.starts_with('#') {
        return Err(FrameInfoError::parse(line_no, "CAN-FD records are not supported"));
    }

    let id = u32::from_str_radix(id_text, 16)
        .map_err(|_| FrameInfoError::parse(line_no, format!("bad identifier {:?}", id_text)))?;
    let extended = id_text.len() > 3;
    if id > MAX_EXTENDED_ID {
        return Err(FrameInfoError::parse(line_no, format!("identifier 0x{:X} out of range", id)));
    }
    if !extended && id > MAX_STANDARD_ID {
        return Err(FrameInfoError::parse(
            line_no,
            format!("standard identifier 0x{:X} exceeds 11 bits", id),
        ));
    }

    let payload = if data_text.starts_with(['R', 'r']) {
        Vec::new()
    } else {
        parse_hex_payload(data_text)
            .ok_or_else(|| FrameInfoError::parse(line_no, format!("bad payload {:?}", data_text)))?
    };
    if payload.len() > MAX_DATA_LEN {
        return Err(FrameInfoError::parse(
            line_no,
            format!("payload of {} bytes exceeds {}", payload.len(), MAX_DATA_LEN),
        ));
    }

    Ok(CanFrame::new(id, extended, timestamp_us, &payload).with_channel(interface_channel(interface)))
}

/// `1436509052.249713` -> microseconds, without going through f64
fn parse_seconds_to_micros(text: &str) -> Option<u64> {
    let (secs, frac) = text.split_once('.').unwrap_or((text, ""));
    let secs: u64 = secs.parse().ok()?;

    let mut micros: u64 = 0;
    for (i, c) in frac.chars().chain(std::iter::repeat('0')).take(6).enumerate() {
        let digit = c.to_digit(10)? as u64;
        micros += digit * 10u64.pow(5 - i as u32);
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    secs.checked_mul(1_000_000)?.checked_add(micros)
}

/// Data bytes written back to back, optionally separated by '.'
fn parse_hex_payload(text: &str) -> Option<Vec<u8>> {
    let digits: String = text.chars().filter(|&c| c != '.').collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
        .collect()
}

/// `can0` -> 0, `vcan12` -> 12; interfaces without a number map to 0
fn interface_channel(interface: &str) -> u8 {
    interface
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(0)
}
