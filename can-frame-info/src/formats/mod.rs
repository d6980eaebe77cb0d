//! Log file format readers (candump, SavvyCAN CSV)
//!
//! This module contains readers for the text capture formats the library can
//! load into a frame history. Each reader implements an iterator pattern over
//! CanFrame objects.

use crate::types::{CanFrame, FrameInfoError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod candump;
pub mod savvycan;

// Re-export reader types
pub use candump::CandumpReader;
pub use savvycan::SavvyCanReader;

/// Common trait for all log file readers
///
/// This trait provides a unified interface for opening different log file
/// formats. Each reader yields CanFrame objects in file order.
pub trait LogFileParser: Iterator<Item = Result<CanFrame>> + Sized {
    /// Open a log file and return an iterator over CAN frames
    fn parse(path: &Path) -> Result<Self>;
}

/// Open a log file, picking the reader from the file extension
pub fn open(path: &Path) -> Result<Box<dyn Iterator<Item = Result<CanFrame>>>> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    match extension.as_deref() {
        Some("log") | Some("candump") => {
            log::debug!("Detected candump log format");
            Ok(Box::new(CandumpReader::<BufReader<File>>::parse(path)?))
        }
        Some("csv") => {
            log::debug!("Detected SavvyCAN CSV format");
            Ok(Box::new(SavvyCanReader::<BufReader<File>>::parse(path)?))
        }
        _ => Err(FrameInfoError::UnsupportedFormat(format!("{:?}", path))),
    }
}

/// Read every frame of a log file into memory
///
/// Stops at the first malformed record.
pub fn read_frames(path: &Path) -> Result<Vec<CanFrame>> {
    let frames = open(path)?.collect::<Result<Vec<_>>>()?;
    log::info!("Loaded {} frames from {:?}", frames.len(), path);
    Ok(frames)
}
