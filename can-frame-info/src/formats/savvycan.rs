//! SavvyCAN / GVRET CSV reader
//!
//! Columns are located by header name, so both the current header
//!
//! ```text
//! Time Stamp,ID,Extended,Dir,Bus,LEN,D1,D2,D3,D4,D5,D6,D7,D8
//! 1000123,18FEF100,true,Rx,0,8,01,02,03,04,05,06,07,08
//! ```
//!
//! and the older variant without the `Dir` column are accepted. Time stamps
//! are microseconds, identifiers and data bytes are hex.

use crate::types::{
    CanFrame, FrameInfoError, Result, MAX_DATA_LEN, MAX_EXTENDED_ID, MAX_STANDARD_ID,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::LogFileParser;

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    timestamp: usize,
    id: usize,
    extended: usize,
    bus: Option<usize>,
    len: usize,
    first_data: usize,
}

impl Columns {
    fn from_header(header: &str, line_no: usize) -> Result<Self> {
        let names: Vec<String> = header
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);
        let require = |wanted: &str| {
            find(wanted).ok_or_else(|| {
                FrameInfoError::parse(line_no, format!("CSV header lacks a {:?} column", wanted))
            })
        };

        let len = require("len")?;
        Ok(Self {
            timestamp: require("time stamp")?,
            id: require("id")?,
            extended: require("extended")?,
            bus: find("bus"),
            len,
            first_data: find("d1").unwrap_or(len + 1),
        })
    }
}

/// Iterator over CAN frames from a SavvyCAN CSV file
pub struct SavvyCanReader<R> {
    lines: Lines<R>,
    line_no: usize,
    columns: Option<Columns>,
}

impl<R: BufRead> SavvyCanReader<R> {
    /// Read frames from any buffered reader; the first non-blank line is the
    /// header
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            columns: None,
        }
    }
}

impl LogFileParser for SavvyCanReader<BufReader<File>> {
    fn parse(path: &Path) -> Result<Self> {
        log::info!("Parsing SavvyCAN CSV: {:?}", path);
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for SavvyCanReader<R> {
    type Item = Result<CanFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match self.columns {
                None => match Columns::from_header(trimmed, self.line_no) {
                    Ok(columns) => {
                        log::debug!("CSV columns: {:?}", columns);
                        self.columns = Some(columns);
                    }
                    Err(e) => return Some(Err(e)),
                },
                Some(columns) => return Some(parse_row(trimmed, &columns, self.line_no)),
            }
        }
    }
}

fn parse_row(row: &str, columns: &Columns, line_no: usize) -> Result<CanFrame> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    let field = |index: usize, name: &str| {
        fields
            .get(index)
            .copied()
            .ok_or_else(|| FrameInfoError::parse(line_no, format!("missing {} field", name)))
    };

    let timestamp_us: u64 = field(columns.timestamp, "time stamp")?
        .parse()
        .map_err(|_| FrameInfoError::parse(line_no, "bad time stamp"))?;

    let id_text = field(columns.id, "ID")?;
    let id = u32::from_str_radix(id_text.trim_start_matches("0x"), 16)
        .map_err(|_| FrameInfoError::parse(line_no, format!("bad identifier {:?}", id_text)))?;
    let extended = match field(columns.extended, "extended")?.to_ascii_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        other => {
            return Err(FrameInfoError::parse(line_no, format!("bad extended flag {:?}", other)));
        }
    };

    let (max_id, kind) = if extended {
        (MAX_EXTENDED_ID, "extended")
    } else {
        (MAX_STANDARD_ID, "standard")
    };
    if id > max_id {
        return Err(FrameInfoError::parse(
            line_no,
            format!("{} identifier 0x{:X} out of range", kind, id),
        ));
    }

    let channel = match columns.bus {
        Some(index) => field(index, "bus")?
            .parse()
            .map_err(|_| FrameInfoError::parse(line_no, "bad bus number"))?,
        None => 0,
    };

    let len: usize = field(columns.len, "LEN")?
        .parse()
        .map_err(|_| FrameInfoError::parse(line_no, "bad length"))?;
    if len > MAX_DATA_LEN {
        return Err(FrameInfoError::parse(
            line_no,
            format!("length {} exceeds {}", len, MAX_DATA_LEN),
        ));
    }

    let payload = (0..len)
        .map(|i| {
            let text = field(columns.first_data + i, "data")?;
            u8::from_str_radix(text, 16)
                .map_err(|_| FrameInfoError::parse(line_no, format!("bad data byte {:?}", text)))
        })
        .collect::<Result<Vec<u8>>>()?;

    Ok(CanFrame::new(id, extended, timestamp_us, &payload).with_channel(channel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(text: &str) -> Vec<Result<CanFrame>> {
        SavvyCanReader::from_reader(Cursor::new(text.to_string())).collect()
    }

    #[test]
    fn test_current_header() {
        let frames = read_all(
            "Time Stamp,ID,Extended,Dir,Bus,LEN,D1,D2,D3,D4,D5,D6,D7,D8\n\
             1000123,18FEF100,true,Rx,1,8,01,02,03,04,05,06,07,08\n\
             1000223,00000123,false,Rx,0,2,AA,BB,,,,,,\n",
        );
        assert_eq!(frames.len(), 2);

        let ext = frames[0].as_ref().unwrap();
        assert_eq!(ext.id, 0x18FEF100);
        assert!(ext.extended);
        assert_eq!(ext.timestamp_us, 1_000_123);
        assert_eq!(ext.channel, 1);
        assert_eq!(ext.payload(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        let std = frames[1].as_ref().unwrap();
        assert_eq!(std.id, 0x123);
        assert!(!std.extended);
        assert_eq!(std.payload(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_legacy_header_without_dir() {
        let frames = read_all(
            "Time Stamp,ID,Extended,Bus,LEN,D1,D2,D3,D4,D5,D6,D7,D8\n\
             5,7DF,False,0,1,3E\n",
        );
        let frame = frames[0].as_ref().unwrap();
        assert_eq!(frame.id, 0x7DF);
        assert_eq!(frame.payload(), &[0x3E]);
    }

    #[test]
    fn test_missing_header_column() {
        let frames = read_all("Time Stamp,ID,Bus,LEN\n1,2,0,0\n");
        assert!(matches!(
            frames[0],
            Err(FrameInfoError::LogParseError { line: 1, .. })
        ));
    }

    #[test]
    fn test_bad_rows() {
        let columns = Columns::from_header("Time Stamp,ID,Extended,Dir,Bus,LEN,D1,D2", 1).unwrap();
        assert!(parse_row("x,100,false,Rx,0,0", &columns, 2).is_err());
        assert!(parse_row("1,100,maybe,Rx,0,0", &columns, 2).is_err());
        assert!(parse_row("1,100,false,Rx,0,9", &columns, 2).is_err());
        assert!(parse_row("1,100,false,Rx,0,2,AA", &columns, 2).is_err());
        assert!(parse_row("1,100,false,Rx,0,1,ZZ", &columns, 2).is_err());
        assert!(parse_row("1,100,false,Rx,0,1,0A", &columns, 2).is_ok());
    }

    #[test]
    fn test_identifier_range_follows_extended_flag() {
        let columns = Columns::from_header("Time Stamp,ID,Extended,Dir,Bus,LEN,D1", 1).unwrap();
        assert!(parse_row("1,7FF,false,Rx,0,1,00", &columns, 2).is_ok());
        assert!(parse_row("1,18FEF100,true,Rx,0,1,00", &columns, 2).is_ok());
        assert!(matches!(
            parse_row("1,18FEF100,false,Rx,0,1,00", &columns, 4),
            Err(FrameInfoError::LogParseError { line: 4, .. })
        ));
        assert!(parse_row("1,800,false,Rx,0,1,00", &columns, 2).is_err());
        assert!(parse_row("1,3FFFFFFF,true,Rx,0,1,00", &columns, 2).is_err());
    }
}
