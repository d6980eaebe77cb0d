//! J1939 identifier decoding
//!
//! Splits a 29-bit extended CAN identifier into its J1939 addressing fields.
//!
//! ```text
//!  28  26 25        16 15         8 7          0
//! +------+-------------+------------+------------+
//! | prio | ..   PF     |     PS     |     SA     |
//! +------+-------------+------------+------------+
//!        |<------------ PGN (18) -->|
//! ```
//!
//! PDU format values up to 0xEF are PDU1 (peer-to-peer, PS is the destination
//! address). Values 0xF0 and above are PDU2 (broadcast, PS is a group
//! extension). Standard 11-bit identifiers carry no J1939 layout; callers
//! gate decoding on the frame's extended flag.

use serde::{Deserialize, Serialize};

/// Destination value reported for broadcast (global) messages
pub const GLOBAL_DESTINATION: u16 = 0xFFFF;

/// Highest PDU format value that still addresses a specific destination
pub const PDU1_MAX_PF: u8 = 0xEF;

/// PDU addressing class derived from the PF field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PduFormat {
    /// Destination specific (PF <= 0xEF)
    Pdu1,
    /// Broadcast (PF >= 0xF0)
    Pdu2,
}

/// J1939 addressing fields of an extended identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct J1939Fields {
    /// Message priority (3 bits, 0 = highest)
    pub priority: u8,
    /// Parameter group number (18 bits)
    pub pgn: u32,
    /// PDU format
    pub pf: u8,
    /// PDU specific
    pub ps: u8,
    /// Source address
    pub source_address: u8,
    /// Destination address, `GLOBAL_DESTINATION` for broadcast
    pub destination: u16,
    /// True for PDU2 (broadcast) messages
    pub is_broadcast: bool,
}

impl J1939Fields {
    /// Decode the J1939 fields of an extended identifier
    pub fn decode(id: u32) -> Self {
        let source_address = (id & 0xFF) as u8;
        let pf = ((id >> 16) & 0xFF) as u8;
        let ps = ((id >> 8) & 0xFF) as u8;
        let pgn = (id >> 8) & 0x3FFFF;
        let priority = ((id >> 26) & 0x07) as u8;

        let (destination, is_broadcast) = if pf > PDU1_MAX_PF {
            (GLOBAL_DESTINATION, true)
        } else {
            (ps as u16, false)
        };

        Self {
            priority,
            pgn,
            pf,
            ps,
            source_address,
            destination,
            is_broadcast,
        }
    }

    /// Addressing class of this message
    pub fn pdu_format(&self) -> PduFormat {
        if self.is_broadcast {
            PduFormat::Pdu2
        } else {
            PduFormat::Pdu1
        }
    }
}

/// Decode the J1939 fields of an extended identifier
pub fn decode(id: u32) -> J1939Fields {
    J1939Fields::decode(id)
}
