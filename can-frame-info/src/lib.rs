//! CAN Frame Info Library
//!
//! A stateless library that characterizes a captured CAN frame history one
//! identifier at a time.
//!
//! # Architecture
//!
//! The library is built from pure functions over a borrowed `&[CanFrame]`:
//! - Builds the sorted set of identifiers present in a capture
//! - Aggregates the frames of one identifier into `FrameStatistics`
//!   (length range, average interval, per-byte ranges and histograms,
//!   per-bit histogram, changed-bit masks)
//! - Decodes J1939 addressing fields of extended identifiers
//! - Turns the result into a tree of typed facts for presentation
//! - Reads candump and SavvyCAN CSV captures
//!
//! The library does NOT:
//! - Capture frames from a live bus
//! - Format text or draw widgets
//! - Update statistics incrementally as frames arrive
//!
//! Rendering and file selection live in the application layer
//! (can-frame-info-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use can_frame_info::{build_fact_tree, formats, FrameInfoSession};
//! use std::path::Path;
//!
//! let frames = formats::read_frames(Path::new("capture.log")).unwrap();
//!
//! // Listing and auto-selection of the lowest identifier
//! let mut session = FrameInfoSession::new();
//! session.frames_replaced(&frames);
//!
//! if let Some(detail) = session.detail() {
//!     println!("0x{:X}: {} frames", detail.id, detail.stats.count());
//!     let tree = build_fact_tree(detail);
//!     println!("{} facts", tree.node_count());
//! }
//! ```

// Public modules
pub mod config;
pub mod facts;
pub mod formats;
pub mod identifier;
pub mod j1939;
pub mod session;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use config::{DisplayConfig, NumberFormat};
pub use facts::{build_fact_tree, Fact, FactNode};
pub use identifier::{format_identifier, parse_identifier, IdentifierIndex};
pub use j1939::{J1939Fields, PduFormat};
pub use session::{Detail, FrameInfoSession, FramesUpdate, SessionState};
pub use stats::{ByteStatistics, FrameStatistics};
pub use types::{CanFrame, FrameInfoError, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
