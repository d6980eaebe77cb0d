//! CAN Frame Info CLI Application
//!
//! This is the command-line front end for the can-frame-info library.
//! It owns the frame history and adds:
//! - Capture file loading (candump, SavvyCAN CSV)
//! - Identifier listing and selection
//! - Text and JSON rendering of the per-identifier fact tree
//! - Parallel computation for whole-capture reports

use anyhow::{Context, Result};
use can_frame_info::{
    build_fact_tree, formats, parse_identifier, CanFrame, Detail, DisplayConfig, FrameInfoSession,
    NumberFormat,
};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;

mod config;
mod report;

/// CAN Frame Info - Per-identifier statistics for CAN captures
#[derive(Parser, Debug)]
#[command(name = "can-frame-info-cli")]
#[command(about = "Per-identifier statistics and J1939 decoding for CAN captures", long_about = None)]
#[command(version)]
struct Args {
    /// Capture file(s) to load, in order (.log candump, .csv SavvyCAN)
    #[arg(short, long, value_name = "FILE")]
    log: Vec<PathBuf>,

    /// Identifier to show (hex "0x123" or decimal "291"); default is the lowest
    #[arg(short, long, value_name = "ID")]
    id: Option<String>,

    /// List the unique identifiers and exit
    #[arg(long)]
    list: bool,

    /// Show every identifier
    #[arg(long, conflicts_with = "id")]
    all: bool,

    /// Print the fact tree as JSON
    #[arg(long)]
    json: bool,

    /// Start the fact tree fully expanded
    #[arg(short, long)]
    expand: bool,

    /// Show numbers in decimal instead of hex
    #[arg(long)]
    decimal: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Frame Info CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using frame info library v{}", can_frame_info::VERSION);

    let mut app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    // Command line flags win over the config file
    if !args.log.is_empty() {
        app_config.input.files = args.log.clone();
    }
    if args.id.is_some() {
        app_config.input.id = args.id.clone();
    }
    if args.expand {
        app_config.display.auto_expand = true;
    }
    if args.decimal {
        app_config.display.number_format = NumberFormat::Decimal;
    }

    if app_config.input.files.is_empty() {
        println!("CAN Frame Info - No input specified");
        println!("\nQuick Start:");
        println!("  can-frame-info-cli --log capture.log");
        println!("  can-frame-info-cli --log capture.csv --id 0x18FEF100 --expand");
        println!("  can-frame-info-cli --log capture.log --list");
        println!("\nUse --help for more options");
        return Ok(());
    }

    let frames = load_history(&app_config.input.files)?;
    let display = &app_config.display;

    let mut session = FrameInfoSession::new();
    session.frames_replaced(&frames);

    if args.list {
        if let Some(span) = report::render_capture_span(&frames) {
            print!("{}", span);
        }
        print!("{}", report::render_id_list(session.index(), display));
        return Ok(());
    }

    if args.all {
        return show_all(&frames, &session, display, args.json);
    }

    if let Some(text) = &app_config.input.id {
        let id = parse_identifier(text)?;
        session.select(&frames, id);
    }

    match session.detail() {
        Some(detail) => show_detail(detail, display, args.json),
        None => {
            match session.selected() {
                Some(id) => eprintln!("No frames with identifier 0x{:X}", id),
                None => eprintln!("Capture contains no frames"),
            }
            Ok(())
        }
    }
}

/// Load all capture files, in order, into one frame history
fn load_history(files: &[PathBuf]) -> Result<Vec<CanFrame>> {
    let mut frames = Vec::new();
    for path in files {
        let loaded = formats::read_frames(path)
            .with_context(|| format!("Failed to load capture: {:?}", path))?;
        frames.extend(loaded);
    }
    log::info!("Frame history: {} frames from {} file(s)", frames.len(), files.len());
    Ok(frames)
}

/// Compute and print every identifier of the capture
///
/// Details are computed in parallel over the immutable history and printed
/// in ascending identifier order.
fn show_all(
    frames: &[CanFrame],
    session: &FrameInfoSession,
    display: &DisplayConfig,
    json: bool,
) -> Result<()> {
    let ids = session.index().sorted();
    let details: Vec<Detail> = ids
        .par_iter()
        .filter_map(|&id| Detail::compute(frames, id))
        .collect();

    if json {
        let trees: Vec<_> = details.iter().map(build_fact_tree).collect();
        println!("{}", serde_json::to_string_pretty(&trees)?);
        return Ok(());
    }

    if let Some(span) = report::render_capture_span(frames) {
        print!("{}", span);
    }
    print!("{}", report::render_id_list(session.index(), display));
    for detail in &details {
        println!();
        print!("{}", report::render_tree(&build_fact_tree(detail), display));
    }
    Ok(())
}

fn show_detail(detail: &Detail, display: &DisplayConfig, json: bool) -> Result<()> {
    let tree = build_fact_tree(detail);
    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", report::render_tree(&tree, display));
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
