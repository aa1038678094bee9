//! ECG Report CLI Application
//!
//! Command-line interface for the ECG export reader. It uses the
//! ecg-record library and adds:
//! - Per-lead SVG chart rendering
//! - Static HTML report generation

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod report;

/// ECG Report - Render an ECG XML export as a static HTML report
#[derive(Parser, Debug)]
#[command(name = "ecg-report-cli")]
#[command(about = "Render an ECG XML export as a static HTML report", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the ECG XML export to read
    #[arg(short, long, value_name = "FILE")]
    inputfile: PathBuf,

    /// Path of the generated HTML report (overwritten if it exists)
    #[arg(short, long, value_name = "FILE", default_value = "test.html")]
    outputfile: PathBuf,

    /// Verbosity level; negative values silence the confirmation line
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    verbose: i32,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose);

    log::info!("ECG Report CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using extraction library v{}", ecg_record::VERSION);

    let record = ecg_record::extract_file(&args.inputfile)
        .with_context(|| format!("Failed to extract record from {:?}", args.inputfile))?;

    log::info!("Interpretation: {}", record.interpretation);
    log::info!("Diagnosis: {}", record.diagnosis);

    let table = ecg_record::WaveTable::from_record(&record);

    report::write_report(&record, &table, &args.outputfile)
        .with_context(|| format!("Failed to write report to {:?}", args.outputfile))?;

    if args.verbose >= 0 {
        println!("Output saved to {}", args.outputfile.display());
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: i32) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if verbose < 0 {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
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
