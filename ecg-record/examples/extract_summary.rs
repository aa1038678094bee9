//! Standalone extraction summary tool
//!
//! Reads an ECG XML export and prints the record metadata, the per-lead
//! sample counts and the derived table shape without rendering anything.
//!
//! Usage:
//!   extract_summary <export.xml>

use ecg_record::{extract_file, WaveTable};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <export.xml>", args[0]);
        std::process::exit(1);
    }

    let input = PathBuf::from(&args[1]);

    println!("=== ECG Export Summary ===");
    println!("Input: {:?}", input);
    println!();

    let record = extract_file(&input)?;

    println!(
        "Namespace: {}",
        record.namespace.as_deref().unwrap_or("(none)")
    );
    println!(
        "Sample rate: {} {}",
        record.sample_rate.value, record.sample_rate.unit
    );
    println!(
        "Writer speed: {} {}",
        record.writer_speed.value, record.writer_speed.unit
    );
    println!();

    println!("Leads: {}", record.leads.len());
    for lead in record.leads.iter() {
        println!("  {}: {} samples", lead.name, lead.samples.len());
    }
    println!();

    if !record.interpretation.is_empty() {
        println!("Interpretation: {}", record.interpretation);
    }
    if !record.diagnosis.is_empty() {
        println!("Diagnosis: {}", record.diagnosis);
    }

    let table = WaveTable::from_record(&record);
    println!();
    println!(
        "Table: {} rows x {} columns, {:.3} s span",
        table.row_count(),
        table.columns().len(),
        table.time_span()
    );

    Ok(())
}
