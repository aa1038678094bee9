//! ECG Record Extraction Library
//!
//! A stateless, reusable library for reading proprietary ECG-recording XML
//! exports: multi-lead waveform samples, sampling-rate and paper-speed
//! metadata, and free-text clinical statements.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on extraction:
//! - Parses the export in one pass with a namespace-resolving pull parser
//! - Collects per-lead samples with the format's last-write-wins semantics
//! - Folds clinical statements into the interpretation and diagnosis texts
//! - Derives the scaled numeric table with the synthetic time axis
//!
//! The library does NOT:
//! - Analyze waveforms or derive diagnoses
//! - Draw charts
//! - Generate reports
//!
//! All rendering lives in the application layer (ecg-report-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use ecg_record::{extract_file, WaveTable};
//! use std::path::Path;
//!
//! let record = extract_file(Path::new("export.xml")).unwrap();
//! println!(
//!     "{} leads at {} {}",
//!     record.leads.len(),
//!     record.sample_rate.value,
//!     record.sample_rate.unit
//! );
//!
//! let table = WaveTable::from_record(&record);
//! for column in table.columns() {
//!     println!("{}: {} rows", column.name(), table.row_count());
//! }
//! ```

// Public modules
pub mod extractor;
pub mod table;
pub mod types;

// Re-export main types for convenience
pub use extractor::{extract_file, extract_str};
pub use table::{WaveColumn, WaveTable};
pub use types::{ExtractError, Lead, LeadSet, Record, Result, UnitValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
