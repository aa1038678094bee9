//! Core types for the ECG record extraction library
//!
//! This module defines the data model filled in by the extractor: one [`Record`]
//! per input file, holding metadata, the ordered lead collection and the two
//! clinical text fields. The extractor only assembles records - table derivation
//! and rendering happen elsewhere.

use std::path::PathBuf;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// A unit-qualified metadata value (e.g. `1000 Hz`, `25 mm/s`)
#[derive(Debug, Clone, PartialEq)]
pub struct UnitValue {
    /// Unit string as written in the export (attribute `U`)
    pub unit: String,
    /// Numeric value (attribute `V`)
    pub value: f64,
}

impl UnitValue {
    pub fn new(unit: &str, value: f64) -> Self {
        Self {
            unit: unit.to_string(),
            value,
        }
    }

    /// Default sampling rate assumed when the export carries no `sampleRate`
    pub fn default_sample_rate() -> Self {
        Self::new("Hz", 1000.0)
    }

    /// Default paper speed assumed when the export carries no `writerSpeed`
    pub fn default_writer_speed() -> Self {
        Self::new("mm/s", 25.0)
    }
}

/// One named channel of ECG voltage samples
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    /// Lead name from the export (e.g. "I", "II", "V1")
    pub name: String,
    /// Raw sample values in document order (microvolts)
    pub samples: Vec<f64>,
}

/// Ordered collection of leads, keyed by name
///
/// Iteration order is the document order of first appearance. Inserting a
/// name that already exists replaces its samples in place without moving
/// the lead, so a repeated waveform block overwrites rather than appends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadSet {
    leads: Vec<Lead>,
}

impl LeadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a lead (last write wins)
    pub fn insert(&mut self, name: String, samples: Vec<f64>) {
        if let Some(existing) = self.leads.iter_mut().find(|l| l.name == name) {
            existing.samples = samples;
        } else {
            self.leads.push(Lead { name, samples });
        }
    }

    /// Look up a lead's samples by name
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.leads
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.samples.as_slice())
    }

    /// Number of distinct leads
    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// Iterate leads in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = &Lead> {
        self.leads.iter()
    }

    /// Length of the longest sample sequence (0 when no leads exist)
    pub fn max_samples(&self) -> usize {
        self.leads.iter().map(|l| l.samples.len()).max().unwrap_or(0)
    }
}

/// One parsed ECG recording export
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Namespace URI of the root element (None when the root is unqualified)
    pub namespace: Option<String>,
    /// Sampling rate used to derive the time axis, defaults to 1000 Hz
    pub sample_rate: UnitValue,
    /// Paper speed from the export, defaults to 25 mm/s. Extracted and
    /// reported but never applied to sample values.
    pub writer_speed: UnitValue,
    /// Extracted waveform channels in document order
    pub leads: LeadSet,
    /// Clinical interpretation text, space-joined statement values
    pub interpretation: String,
    /// Hookup advisor text, space-joined statement values
    pub diagnosis: String,
}

impl Record {
    pub fn new() -> Self {
        Self {
            namespace: None,
            sample_rate: UnitValue::default_sample_rate(),
            writer_speed: UnitValue::default_writer_speed(),
            leads: LeadSet::new(),
            interpretation: String::new(),
            diagnosis: String::new(),
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during extraction
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read input file {path:?}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML document: {0}")]
    MalformedXml(String),

    #[error("Invalid number in <{element}>: {value:?}")]
    InvalidNumber {
        element: &'static str,
        value: String,
    },

    #[error("Missing required attribute {attribute:?} on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}
