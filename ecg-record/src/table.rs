//! Tabular assembly of extracted waveforms
//!
//! Builds the rectangular table the renderer consumes: one scaled column per
//! lead plus the derived time axis `T`. Raw samples are microvolts; the table
//! holds millivolts.

use crate::types::Record;

/// Fixed divisor converting raw microvolt samples to millivolts
const MICROVOLTS_PER_MILLIVOLT: f64 = 1000.0;

/// One scaled lead column
#[derive(Debug, Clone, PartialEq)]
pub struct WaveColumn {
    name: String,
    values: Vec<f64>,
}

impl WaveColumn {
    /// Lead name this column was extracted from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scaled values in millivolts. Rows past the end of a shorter lead
    /// hold NaN.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Rectangular table of scaled samples sharing one time axis
///
/// Row count equals the longest lead; shorter leads are padded with NaN as
/// the missing-value marker. A record with no leads produces a zero-row
/// table, which renders as a report without panels.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveTable {
    time: Vec<f64>,
    columns: Vec<WaveColumn>,
}

impl WaveTable {
    /// Derive the table from a record
    ///
    /// Every sample is divided by 1000 (microvolts to millivolts; the
    /// record's writer speed is not applied) and `T[i] = i / sample_rate`.
    pub fn from_record(record: &Record) -> Self {
        let rows = record.leads.max_samples();

        let columns: Vec<WaveColumn> = record
            .leads
            .iter()
            .map(|lead| {
                let mut values: Vec<f64> = lead
                    .samples
                    .iter()
                    .map(|v| v / MICROVOLTS_PER_MILLIVOLT)
                    .collect();
                values.resize(rows, f64::NAN);
                WaveColumn {
                    name: lead.name.clone(),
                    values,
                }
            })
            .collect();

        let rate = record.sample_rate.value;
        let time: Vec<f64> = (0..rows).map(|i| i as f64 / rate).collect();

        log::debug!(
            "Assembled table: {} rows, columns [{}]",
            rows,
            columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        WaveTable { time, columns }
    }

    /// Number of rows (length of the longest lead)
    pub fn row_count(&self) -> usize {
        self.time.len()
    }

    /// Derived time axis in seconds
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Scaled lead columns in document order
    pub fn columns(&self) -> &[WaveColumn] {
        &self.columns
    }

    /// Largest time value, 0.0 for an empty table
    pub fn time_span(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }
}
