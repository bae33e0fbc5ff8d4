use std::collections::BTreeMap;

use thiserror::Error;

/// Name of the capture-time column in exported tables (seconds).
pub const TIME_COLUMN: &str = "Time";
/// Name of the packet-size column in exported tables (bytes).
pub const LENGTH_COLUMN: &str = "Length";

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("'Time' has {times} values but 'Length' has {lengths}")]
    ColumnLengthMismatch { times: usize, lengths: usize },

    #[error("row {row}: 'Time' is not a finite number")]
    NonFiniteTime { row: usize },
}

// ---------------------------------------------------------------------------
// ObservationTable – one capture export
// ---------------------------------------------------------------------------

/// The `(Time, Length)` pairs of a single capture export, in file order.
///
/// Stored column-wise since every transform works on one whole column.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    times: Vec<f64>,
    lengths: Vec<u32>,
}

impl ObservationTable {
    pub fn new(times: Vec<f64>, lengths: Vec<u32>) -> Result<Self, TableError> {
        if times.len() != lengths.len() {
            return Err(TableError::ColumnLengthMismatch {
                times: times.len(),
                lengths: lengths.len(),
            });
        }
        if let Some(row) = times.iter().position(|t| !t.is_finite()) {
            return Err(TableError::NonFiniteTime { row });
        }
        Ok(Self { times, lengths })
    }

    /// Capture timestamps in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Packet sizes in bytes.
    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    /// Packet sizes widened to `f64` for the numeric transforms.
    pub fn lengths_f64(&self) -> Vec<f64> {
        self.lengths.iter().map(|&l| f64::from(l)).collect()
    }

    /// Largest packet in the table, `None` when empty.
    pub fn max_length(&self) -> Option<u32> {
        self.lengths.iter().copied().max()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Dataset label (file stem) → table. Ordered so runs are reproducible.
pub type LabeledDatasets = BTreeMap<String, ObservationTable>;
