use super::StatsError;
use crate::data::model::ObservationTable;

/// Historical default for the `threshold` argument of [`ccdf`].
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Empirical complementary CDF of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Ccdf {
    /// Sorted values divided by their maximum, ascending in (0, 1].
    pub normalized: Vec<f64>,
    /// `1 - rank / n` for rank `1..=n`.
    pub probabilities: Vec<f64>,
}

impl Ccdf {
    /// `(normalized value, ccdf)` pairs for plotting.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.normalized
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Compute the normalized CCDF of `values`.
///
/// `threshold` is accepted for compatibility with existing callers and does
/// not affect the result.
pub fn ccdf(values: &[f64], threshold: f64) -> Result<Ccdf, StatsError> {
    let _ = threshold;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let max = *sorted.last().ok_or(StatsError::EmptyInput)?;
    if max == 0.0 {
        return Err(StatsError::ZeroMaximum);
    }

    let n = sorted.len() as f64;
    let probabilities = (1..=sorted.len()).map(|rank| 1.0 - rank as f64 / n).collect();
    let normalized = sorted.into_iter().map(|v| v / max).collect();

    Ok(Ccdf {
        normalized,
        probabilities,
    })
}

/// CCDF of a table's packet sizes.
pub fn length_ccdf(table: &ObservationTable) -> Result<Ccdf, StatsError> {
    ccdf(&table.lengths_f64(), DEFAULT_THRESHOLD)
}
