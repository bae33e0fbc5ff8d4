use super::StatsError;
use crate::data::model::ObservationTable;

/// Number of points sampled along the fitted exponential curve.
pub const FIT_SAMPLES: usize = 1000;

/// Successive differences of `times`, padded with a trailing zero so the
/// result is as long as the input.
pub fn delay_series(times: &[f64]) -> Vec<f64> {
    if times.is_empty() {
        return Vec::new();
    }
    times
        .windows(2)
        .map(|w| w[1] - w[0])
        .chain(std::iter::once(0.0))
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Density-normalized histogram with unit-width bins starting at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `edges.len() == densities.len() + 1`
    pub edges: Vec<f64>,
    pub densities: Vec<f64>,
}

impl Histogram {
    /// Bin edges `0, 1, …, ceil(max)`.  The last bin is closed on the right;
    /// values outside `[0, ceil(max)]` are not counted.
    pub fn unit_bins(values: &[f64]) -> Result<Self, StatsError> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StatsError::NonFinite);
        }
        let max = values
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
            .ok_or(StatsError::EmptyInput)?;
        if max <= 0.0 {
            return Err(StatsError::ZeroMaximum);
        }

        let bins = max.ceil() as usize;
        let edges: Vec<f64> = (0..=bins).map(|e| e as f64).collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            if !(0.0..=bins as f64).contains(&v) {
                continue;
            }
            let idx = (v.floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let total: usize = counts.iter().sum();
        let densities = counts
            .iter()
            .zip(edges.windows(2))
            .map(|(&c, w)| c as f64 / (total as f64 * (w[1] - w[0])))
            .collect();

        Ok(Self { edges, densities })
    }

    pub fn bin_count(&self) -> usize {
        self.densities.len()
    }

    /// Index and density of the first highest bin.
    pub fn peak(&self) -> Option<(usize, f64)> {
        self.densities
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            })
    }

    /// Outline of the bars, closed down to zero at both ends.
    pub fn step_outline(&self) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(2 * self.densities.len() + 2);
        if let Some(&first) = self.edges.first() {
            points.push((first, 0.0));
        }
        for (w, &d) in self.edges.windows(2).zip(&self.densities) {
            points.push((w[0], d));
            points.push((w[1], d));
        }
        if let Some(&last) = self.edges.last() {
            points.push((last, 0.0));
        }
        points
    }
}

// ---------------------------------------------------------------------------
// Exponential fit
// ---------------------------------------------------------------------------

/// `scale · λ · e^(−λx)` with `λ = 1 / mean(delay)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialFit {
    pub rate: f64,
    /// Stretches the curve so it passes through the histogram's peak bin.
    pub scale: f64,
}

impl ExponentialFit {
    pub fn density(&self, x: f64) -> f64 {
        self.scale * self.rate * (-self.rate * x).exp()
    }

    /// `samples` evenly spaced points of the curve over `[0, upper]`.
    pub fn sample(&self, upper: f64, samples: usize) -> Vec<(f64, f64)> {
        match samples {
            0 => Vec::new(),
            1 => vec![(0.0, self.density(0.0))],
            _ => {
                let step = upper / (samples - 1) as f64;
                (0..samples)
                    .map(|i| {
                        let x = step * i as f64;
                        (x, self.density(x))
                    })
                    .collect()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Delay PDF
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DelayPdf {
    pub delays: Vec<f64>,
    pub mean_delay: f64,
    pub max_delay: f64,
    pub histogram: Histogram,
    pub fit: ExponentialFit,
    /// [`FIT_SAMPLES`] points of `fit` over `[0, max_delay]`.
    pub curve: Vec<(f64, f64)>,
}

/// Inter-packet delay PDF of a table, with the exponential overlay.
pub fn delay_pdf(table: &ObservationTable) -> Result<DelayPdf, StatsError> {
    delay_pdf_from_delays(delay_series(table.times()))
}

pub fn delay_pdf_from_delays(delays: Vec<f64>) -> Result<DelayPdf, StatsError> {
    if delays.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    if delays.iter().any(|d| !d.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    let mean_delay = delays.iter().sum::<f64>() / delays.len() as f64;
    if mean_delay == 0.0 {
        return Err(StatsError::ZeroMeanDelay);
    }
    let rate = 1.0 / mean_delay;

    let histogram = Histogram::unit_bins(&delays)?;
    let max_delay = delays.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // peak bin density / unscaled curve density at the bin's left edge
    let (peak_idx, peak_density) = histogram.peak().ok_or(StatsError::EmptyInput)?;
    let unscaled = ExponentialFit { rate, scale: 1.0 };
    let scale = peak_density / unscaled.density(histogram.edges[peak_idx]);

    let fit = ExponentialFit { rate, scale };
    let curve = fit.sample(max_delay, FIT_SAMPLES);

    Ok(DelayPdf {
        delays,
        mean_delay,
        max_delay,
        histogram,
        fit,
        curve,
    })
}
