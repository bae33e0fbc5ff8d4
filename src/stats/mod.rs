//! Statistical transforms applied to each observation table.
//!
//! - [`series`]: packet length over time (passthrough)
//! - [`delay`]: inter-packet delay histogram with an exponential overlay
//! - [`ccdf`]: normalized complementary CDF of a numeric column
//!
//! All transforms are pure.  Degenerate input that would divide by zero is
//! reported as a [`StatsError`] instead.

pub mod ccdf;
pub mod delay;
pub mod series;

use thiserror::Error;

pub use ccdf::{Ccdf, DEFAULT_THRESHOLD, ccdf, length_ccdf};
pub use delay::{DelayPdf, ExponentialFit, FIT_SAMPLES, Histogram, delay_pdf, delay_series};
pub use series::packet_length_series;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("no observations to analyse")]
    EmptyInput,

    #[error("maximum value is zero, cannot normalize")]
    ZeroMaximum,

    #[error("mean inter-packet delay is zero, exponential rate is undefined")]
    ZeroMeanDelay,

    #[error("input contains infinite or NaN values")]
    NonFinite,
}
