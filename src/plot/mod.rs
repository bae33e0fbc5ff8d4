//! Chart rendering.
//!
//! Charts are drawn with [`plotters`] into an in-memory RGB buffer and then
//! encoded as PNG with the [`image`] crate.  The batch orchestrator only sees
//! the [`ChartRenderer`] trait.

mod canvas;
mod charts;

use std::path::Path;

use thiserror::Error;

use crate::config::ChartSizes;
use crate::stats::{Ccdf, DelayPdf};

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to encode or save image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = core::result::Result<T, PlotError>;

/// Renders the three chart kinds to files.
pub trait ChartRenderer {
    /// Bar chart of packet length against capture time.
    fn packet_length(&self, series: &[(f64, u32)], path: &Path) -> Result<()>;

    /// Delay histogram with the fitted exponential curve.
    fn delay_pdf(&self, pdf: &DelayPdf, path: &Path) -> Result<()>;

    /// One CCDF line per `(legend label, ccdf)` on a shared log-x chart.
    fn ccdf(&self, series: &[(String, Ccdf)], path: &Path) -> Result<()>;
}

/// Writes PNG files of the configured sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRenderer {
    sizes: ChartSizes,
}

impl PngRenderer {
    pub fn new(sizes: ChartSizes) -> Self {
        Self { sizes }
    }
}

impl ChartRenderer for PngRenderer {
    fn packet_length(&self, series: &[(f64, u32)], path: &Path) -> Result<()> {
        canvas::render_png(path, self.sizes.packet_length, |area| {
            charts::draw_packet_length(area, series)
        })
    }

    fn delay_pdf(&self, pdf: &DelayPdf, path: &Path) -> Result<()> {
        canvas::render_png(path, self.sizes.pdf, |area| charts::draw_delay_pdf(area, pdf))
    }

    fn ccdf(&self, series: &[(String, Ccdf)], path: &Path) -> Result<()> {
        canvas::render_png(path, self.sizes.ccdf, |area| charts::draw_ccdf(area, series))
    }
}
