//! Batch orchestration: reset the output tree, load every dataset, and write
//! one chart per dataset and transform plus the combined CCDF chart.
//!
//! Strictly sequential.  The first error aborts the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use crate::config::Config;
use crate::data::filter::{CcdfGroup, select_ccdf_inputs};
use crate::data::loader::load_datasets;
use crate::data::model::LabeledDatasets;
use crate::output::{OutputLayout, PlotCategory};
use crate::plot::{ChartRenderer, PngRenderer};
use crate::stats::{delay_pdf, length_ccdf, packet_length_series};

/// Name of the per-run statistics file written under the output root.
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Per-dataset numbers recorded in `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub label: String,
    pub observations: usize,
    pub mean_delay: f64,
    pub fitted_rate: f64,
    pub histogram_bins: usize,
    pub max_length: u32,
}

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub datasets: usize,
    /// Every chart written, in the order it was written.
    pub charts: Vec<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// Run the whole batch with PNG output.
pub fn run(config: &Config) -> Result<RunReport> {
    run_with(config, &PngRenderer::new(config.chart))
}

/// Run the whole batch with a caller-supplied renderer.
pub fn run_with<R: ChartRenderer>(config: &Config, renderer: &R) -> Result<RunReport> {
    let layout = OutputLayout::new(&config.output_root);
    layout.reset()?;

    let datasets = load_datasets(&config.input_dir)?;
    info!(
        "loaded {} dataset(s) from {}",
        datasets.len(),
        config.input_dir.display()
    );

    let mut report = RunReport {
        datasets: datasets.len(),
        ..RunReport::default()
    };

    plot_all_packet_length(&datasets, &layout, renderer, &mut report)?;
    let summaries = plot_all_delay_pdf(&datasets, &layout, renderer, &mut report)?;
    plot_ccdf(
        &datasets,
        &config.ccdf_groups,
        &layout.file_path(PlotCategory::Ccdf, &config.ccdf_file_name),
        renderer,
        &mut report,
    )?;

    if config.write_summary && !summaries.is_empty() {
        let path = layout.root().join(SUMMARY_FILE_NAME);
        let json = serde_json::to_string_pretty(&summaries).context("serializing summary")?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        report.summary = Some(path);
    }

    info!(
        "Files generated successfully: {} chart(s) under {}",
        report.charts.len(),
        layout.root().display()
    );
    Ok(report)
}

/// One packet-length bar chart per dataset.
pub fn plot_all_packet_length<R: ChartRenderer>(
    datasets: &LabeledDatasets,
    layout: &OutputLayout,
    renderer: &R,
    report: &mut RunReport,
) -> Result<()> {
    for (label, table) in datasets {
        let path = layout.chart_path(PlotCategory::PacketLength, label);
        renderer
            .packet_length(&packet_length_series(table), &path)
            .with_context(|| format!("packet length chart for '{label}'"))?;
        info!("wrote {}", path.display());
        report.charts.push(path);
    }
    Ok(())
}

/// One delay-PDF chart per dataset.  Returns the per-dataset summary rows.
pub fn plot_all_delay_pdf<R: ChartRenderer>(
    datasets: &LabeledDatasets,
    layout: &OutputLayout,
    renderer: &R,
    report: &mut RunReport,
) -> Result<Vec<DatasetSummary>> {
    let mut summaries = Vec::with_capacity(datasets.len());
    for (label, table) in datasets {
        let pdf = delay_pdf(table).with_context(|| format!("delay PDF of '{label}'"))?;

        let path = layout.chart_path(PlotCategory::Pdf, label);
        renderer
            .delay_pdf(&pdf, &path)
            .with_context(|| format!("delay PDF chart for '{label}'"))?;
        info!("wrote {}", path.display());
        report.charts.push(path);

        summaries.push(DatasetSummary {
            label: label.clone(),
            observations: table.len(),
            mean_delay: pdf.mean_delay,
            fitted_rate: pdf.fit.rate,
            histogram_bins: pdf.histogram.bin_count(),
            max_length: table.max_length().unwrap_or(0),
        });
    }
    Ok(summaries)
}

/// The combined CCDF chart of the configured groups.
///
/// Groups without a matching dataset are left out; when none match no chart
/// is written.
pub fn plot_ccdf<R: ChartRenderer>(
    datasets: &LabeledDatasets,
    groups: &[CcdfGroup],
    path: &Path,
    renderer: &R,
    report: &mut RunReport,
) -> Result<()> {
    let mut series = Vec::new();
    for selection in select_ccdf_inputs(datasets, groups) {
        let Some((label, table)) = selection.dataset else {
            warn!(
                "no dataset starts with '{}', leaving '{}' off the CCDF chart",
                selection.group.prefix, selection.group.label
            );
            continue;
        };
        let ccdf = length_ccdf(table).with_context(|| format!("CCDF of '{label}'"))?;
        series.push((selection.group.label.clone(), ccdf));
    }

    if series.is_empty() {
        warn!("no CCDF group matched any dataset, skipping {}", path.display());
        return Ok(());
    }

    renderer.ccdf(&series, path).context("combined CCDF chart")?;
    info!("wrote {}", path.display());
    report.charts.push(path.to_path_buf());
    Ok(())
}
