use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::data::filter::{CcdfGroup, default_ccdf_groups};

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "capture-plots.json";

/// Pixel sizes `[width, height]` of the rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSizes {
    pub packet_length: (u32, u32),
    pub pdf: (u32, u32),
    pub ccdf: (u32, u32),
}

impl Default for ChartSizes {
    fn default() -> Self {
        Self {
            packet_length: (1000, 500),
            pdf: (1000, 400),
            ccdf: (1000, 600),
        }
    }
}

/// Run settings.  Every field has a default, so a config file only needs
/// the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of capture exports to analyse.
    pub input_dir: PathBuf,
    /// Root of the categorized output tree.  Wiped at the start of a run.
    pub output_root: PathBuf,
    /// Series drawn on the combined CCDF chart, in legend order.
    pub ccdf_groups: Vec<CcdfGroup>,
    /// File name of the combined CCDF chart.
    pub ccdf_file_name: String,
    pub chart: ChartSizes,
    /// Write `summary.json` next to the category folders.
    pub write_summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("resources/csv_files"),
            output_root: PathBuf::from("res"),
            ccdf_groups: default_ccdf_groups(),
            ccdf_file_name: "Plots.png".to_string(),
            chart: ChartSizes::default(),
            write_summary: true,
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Use [`CONFIG_FILE_NAME`] from `dir` if it exists, the defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            info!("using config {}", path.display());
            Self::load(&path)
        } else {
            debug!("no {CONFIG_FILE_NAME} in {}, using defaults", dir.display());
            Ok(Self::default())
        }
    }
}
