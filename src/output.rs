use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

// ---------------------------------------------------------------------------
// Plot categories
// ---------------------------------------------------------------------------

/// One sub-folder of the output tree per kind of chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotCategory {
    PacketLength,
    Ccdf,
    Pdf,
}

impl PlotCategory {
    pub const ALL: [PlotCategory; 3] = [Self::PacketLength, Self::Ccdf, Self::Pdf];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::PacketLength => "Packet_Length",
            Self::Ccdf => "CCDF",
            Self::Pdf => "PDF",
        }
    }
}

impl fmt::Display for PlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

// ---------------------------------------------------------------------------
// Output tree
// ---------------------------------------------------------------------------

/// The categorized output tree rooted at a configurable directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: PlotCategory) -> PathBuf {
        self.root.join(category.dir_name())
    }

    pub fn file_path(&self, category: PlotCategory, file_name: &str) -> PathBuf {
        self.category_dir(category).join(file_name)
    }

    /// `<root>/<category>/<label>.png`
    pub fn chart_path(&self, category: PlotCategory, label: &str) -> PathBuf {
        self.file_path(category, &format!("{label}.png"))
    }

    /// Delete the whole tree (including any earlier run's charts) and create
    /// the empty category folders again.
    pub fn reset(&self) -> Result<()> {
        if self.root.is_dir() {
            debug!("removing previous output at {}", self.root.display());
            fs::remove_dir_all(&self.root)
                .with_context(|| format!("removing {}", self.root.display()))?;
        }
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))?;

        for category in PlotCategory::ALL {
            let dir = self.category_dir(category);
            fs::create_dir(&dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }
}
