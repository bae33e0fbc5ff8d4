//! End-to-end batch runs against scratch input/output trees.
//!
//! Charts go through a recording renderer that writes placeholder files, so
//! these tests need no system fonts.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use capture_plots::batch::{self, DatasetSummary, SUMMARY_FILE_NAME};
use capture_plots::config::Config;
use capture_plots::output::PlotCategory;
use capture_plots::plot::{self, ChartRenderer};
use capture_plots::stats::{Ccdf, DelayPdf};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Drawn {
    PacketLength { points: usize },
    DelayPdf { bins: usize, curve: usize },
    Ccdf { legend: Vec<String> },
}

#[derive(Default)]
struct RecordingRenderer {
    drawn: RefCell<Vec<(PathBuf, Drawn)>>,
}

impl RecordingRenderer {
    fn record(&self, path: &Path, drawn: Drawn) -> plot::Result<()> {
        fs::write(path, b"chart").map_err(|e| plot::PlotError::Drawing(e.to_string()))?;
        self.drawn.borrow_mut().push((path.to_path_buf(), drawn));
        Ok(())
    }

    fn file_names(&self, category: PlotCategory) -> Vec<String> {
        let folder = |p: &Path| p.parent()?.file_name()?.to_str().map(str::to_owned);
        self.drawn
            .borrow()
            .iter()
            .filter(|(p, _)| folder(p.as_path()).as_deref() == Some(category.dir_name()))
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn packet_length(&self, series: &[(f64, u32)], path: &Path) -> plot::Result<()> {
        self.record(path, Drawn::PacketLength { points: series.len() })
    }

    fn delay_pdf(&self, pdf: &DelayPdf, path: &Path) -> plot::Result<()> {
        self.record(
            path,
            Drawn::DelayPdf {
                bins: pdf.histogram.bin_count(),
                curve: pdf.curve.len(),
            },
        )
    }

    fn ccdf(&self, series: &[(String, Ccdf)], path: &Path) -> plot::Result<()> {
        let legend = series.iter().map(|(label, _)| label.clone()).collect();
        self.record(path, Drawn::Ccdf { legend })
    }
}

struct Workspace {
    _dir: TempDir,
    config: Config,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("csv_files");
        fs::create_dir(&input).unwrap();
        let config = Config {
            input_dir: input,
            output_root: dir.path().join("res"),
            ..Config::default()
        };
        Self { _dir: dir, config }
    }

    fn add_csv(&self, name: &str, rows: &[(f64, u32)]) {
        let mut text = String::from("No.,Time,Source,Destination,Protocol,Length,Info\n");
        for (i, (t, len)) in rows.iter().enumerate() {
            text.push_str(&format!("{},{t},10.0.0.2,10.0.0.1,TCP,{len},seg\n", i + 1));
        }
        fs::write(self.config.input_dir.join(name), text).unwrap();
    }

    fn category_dir(&self, category: PlotCategory) -> PathBuf {
        self.config.output_root.join(category.dir_name())
    }
}

fn sample_rows(offset: u32) -> Vec<(f64, u32)> {
    vec![
        (0.0, 60 + offset),
        (0.4, 1500),
        (1.9, 90 + offset),
        (2.0, 1400),
        (4.6, 52 + offset),
    ]
}

#[test]
fn empty_input_directory_still_recreates_output_tree() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.category_dir(PlotCategory::Pdf)).unwrap();
    fs::write(ws.category_dir(PlotCategory::Pdf).join("stale.png"), b"old").unwrap();

    let renderer = RecordingRenderer::default();
    let report = batch::run_with(&ws.config, &renderer).unwrap();

    assert_eq!(report.datasets, 0);
    assert!(report.charts.is_empty());
    assert!(report.summary.is_none());
    assert!(renderer.drawn.borrow().is_empty());
    for category in PlotCategory::ALL {
        let dir = ws.category_dir(category);
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0, "{} not empty", dir.display());
    }
}

#[test]
fn every_dataset_gets_length_and_pdf_charts() {
    let ws = Workspace::new();
    ws.add_csv("WhatsApp_text.csv", &sample_rows(0));
    ws.add_csv("WhatsApp_photos.csv", &sample_rows(10));
    ws.add_csv("WhatsApp_audio.csv", &sample_rows(20));
    ws.add_csv("WhatsApp_videos.csv", &sample_rows(30));
    ws.add_csv("Zoom_call.csv", &sample_rows(40));

    let renderer = RecordingRenderer::default();
    let report = batch::run_with(&ws.config, &renderer).unwrap();

    let expected: Vec<String> = [
        "WhatsApp_audio",
        "WhatsApp_photos",
        "WhatsApp_text",
        "WhatsApp_videos",
        "Zoom_call",
    ]
    .iter()
    .map(|l| format!("{l}.png"))
    .collect();

    assert_eq!(report.datasets, 5);
    assert_eq!(renderer.file_names(PlotCategory::PacketLength), expected);
    assert_eq!(renderer.file_names(PlotCategory::Pdf), expected);
    assert_eq!(renderer.file_names(PlotCategory::Ccdf), vec!["Plots.png"]);
    assert_eq!(report.charts.len(), 11);
    for chart in &report.charts {
        assert!(chart.is_file(), "{} missing", chart.display());
    }

    let drawn = renderer.drawn.borrow();
    assert!(drawn.contains(&(
        ws.category_dir(PlotCategory::PacketLength).join("Zoom_call.png"),
        Drawn::PacketLength { points: 5 }
    )));
    // delays [0.4, 1.5, 0.1, 2.6, 0] -> edges 0..=3
    assert!(drawn.contains(&(
        ws.category_dir(PlotCategory::Pdf).join("WhatsApp_text.png"),
        Drawn::DelayPdf { bins: 3, curve: 1000 }
    )));
    let (_, last) = drawn.last().unwrap();
    assert_eq!(
        last,
        &Drawn::Ccdf {
            legend: vec![
                "Text Group".to_string(),
                "Photos Group".to_string(),
                "Audio Group".to_string(),
                "Video Group".to_string(),
            ]
        }
    );
}

#[test]
fn ccdf_chart_leaves_out_missing_groups() {
    let ws = Workspace::new();
    ws.add_csv("WhatsApp_videos_2024.csv", &sample_rows(0));
    ws.add_csv("WhatsApp_text.csv", &sample_rows(0));

    let renderer = RecordingRenderer::default();
    batch::run_with(&ws.config, &renderer).unwrap();

    let drawn = renderer.drawn.borrow();
    let (path, last) = drawn.last().unwrap();
    assert_eq!(path, &ws.category_dir(PlotCategory::Ccdf).join("Plots.png"));
    assert_eq!(
        last,
        &Drawn::Ccdf {
            legend: vec!["Text Group".to_string(), "Video Group".to_string()]
        }
    );
}

#[test]
fn summary_lists_each_dataset() {
    let ws = Workspace::new();
    ws.add_csv("WhatsApp_audio.csv", &[(0.0, 100), (1.0, 200), (2.0, 150), (3.0, 400)]);

    let report = batch::run_with(&ws.config, &RecordingRenderer::default()).unwrap();

    let path = report.summary.unwrap();
    assert_eq!(path, ws.config.output_root.join(SUMMARY_FILE_NAME));
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    let expected = DatasetSummary {
        label: "WhatsApp_audio".to_string(),
        observations: 4,
        mean_delay: 0.75,
        fitted_rate: 1.0 / 0.75,
        histogram_bins: 1,
        max_length: 400,
    };
    assert_eq!(json, serde_json::json!([expected]));
}

#[test]
fn summary_can_be_turned_off() {
    let mut ws = Workspace::new();
    ws.config.write_summary = false;
    ws.add_csv("WhatsApp_text.csv", &sample_rows(0));

    let report = batch::run_with(&ws.config, &RecordingRenderer::default()).unwrap();
    assert!(report.summary.is_none());
    assert!(!ws.config.output_root.join(SUMMARY_FILE_NAME).exists());
}

#[test]
fn degenerate_dataset_aborts_the_run() {
    let ws = Workspace::new();
    ws.add_csv("WhatsApp_text.csv", &sample_rows(0));
    // a single packet has no inter-packet delay
    ws.add_csv("WhatsApp_audio.csv", &[(0.0, 100)]);

    let err = batch::run_with(&ws.config, &RecordingRenderer::default()).unwrap_err();
    assert!(format!("{err:#}").contains("WhatsApp_audio"), "{err:#}");
}

#[test]
fn missing_input_directory_is_an_error() {
    let mut ws = Workspace::new();
    ws.config.input_dir = ws.config.input_dir.join("does-not-exist");

    assert!(batch::run_with(&ws.config, &RecordingRenderer::default()).is_err());
    // the output tree is reset before inputs are read
    assert!(ws.category_dir(PlotCategory::Ccdf).is_dir());
}
