use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, UInt32Type};
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{LENGTH_COLUMN, LabeledDatasets, ObservationTable, TIME_COLUMN};

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Json,
    Parquet,
}

impl InputFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// List the loadable files in `dir` with their labels (file name without
/// extension), sorted by file name.
///
/// Sub-directories and files with an unrecognised extension are skipped.
pub fn discover_datasets(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading input directory {}", dir.display()))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if InputFormat::from_path(&path).is_none() {
            debug!("skipping {} (unsupported extension)", path.display());
            continue;
        }
        let Some(label) = path.file_stem().and_then(|s| s.to_str()) else {
            debug!("skipping {} (non UTF-8 file name)", path.display());
            continue;
        };
        debug!("discovered dataset '{label}' at {}", path.display());
        found.push((path.clone(), label.to_string()));
    }

    found.sort();
    Ok(found)
}

/// Load every dataset found in `dir` into a label → table map.
///
/// A file that fails to parse aborts the whole load.  When two files share a
/// stem (`a.csv`, `a.parquet`) the one whose file name sorts last is kept.
pub fn load_datasets(dir: &Path) -> Result<LabeledDatasets> {
    let mut datasets = LabeledDatasets::new();
    for (path, label) in discover_datasets(dir)? {
        let table = load_file(&path).with_context(|| format!("loading {}", path.display()))?;
        info!("loaded '{label}': {} observations", table.len());
        if datasets.insert(label.clone(), table).is_some() {
            warn!("'{label}' loaded more than once, keeping {}", path.display());
        }
    }
    Ok(datasets)
}

/// Load a single capture export.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – delimited text with a header row containing
///   `Time` and `Length` (any other columns are ignored)
/// * `.json`         – `[{ "Time": 0.1, "Length": 60, ... }, ...]`
/// * `.parquet`      – numeric `Time` and `Length` columns
pub fn load_file(path: &Path) -> Result<ObservationTable> {
    match InputFormat::from_path(path) {
        Some(InputFormat::Csv) => load_delimited(path, b','),
        Some(InputFormat::Tsv) => load_delimited(path, b'\t'),
        Some(InputFormat::Json) => load_json(path),
        Some(InputFormat::Parquet) => load_parquet(path),
        None => bail!("Unsupported file: {}", path.display()),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Works on raw byte records: only the two numeric fields are decoded, so
/// exports in legacy code pages (e.g. windows-1255 `Info` columns) load fine.
fn load_delimited(path: &Path, delimiter: u8) -> Result<ObservationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .context("opening delimited file")?;

    let headers = reader.byte_headers().context("reading headers")?.clone();
    let time_idx = column_index(&headers, TIME_COLUMN)
        .with_context(|| format!("missing '{TIME_COLUMN}' column"))?;
    let length_idx = column_index(&headers, LENGTH_COLUMN)
        .with_context(|| format!("missing '{LENGTH_COLUMN}' column"))?;

    let mut times = Vec::new();
    let mut lengths = Vec::new();

    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        times.push(parse_field::<f64>(record.get(time_idx), row_no, TIME_COLUMN)?);
        lengths.push(parse_field::<u32>(record.get(length_idx), row_no, LENGTH_COLUMN)?);
    }

    Ok(ObservationTable::new(times, lengths)?)
}

fn column_index(headers: &csv::ByteRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.strip_prefix(b"\xef\xbb\xbf").unwrap_or(h);
        h.trim_ascii() == name.as_bytes()
    })
}

fn parse_field<T>(field: Option<&[u8]>, row: usize, col: &str) -> Result<T>
where
    T: FromStr,
{
    let raw = field.with_context(|| format!("row {row}: no '{col}' field"))?;
    let text = std::str::from_utf8(raw)
        .with_context(|| format!("row {row}: '{col}' is not valid text"))?
        .trim();
    match text.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => bail!("row {row}: '{col}' value '{text}' is not a number"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(rename = "Time")]
    time: f64,
    #[serde(rename = "Length")]
    length: u32,
}

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
/// Keys other than `Time` and `Length` are ignored.
fn load_json(path: &Path) -> Result<ObservationTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<JsonRecord> = serde_json::from_str(&text).context("parsing JSON")?;

    let (times, lengths) = records.into_iter().map(|r| (r.time, r.length)).unzip();
    Ok(ObservationTable::new(times, lengths)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// `Time` and `Length` may be stored as any numeric Arrow type; they are cast
/// to `Float64` and `UInt32` respectively.  Nulls are rejected.
fn load_parquet(path: &Path) -> Result<ObservationTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut times = Vec::new();
    let mut lengths = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let time_idx = schema
            .index_of(TIME_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{TIME_COLUMN}' column"))?;
        let length_idx = schema
            .index_of(LENGTH_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{LENGTH_COLUMN}' column"))?;

        let time_col = cast_non_null(batch.column(time_idx), &DataType::Float64, TIME_COLUMN)?;
        let length_col = cast_non_null(batch.column(length_idx), &DataType::UInt32, LENGTH_COLUMN)?;

        times.extend_from_slice(time_col.as_primitive::<Float64Type>().values());
        lengths.extend_from_slice(length_col.as_primitive::<UInt32Type>().values());
    }

    Ok(ObservationTable::new(times, lengths)?)
}

/// Values the target type cannot hold (negative lengths, say) come out of
/// `cast` as nulls, so they are counted apart from nulls already in the file.
fn cast_non_null(col: &ArrayRef, to: &DataType, name: &str) -> Result<ArrayRef> {
    if col.null_count() > 0 {
        bail!("'{name}' column contains {} null value(s)", col.null_count());
    }
    let converted = cast(col, to)
        .with_context(|| format!("'{name}' column of type {:?} is not numeric", col.data_type()))?;
    if converted.null_count() > 0 {
        bail!(
            "'{name}' column has {} value(s) out of range for {to:?}",
            converted.null_count()
        );
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    const WIRESHARK_CSV: &str = "\"No.\",\"Time\",\"Source\",\"Destination\",\"Protocol\",\"Length\",\"Info\"\n\
        \"1\",\"0.000000\",\"10.0.0.2\",\"157.240.1.53\",\"TLSv1.2\",\"100\",\"Application Data\"\n\
        \"2\",\"1.000000\",\"157.240.1.53\",\"10.0.0.2\",\"TCP\",\"200\",\"443 > 51000 [ACK]\"\n\
        \"3\",\"2.000000\",\"10.0.0.2\",\"157.240.1.53\",\"TLSv1.2\",\"150\",\"Application Data\"\n\
        \"4\",\"3.000000\",\"157.240.1.53\",\"10.0.0.2\",\"TLSv1.2\",\"400\",\"Application Data\"\n";

    #[test]
    fn loads_wireshark_csv_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("WhatsApp_text.csv");
        fs::write(&path, WIRESHARK_CSV).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.times(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(table.lengths(), &[100, 200, 150, 400]);
    }

    #[test]
    fn tolerates_non_utf8_bytes_in_other_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hebrew.csv");
        let mut bytes = b"Time,Length,Info\n0.5,60,".to_vec();
        // windows-1255 "shalom"
        bytes.extend_from_slice(&[0xf9, 0xec, 0xe5, 0xed]);
        bytes.extend_from_slice(b"\n1.25,1514,ok\n");
        fs::write(&path, bytes).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.times(), &[0.5, 1.25]);
        assert_eq!(table.lengths(), &[60, 1514]);
    }

    #[test]
    fn utf8_bom_before_first_header_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}Time,Length\n0,10\n").unwrap();

        assert_eq!(load_file(&path).unwrap().len(), 1);
    }

    #[test]
    fn loads_tab_separated_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audio.tsv");
        fs::write(&path, "Length\tTime\n64\t0.0\n1280\t0.02\n").unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.times(), &[0.0, 0.02]);
        assert_eq!(table.lengths(), &[64, 1280]);
    }

    #[test]
    fn missing_length_column_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.csv");
        fs::write(&path, "Time,Size\n0.0,10\n").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'Length' column"));
    }

    #[test]
    fn non_numeric_time_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.csv");
        fs::write(&path, "Time,Length\nnoon,10\n").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("'Time' value 'noon' is not a number"));
    }

    #[test]
    fn loads_records_oriented_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photos.json");
        fs::write(
            &path,
            r#"[{"No.":1,"Time":0.0,"Length":1400},{"No.":2,"Time":0.3,"Length":66}]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.times(), &[0.0, 0.3]);
        assert_eq!(table.lengths(), &[1400, 66]);
    }

    #[test]
    fn infinite_or_nan_time_is_an_error() {
        let dir = TempDir::new().unwrap();
        let inf = dir.path().join("inf.csv");
        fs::write(&inf, "Time,Length\n0,10\ninf,20\n").unwrap();
        let nan = dir.path().join("nan.csv");
        fs::write(&nan, "Time,Length\n0,1\nNaN,2\n2,3\n").unwrap();

        let err = load_file(&inf).unwrap_err();
        assert!(format!("{err:#}").contains("row 1: 'Time' is not a finite number"), "{err:#}");
        let err = load_file(&nan).unwrap_err();
        assert!(format!("{err:#}").contains("row 1: 'Time' is not a finite number"), "{err:#}");
    }

    fn write_parquet(path: &Path, times: Vec<f64>, lengths: Vec<i64>) {
        let protocols = vec!["UDP"; times.len()];
        let schema = Arc::new(Schema::new(vec![
            Field::new("Time", DataType::Float64, false),
            Field::new("Length", DataType::Int64, false),
            Field::new("Protocol", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(times)),
                Arc::new(Int64Array::from(lengths)),
                Arc::new(StringArray::from(protocols)),
            ],
        )
        .unwrap();
        let file = fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn loads_parquet_with_integer_lengths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.parquet");
        write_parquet(&path, vec![0.0, 0.25, 0.75], vec![1500, 52, 1500]);

        let table = load_file(&path).unwrap();
        assert_eq!(table.times(), &[0.0, 0.25, 0.75]);
        assert_eq!(table.lengths(), &[1500, 52, 1500]);
    }

    #[test]
    fn negative_parquet_length_is_reported_as_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.parquet");
        write_parquet(&path, vec![0.0, 0.5, 1.0], vec![1500, -5, 1 << 40]);

        let err = format!("{:#}", load_file(&path).unwrap_err());
        assert!(err.contains("'Length' column has 2 value(s) out of range for UInt32"), "{err}");
        assert!(!err.contains("null"), "{err}");
    }

    #[test]
    fn discovery_labels_by_stem_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("WhatsApp_videos.csv"), "Time,Length\n0,1\n").unwrap();
        fs::write(dir.path().join("WhatsApp_audio.csv"), "Time,Length\n0,1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "captured on the lab machine").unwrap();
        fs::create_dir(dir.path().join("raw")).unwrap();

        let found = discover_datasets(dir.path()).unwrap();
        let labels: Vec<&str> = found.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, vec!["WhatsApp_audio", "WhatsApp_videos"]);
    }

    #[test]
    fn empty_directory_yields_empty_map() {
        let dir = TempDir::new().unwrap();
        assert!(load_datasets(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_datasets(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn same_stem_in_two_formats_keeps_one_dataset() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "Time,Length\n0,1\n").unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"Time":0.0,"Length":2},{"Time":1.0,"Length":3}]"#)
            .unwrap();

        let datasets = load_datasets(dir.path()).unwrap();
        assert_eq!(datasets.len(), 1);
        // "a.json" sorts after "a.csv"
        assert_eq!(datasets["a"].lengths(), &[2, 3]);
    }

    #[test]
    fn one_bad_file_aborts_the_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.csv"), "Time,Length\n0,1\n").unwrap();
        fs::write(dir.path().join("bad.csv"), "Time\n0\n").unwrap();

        assert!(load_datasets(dir.path()).is_err());
    }
}
