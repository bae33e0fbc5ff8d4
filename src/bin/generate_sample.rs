use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const CLIENT: &str = "10.0.0.2";
const SERVER: &str = "157.240.1.53";

/// Traffic profile of one synthetic capture.
struct Profile {
    name: &'static str,
    packets: usize,
    /// Mean packets per second (exponential inter-arrival times).
    rate: f64,
    small: (u32, u32),
    large: (u32, u32),
    /// Probability that a packet is drawn from `large`.
    large_share: f64,
}

const PROFILES: [Profile; 4] = [
    Profile { name: "WhatsApp_text", packets: 400, rate: 0.8, small: (66, 320), large: (400, 900), large_share: 0.05 },
    Profile { name: "WhatsApp_photos", packets: 600, rate: 3.0, small: (66, 140), large: (1200, 1514), large_share: 0.6 },
    Profile { name: "WhatsApp_audio", packets: 500, rate: 2.0, small: (66, 200), large: (300, 1100), large_share: 0.5 },
    Profile { name: "WhatsApp_videos", packets: 900, rate: 6.0, small: (66, 140), large: (1000, 1514), large_share: 0.85 },
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Inverse-CDF sample of an exponential distribution.
    fn exponential(&mut self, rate: f64) -> f64 {
        -(1.0 - self.next_f64()).ln() / rate
    }

    fn range(&mut self, (lo, hi): (u32, u32)) -> u32 {
        lo + (self.next_f64() * f64::from(hi - lo + 1)) as u32
    }
}

struct Capture {
    times: Vec<f64>,
    lengths: Vec<u32>,
    protocols: Vec<&'static str>,
}

fn generate(profile: &Profile, rng: &mut SimpleRng) -> Capture {
    let mut capture = Capture {
        times: Vec::with_capacity(profile.packets),
        lengths: Vec::with_capacity(profile.packets),
        protocols: Vec::with_capacity(profile.packets),
    };

    let mut t = 0.0;
    for i in 0..profile.packets {
        if i > 0 {
            t += rng.exponential(profile.rate);
        }
        let large = rng.next_f64() < profile.large_share;
        let length = rng.range(if large { profile.large } else { profile.small });

        capture.times.push(t);
        capture.lengths.push(length);
        capture.protocols.push(if large { "TLSv1.2" } else { "TCP" });
    }
    capture
}

fn write_csv(path: &Path, capture: &Capture) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["No.", "Time", "Source", "Destination", "Protocol", "Length", "Info"])?;

    for (i, ((t, len), proto)) in capture
        .times
        .iter()
        .zip(&capture.lengths)
        .zip(&capture.protocols)
        .enumerate()
    {
        let (src, dst) = if i % 2 == 0 { (CLIENT, SERVER) } else { (SERVER, CLIENT) };
        let info = if *proto == "TCP" { "443 > 51000 [ACK]" } else { "Application Data" };
        writer.write_record([
            (i + 1).to_string(),
            format!("{t:.6}"),
            src.to_string(),
            dst.to_string(),
            proto.to_string(),
            len.to_string(),
            info.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, capture: &Capture) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Time", DataType::Float64, false),
        Field::new("Length", DataType::UInt32, false),
        Field::new("Protocol", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(capture.times.clone())),
            Arc::new(UInt32Array::from(capture.lengths.clone())),
            Arc::new(StringArray::from(capture.protocols.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Usage: `generate_sample [OUTPUT_DIR] [--parquet]`
///
/// With `--parquet` each capture is also written to `OUTPUT_DIR/parquet/`.
fn main() -> Result<()> {
    let mut output_dir = PathBuf::from("resources/csv_files");
    let mut parquet = false;
    for arg in std::env::args().skip(1) {
        if arg == "--parquet" {
            parquet = true;
        } else {
            output_dir = PathBuf::from(arg);
        }
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    // Parquet copies go one level down so the two formats never share a label.
    let parquet_dir = output_dir.join("parquet");
    if parquet {
        std::fs::create_dir_all(&parquet_dir)
            .with_context(|| format!("creating {}", parquet_dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    for profile in &PROFILES {
        let capture = generate(profile, &mut rng);

        let csv_path = output_dir.join(format!("{}.csv", profile.name));
        write_csv(&csv_path, &capture)?;
        println!("Wrote {} packets to {}", capture.times.len(), csv_path.display());

        if parquet {
            let pq_path = parquet_dir.join(format!("{}.parquet", profile.name));
            write_parquet(&pq_path, &capture)?;
            println!("Wrote {} packets to {}", capture.times.len(), pq_path.display());
        }
    }
    Ok(())
}
