//! Writes synthetic lock/temperature tables, one folder per run, ready to be
//! packed into archives (`rar a run01.rar run01` or `7z a run01.7z run01`).
//!
//! Usage: `generate_sample [output_dir] [runs]`

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const SAMPLES_PER_RUN: i64 = 600;
const LOCKED: f64 = 4999.99;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Lock signal: locked stretches of random length separated by near misses.
fn generate_lock(rng: &mut SimpleRng) -> Vec<f64> {
    let mut values = Vec::with_capacity(SAMPLES_PER_RUN as usize);
    let mut locked = false;
    while values.len() < SAMPLES_PER_RUN as usize {
        let stretch = 10 + (rng.next_u64() % 40) as usize;
        for _ in 0..stretch {
            let v = if locked {
                LOCKED
            } else {
                // Close to the sentinel but never equal to it.
                match rng.next_u64() % 3 {
                    0 => 4999.98,
                    1 => 5000.0,
                    _ => rng.gauss(4000.0, 500.0).round(),
                }
            };
            values.push(v);
        }
        locked = !locked;
    }
    values.truncate(SAMPLES_PER_RUN as usize);
    values
}

/// Temperature: slow drift from a per-run baseline plus noise.
fn generate_temperature(rng: &mut SimpleRng, baseline: f64) -> Vec<f64> {
    let mut t = baseline;
    (0..SAMPLES_PER_RUN)
        .map(|_| {
            t += rng.gauss(0.0, 0.3);
            t
        })
        .collect()
}

fn write_lock_csv(path: &Path, times: &[i64], lock: &[f64]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating lock CSV")?;
    writer.write_record(["time", "lock"])?;
    for (time, value) in times.iter().zip(lock) {
        writer.write_record([time.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_temperature_parquet(path: &Path, times: &[i64], temperature: &[f64]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Int64, false),
        Field::new("temperature", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(times.to_vec())),
            Arc::new(Float64Array::from(temperature.to_vec())),
        ],
    )
    .context("building record batch")?;

    let file = fs::File::create(path).context("creating temperature parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_dir = args.next().unwrap_or_else(|| "sample_runs".to_string());
    let runs: usize = match args.next() {
        Some(n) => n.parse().context("runs must be a number")?,
        None => 3,
    };

    let mut rng = SimpleRng::new(42);
    let times: Vec<i64> = (0..SAMPLES_PER_RUN).collect();

    for run in 1..=runs {
        let run_dir = Path::new(&output_dir).join(format!("run{run:02}"));
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("creating {}", run_dir.display()))?;

        let baseline = 5.0 + 12.0 * (run as f64 - 1.0);
        let lock = generate_lock(&mut rng);
        let temperature = generate_temperature(&mut rng, baseline);

        write_lock_csv(&run_dir.join(format!("run{run:02}_lock.csv")), &times, &lock)?;
        write_temperature_parquet(
            &run_dir.join(format!("run{run:02}_temperature.parquet")),
            &times,
            &temperature,
        )?;

        let locked = lock.iter().filter(|&&v| v == LOCKED).count();
        println!(
            "Wrote {} ({} samples, {locked} locked, baseline {baseline:.1})",
            run_dir.display(),
            SAMPLES_PER_RUN
        );
    }

    println!("Pack each run folder into an archive to process it.");
    Ok(())
}
