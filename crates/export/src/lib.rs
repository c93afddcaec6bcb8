//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod curve {
    use std::io::Write;
    use std::path::Path;

    use emr_curve::KeyframeCurve;
    use serde::Serialize;

    /// CSV row: one evaluated point of a response curve.
    #[derive(Debug, Clone, Copy, Serialize)]
    pub struct CurveSample {
        pub pressure_atm: f64,
        pub isp_s: f64,
    }

    /// Evaluate `curve` at `samples` evenly spaced pressures across its key range.
    ///
    /// A single-key curve yields one sample; an empty curve yields none.
    pub fn sample(curve: &KeyframeCurve, samples: usize) -> Vec<CurveSample> {
        let (Some(start), Some(end)) = (curve.min_time(), curve.max_time()) else {
            return Vec::new();
        };
        if samples < 2 || end <= start {
            return vec![CurveSample {
                pressure_atm: start,
                isp_s: curve.evaluate(start),
            }];
        }
        let step = (end - start) / (samples - 1) as f64;
        (0..samples)
            .map(|i| {
                let pressure = if i == samples - 1 {
                    end
                } else {
                    start + step * i as f64
                };
                CurveSample {
                    pressure_atm: pressure,
                    isp_s: curve.evaluate(pressure),
                }
            })
            .collect()
    }

    /// Write sampled curve points as CSV with a `pressure_atm,isp_s` header.
    pub fn write_csv<W: Write>(writer: W, rows: &[CurveSample]) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Sample `curve` and write it to `path` (`-` for stdout).
    pub fn export(path: &Path, curve: &KeyframeCurve, samples: usize) -> csv::Result<()> {
        let writer = super::writer_for_path(path)?;
        write_csv(writer, &sample(curve, samples))
    }
}

pub mod snapshot {
    use std::io::{self, Write};
    use std::path::Path;

    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// Write any serializable snapshot as pretty JSON to `path` (`-` for stdout).
    pub fn write_json<T: Serialize>(path: &Path, snapshot: &T) -> io::Result<()> {
        let mut writer = super::writer_for_path(path)?;
        to_writer_pretty(&mut writer, snapshot)?;
        writeln!(writer)?;
        writer.flush()
    }
}
