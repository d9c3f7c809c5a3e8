//! Append-only text sink for corrected output rows.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use ndarray::ArrayView2;

use crate::error::Result;

/// Writes one space-separated line per output row, appended across calls.
///
/// Numeric fields are rendered as integers when they have no fractional
/// part, and with 6 decimal places otherwise.
#[derive(Debug, Clone)]
pub struct TxtSink {
    path: PathBuf,
}

impl TxtSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one frame's rows. The whole frame is formatted first and
    /// written in a single call, so a frame is never partially persisted.
    pub fn append(&self, rows: ArrayView2<f64>) -> Result<()> {
        if rows.nrows() == 0 {
            return Ok(());
        }

        let mut buffer = String::new();
        for row in rows.rows() {
            let line: Vec<String> = row.iter().map(|&value| format_value(value)).collect();
            buffer.push_str(&line.join(" "));
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buffer.as_bytes())?;
        Ok(())
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(-7.0), "-7");
        assert_eq!(format_value(0.5), "0.500000");
        assert_eq!(format_value(12.345678), "12.345678");
    }

    #[test]
    fn test_append_accumulates_lines() {
        let path = std::env::temp_dir().join(format!("reid_rs_sink_{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let sink = TxtSink::new(&path);

        sink.append(array![[1.0, 2.0, 0.25]].view()).unwrap();
        sink.append(array![[2.0, 3.0, 0.75]].view()).unwrap();
        // empty frames leave the file untouched
        sink.append(ndarray::Array2::<f64>::zeros((0, 3)).view())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1 2 0.250000\n2 3 0.750000\n");
        std::fs::remove_file(&path).unwrap();
    }
}
