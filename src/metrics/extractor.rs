//! Decode-time extraction from benchmark reports
//!
//! The benchmark prints a summary table; the only row the tuner depends on is
//!
//! ```text
//! | Average Decode Time (TPOT) | 42.5 ms |
//! ```
//!
//! Everything else in the report is opaque.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

static TPOT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)average\s+decode\s+time\s*\(\s*tpot\s*\)\s*\|\s*([0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*ms",
    )
    .expect("TPOT pattern is valid")
});

/// Extract the first average decode time (ms) found in `report`
pub fn extract_decode_time(report: &str) -> Option<f64> {
    let captures = TPOT_LINE.captures(report)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

/// Read a log file and extract its average decode time.
///
/// A missing or unreadable file yields `None` just like a report without the
/// metric line; the caller treats both as a skipped round.
pub fn read_decode_time(log_path: &Path) -> Option<f64> {
    let bytes = match fs::read(log_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Error reading log file {}: {}", log_path.display(), e);
            return None;
        }
    };
    let value = extract_decode_time(&String::from_utf8_lossy(&bytes));
    if value.is_none() {
        debug!("No decode time line in {}", log_path.display());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extract_plain_line() {
        assert_eq!(
            extract_decode_time("Average Decode Time (TPOT) | 42.5 ms"),
            Some(42.5)
        );
    }

    #[test]
    fn test_extract_embedded_in_table() {
        let report = "\
+----------------------------+-----------+
| Metric                     | Value     |
+----------------------------+-----------+
| Average TTFT               | 812.3 ms  |
| Average Decode Time (TPOT) | 48.17 ms  |
| Throughput                 | 1532 tok/s|
+----------------------------+-----------+
";
        assert_eq!(extract_decode_time(report), Some(48.17));
    }

    #[test]
    fn test_extract_case_and_whitespace_tolerant() {
        assert_eq!(
            extract_decode_time("average   decode\ttime (tpot)|42.5MS"),
            Some(42.5)
        );
        assert_eq!(
            extract_decode_time("AVERAGE DECODE TIME (TPOT)   |   7 ms"),
            Some(7.0)
        );
    }

    #[test]
    fn test_extract_first_occurrence_wins() {
        let report = "Average Decode Time (TPOT) | 30.0 ms\nAverage Decode Time (TPOT) | 60.0 ms\n";
        assert_eq!(extract_decode_time(report), Some(30.0));
    }

    #[test]
    fn test_extract_missing_pattern() {
        assert_eq!(extract_decode_time(""), None);
        assert_eq!(extract_decode_time("Average Decode Time | 42.5 ms"), None);
        assert_eq!(extract_decode_time("Average Decode Time (TPOT) | n/a"), None);
        assert_eq!(extract_decode_time("Average Decode Time (TPOT) | 42.5 s"), None);
    }

    #[test]
    fn test_read_decode_time_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempt.log");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "warming up...").unwrap();
        writeln!(file, "Average Decode Time (TPOT) | 51.25 ms").unwrap();
        drop(file);

        assert_eq!(read_decode_time(&path), Some(51.25));
    }

    #[test]
    fn test_read_decode_time_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_decode_time(&dir.path().join("nope.log")), None);
    }
}
