//! Console output for the CLI
//!
//! The run summary is built from a banner and marked status lines. Lines are
//! formatted separately from printing so the summary layout can be tested.

use std::io::Write;
use std::time::Duration;

const BANNER_WIDTH: usize = 60;

/// Leading mark of a summary line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Done,
    Note,
    Warn,
    Fail,
}

impl Mark {
    fn symbol(self) -> char {
        match self {
            Mark::Done => '✓',
            Mark::Note => '•',
            Mark::Warn => '⚠',
            Mark::Fail => '✗',
        }
    }
}

/// Boxed, centered title
pub fn banner(title: &str) -> String {
    let rule = "═".repeat(BANNER_WIDTH);
    format!(
        "╔{rule}╗\n║{title:^width$}║\n╚{rule}╝",
        rule = rule,
        title = title,
        width = BANNER_WIDTH
    )
}

/// One indented summary line
pub fn status_line(mark: Mark, msg: &str) -> String {
    format!("  {} {}", mark.symbol(), msg)
}

pub fn print_banner(title: &str) {
    println!("\n{}\n", banner(title));
}

pub fn print_status(mark: Mark, msg: &str) {
    println!("{}", status_line(mark, msg));
}

/// Size with binary units, e.g. `1.5 KB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Elapsed time, seconds with one decimal below a minute
pub fn format_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0..=59 => format!("{:.1}s", duration.as_secs_f64()),
        secs => format!("{}m {:02}s", secs / 60, secs % 60),
    }
}

/// Log sink that copies every record to stderr and a file
///
/// Only a failed file write is reported; the console copy is best-effort.
pub struct DualWriter {
    pub console: std::io::Stderr,
    pub file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let _ = self.console.write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_banner_is_centered_in_box() {
        let text = banner("Summary");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('╔') && lines[0].ends_with('╗'));
        assert!(lines[1].contains("Summary"));
        for line in &lines {
            assert_eq!(line.chars().count(), BANNER_WIDTH + 2);
        }
    }

    #[test]
    fn test_status_line_marks() {
        assert_eq!(status_line(Mark::Done, "Extracted 2 file(s)"), "  ✓ Extracted 2 file(s)");
        assert_eq!(status_line(Mark::Fail, "Stopped"), "  ✗ Stopped");
        assert!(status_line(Mark::Warn, "x").starts_with("  ⚠"));
        assert!(status_line(Mark::Note, "x").starts_with("  •"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 bytes");
        assert_eq!(format_bytes(1023), "1023 bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(8 * 1024 * 1024), "8.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 05s");
        assert_eq!(format_duration(Duration::from_secs(3700)), "61m 40s");
    }

    #[test]
    fn test_dual_writer_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let mut writer = DualWriter {
            console: std::io::stderr(),
            file: std::fs::File::create(&path).unwrap(),
        };

        writer.write_all(b"[INFO] started\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[INFO] started\n");
    }
}
