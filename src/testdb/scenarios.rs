//! Pre-built test volumes
//!
//! Each scenario returns a `MockVolume` laid out the way the USB-gadget image
//! of a measuring instrument typically looks: one folder per instrument with
//! a `results` subfolder, plus the bookkeeping folders a host OS leaves behind.

use crate::testdb::mock_volume::MockVolume;
use crate::volume::traits::Entry;
use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp on 2024-10-31 at the given time
pub fn timestamp(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, 31)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

/// Results folder of a single instrument
///
/// `/SMP50/results` holds, newest first: `run.csv` and `run.log` written in
/// the same minute, `other.png`, then `old.csv`. The listing order differs
/// from the time order on purpose.
pub fn instrument_results() -> MockVolume {
    let mut volume = MockVolume::new("piusb");
    volume.add_dir("/System Volume Information");
    volume.add_dir("/LOST.DIR");
    volume.add_raw_entry("/SMP50/results", Entry::dir(".", timestamp(8, 0)));
    volume.add_raw_entry("/SMP50/results", Entry::dir("..", timestamp(8, 0)));
    volume.add_file("/SMP50/results", "old.csv", b"t,value\n0,0.1\n", timestamp(9, 0));
    volume.add_file("/SMP50/results", "run.log", b"started\nfinished\n", timestamp(11, 30));
    volume.add_file("/SMP50/results", "other.png", b"\x89PNG....", timestamp(10, 15));
    volume.add_file("/SMP50/results", "run.csv", b"t,value\n0,0.5\n1,0.7\n", timestamp(11, 30));
    volume
}

/// Files spread over several depths, including reserved folders with content
pub fn nested_tree() -> MockVolume {
    let mut volume = MockVolume::new("nested");
    volume.add_file("/", "readme.txt", b"top level", timestamp(7, 0));
    volume.add_file("/SMP50/results", "a.csv", b"a", timestamp(9, 0));
    volume.add_file("/SMP50/results/raw", "a.bin", b"raw-a", timestamp(9, 5));
    volume.add_file("/UV200/results", "b.csv", b"b", timestamp(10, 0));
    volume.add_file("/System Volume Information", "IndexerVolumeGuid", b"guid", timestamp(12, 0));
    volume.add_file("/LOST.DIR", "FILE0001.CHK", b"frag", timestamp(12, 0));
    volume.add_file("/SMP50/results/LOST.DIR", "FILE0002.CHK", b"frag", timestamp(12, 0));
    volume.add_raw_entry("/SMP50", Entry::dir("..", timestamp(8, 0)));
    volume
}

/// An instrument folder without a `results` subfolder
pub fn missing_results() -> MockVolume {
    let mut volume = MockVolume::new("empty-instrument");
    volume.add_dir("/SMP50");
    volume
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::traits::Volume;

    #[test]
    fn test_instrument_results_layout() {
        let volume = instrument_results();
        assert_eq!(volume.file_count(), 4);
        assert_eq!(volume.list_entries("/SMP50/results").unwrap().len(), 6);
    }

    #[test]
    fn test_nested_tree_layout() {
        let volume = nested_tree();
        assert_eq!(volume.file_count(), 7);
        assert!(volume.contains_file("/SMP50/results/raw/a.bin"));
    }

    #[test]
    fn test_missing_results_layout() {
        let volume = missing_results();
        assert!(volume.list_entries("/SMP50").unwrap().is_empty());
        assert!(volume.list_entries("/SMP50/results").is_err());
    }
}
