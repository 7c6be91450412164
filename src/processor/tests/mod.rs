//! Integration tests for the processor module
//!
//! Tests the complete pipeline over small excursion directories.

pub mod error_handling;

use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str =
    "Date&Time,Marker,GPS Lat,GPS Lon,FM Radio (RMS),WLAN (RMS),WLAN (RMS),TDD (RMS)";

/// Write an excursion file with the shared header
pub fn write_excursion(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let mut content = format!("{}\n", HEADER);
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    path
}

/// Three samples, turn marker on the second, no fix on the third
pub fn midtown_rows() -> Vec<&'static str> {
    vec![
        "10/01/2025 10:00:00,,40.7,-73.9,0.1,0.3,0.4,",
        "10/01/2025 10:00:05,x,40.71,-73.95,0.2,0.6,0.8,0.5",
        "10/01/2025 10:00:10,,0,0,0.3,,,",
    ]
}

pub fn park_slope_rows() -> Vec<&'static str> {
    vec![
        "10/02/2025 09:30:00,,40.67,-73.98,1.0,,,2.0",
        "10/02/2025 09:30:05,,40.68,-73.97,,,,",
    ]
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
