//! Core data structures and types for inventory processing.
//!
//! Defines the measurement table, frequency categories, statistic
//! summaries, per-file metadata and the run statistics used throughout
//! the library.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// One cell of a measurement table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Interpret a raw text field
    ///
    /// Blank text is missing, anything that parses as a finite float is
    /// numeric (`NaN` and infinities count as missing), everything else
    /// stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if !value.is_finite() => Cell::Missing,
            Ok(value) => Cell::Number(value),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    /// Numeric value, with text and missing cells coerced to `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// A fully materialized measurement file
///
/// Rows are padded or truncated to the header width on construction, so
/// every `(row, column)` pair inside the bounds is addressable.
#[derive(Debug, Clone, Default)]
pub struct RawMeasurementTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl RawMeasurementTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();

        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names from `expected` that the table does not carry
    pub fn missing_columns<'a>(&self, expected: &'a [String]) -> Vec<&'a str> {
        expected
            .iter()
            .filter(|name| !self.has_column(name))
            .map(String::as_str)
            .collect()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cells of one column in row order
    pub fn column(&self, position: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[position])
    }
}

/// The six frequency categories reported for every file and group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Broadcast,
    Downlink,
    Uplink,
    Wlan,
    Tdd,
    Total,
}

impl Category {
    pub const COUNT: usize = 6;

    /// Presentation order
    pub const ALL: [Category; Self::COUNT] = [
        Category::Broadcast,
        Category::Downlink,
        Category::Uplink,
        Category::Wlan,
        Category::Tdd,
        Category::Total,
    ];

    /// Spectral bands; `Total` is derived from their union
    pub const BANDS: [Category; 5] = [
        Category::Broadcast,
        Category::Downlink,
        Category::Uplink,
        Category::Wlan,
        Category::Tdd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Broadcast => "Broadcast",
            Category::Downlink => "Downlink",
            Category::Uplink => "Uplink",
            Category::Wlan => "WLAN",
            Category::Tdd => "TDD",
            Category::Total => "Total",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The nine descriptive statistics, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Min,
    P25,
    Mean,
    GeoMean,
    Median,
    P75,
    P90,
    Max,
    StDev,
}

impl Statistic {
    pub const COUNT: usize = 9;

    pub const ALL: [Statistic; Self::COUNT] = [
        Statistic::Min,
        Statistic::P25,
        Statistic::Mean,
        Statistic::GeoMean,
        Statistic::Median,
        Statistic::P75,
        Statistic::P90,
        Statistic::Max,
        Statistic::StDev,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Min => "MIN",
            Statistic::P25 => "P25",
            Statistic::Mean => "MEAN",
            Statistic::GeoMean => "GEOMEAN",
            Statistic::Median => "MEDIAN",
            Statistic::P75 => "P75",
            Statistic::P90 => "P90",
            Statistic::Max => "MAX",
            Statistic::StDev => "STDEV",
        }
    }
}

/// Nine-statistic summary of a multiset; `None` marks an undefined value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatSummary {
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub mean: Option<f64>,
    pub geomean: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
    pub max: Option<f64>,
    pub stdev: Option<f64>,
}

impl StatSummary {
    /// Summary of an empty multiset
    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn get(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Min => self.min,
            Statistic::P25 => self.p25,
            Statistic::Mean => self.mean,
            Statistic::GeoMean => self.geomean,
            Statistic::Median => self.median,
            Statistic::P75 => self.p75,
            Statistic::P90 => self.p90,
            Statistic::Max => self.max,
            Statistic::StDev => self.stdev,
        }
    }

    /// Values in column order
    pub fn values(&self) -> [Option<f64>; Statistic::COUNT] {
        Statistic::ALL.map(|statistic| self.get(statistic))
    }

    pub fn is_undefined(&self) -> bool {
        self.values().iter().all(Option::is_none)
    }
}

/// One summary per category, indexed by [`Category`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorySummaries([StatSummary; Category::COUNT]);

impl CategorySummaries {
    pub fn new(summaries: [StatSummary; Category::COUNT]) -> Self {
        Self(summaries)
    }

    pub fn get(&self, category: Category) -> &StatSummary {
        &self.0[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &StatSummary)> {
        Category::ALL.into_iter().zip(self.0.iter())
    }
}

/// Metadata encoded in a measurement file's base name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileMetadata {
    pub date: Option<NaiveDate>,
    pub region: Option<String>,
    pub environment: Option<String>,
    pub location: String,
}

impl FileMetadata {
    /// Metadata of a name that matched no grammar
    pub fn unparsed(name: &str) -> Self {
        Self {
            location: name.to_string(),
            ..Self::default()
        }
    }

    /// `YYYY-MM-DD`, or empty when no date was recovered
    pub fn date_string(&self) -> String {
        self.date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// A valid GPS position in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Timing and route information of one excursion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionSummary {
    /// `HH:MM:SS`, or empty when the first sample time is unreadable
    pub start_time: String,
    /// `HH:MM:SS`, or empty when the last sample time is unreadable
    pub end_time: String,
    pub sample_count: usize,
    pub start_fix: Option<GpsFix>,
    pub turn_fix: Option<GpsFix>,
    pub end_fix: Option<GpsFix>,
}

/// Key under which raw composite values are pooled
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupLabel {
    Global,
    Region(String),
    Environment(String),
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::Global => f.write_str("global"),
            GroupLabel::Region(code) => write!(f, "region:{}", code),
            GroupLabel::Environment(code) => write!(f, "environment:{}", code),
        }
    }
}

/// A file skipped because it could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWarning {
    pub file: String,
    pub cause: String,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_samples: usize,
    pub warnings: Vec<FileWarning>,
    pub output_paths: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Record a skipped file
    pub fn add_warning(&mut self, file: impl Into<String>, cause: impl Into<String>) {
        self.files_failed += 1;
        self.warnings.push(FileWarning {
            file: file.into(),
            cause: cause.into(),
        });
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
