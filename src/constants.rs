//! Application constants for the RF inventory builder
//!
//! Column names, code tables and output layout shared by the default
//! configuration and the builders. Runtime code reads these through
//! [`crate::config::InventoryConfig`] rather than directly.

// =============================================================================
// Frequency category columns (ExpoM sub-band RMS channels)
// =============================================================================

/// Sub-band columns making up the Broadcast category
pub const BROADCAST_COLUMNS: &[&str] = &[
    "FM Radio (RMS)",
    "VHF 1, 2, 3 (RMS)",
    "UHF1 (RMS)",
    "UHF2 (RMS)",
    "UHF3 (RMS)",
];

/// Sub-band columns making up the Downlink category
pub const DOWNLINK_COLUMNS: &[&str] = &[
    "Mobile DL (RMS)",
    "Mobile DL (RMS).1",
    "Mobile DL (RMS).2",
    "Mobile DL (RMS).3",
    "Mobile DL (RMS).4",
];

/// Sub-band columns making up the Uplink category
///
/// The unsuffixed `Mobile UL (RMS)` channel is not part of any category.
pub const UPLINK_COLUMNS: &[&str] = &[
    "Mobile UL (RMS).1",
    "Mobile UL (RMS).2",
    "Mobile UL (RMS).3",
    "Mobile UL (RMS).4",
    "Mobile UL (RMS).5",
];

/// Sub-band columns making up the WLAN category
pub const WLAN_COLUMNS: &[&str] = &[
    "ISM (RMS)",
    "WLAN (RMS)",
    "WLAN (RMS).1",
    "WLAN (RMS).2",
    "WLAN (RMS).3",
    "WLAN (RMS).4",
    "WLAN (RMS).5",
    "WLAN (RMS).6",
    "WLAN (RMS).7",
    "WLAN (RMS).8",
    "WLAN (RMS).9",
    "WLAN (RMS).10",
];

/// Sub-band columns making up the TDD category
pub const TDD_COLUMNS: &[&str] = &[
    "TDD (RMS)",
    "TDD (RMS).1",
    "TDD (RMS).2",
    "TDD (RMS).3",
    "TDD (RMS).4",
    "TDD (RMS).5",
    "TDD (RMS).6",
    "TDD (RMS).7",
    "TDD (RMS).8",
];

// =============================================================================
// Region and environment code tables (canonical presentation order)
// =============================================================================

/// Region codes with their display names
pub const REGION_CODES: &[(&str, &str)] = &[
    ("M", "Manhattan"),
    ("BK", "Brooklyn"),
    ("Q", "Queens"),
    ("BX", "Bronx"),
    ("SI", "Staten Island"),
    ("FERRY", "Ferry"),
];

/// Environment codes with their display names
pub const ENVIRONMENT_CODES: &[(&str, &str)] = &[
    ("C", "Commercial"),
    ("R", "Residential"),
    ("G", "Greenery"),
    ("T", "Transportation"),
    ("I", "Indoors"),
];

/// Display label of the global group in summary tables
pub const GLOBAL_LABEL: &str = "Totals";

// =============================================================================
// Positional columns
// =============================================================================

pub const GPS_LATITUDE_COLUMN: &str = "GPS Lat";
pub const GPS_LONGITUDE_COLUMN: &str = "GPS Lon";
pub const MARKER_COLUMN: &str = "Marker";

/// Marker value flagging the turn point of an excursion
pub const TURN_MARKER: &str = "x";

/// Timestamp layouts tried in order when rendering `HH:MM:SS`
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%H:%M:%S",
];

pub const OUTPUT_TIME_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// Output layout
// =============================================================================

/// Leading inventory columns before the statistic block
pub const INVENTORY_LEADING_COLUMNS: &[&str] = &[
    "date",
    "region",
    "location",
    "environment",
    "note",
    "start time",
    "end time",
];

/// GPS columns inserted after the end time when GPS output is enabled
pub const INVENTORY_GPS_COLUMNS: &[&str] = &[
    "start lat",
    "start lon",
    "turn lat",
    "turn lon",
    "end lat",
    "end lon",
];

pub const SAMPLE_COUNT_COLUMN: &str = "N";

pub const SUMMARY_LEADING_COLUMNS: &[&str] = &["Label", "Category"];

/// Decimal places used for numeric-4-decimal summary cells
pub const SUMMARY_DECIMALS: usize = 4;

pub const INVENTORY_FILE_NAME: &str = "inventory.csv";
pub const SUMMARY_FILE_NAME: &str = "summary.csv";
pub const INVENTORY_PARQUET_FILE_NAME: &str = "inventory.parquet";

/// Suffix appended to the file stem of per-row composite exports
pub const COMPOSITE_FILE_SUFFIX: &str = "_agg";

/// Source columns copied ahead of the composites
pub const PLAIN_LEADING_COLUMNS: usize = 2;

/// Source columns copied after the composites, by position (spreadsheet
/// columns DP..EA); clamped to the table width
pub const TRAILING_COLUMNS: std::ops::Range<usize> = 119..131;

/// File extensions picked up when a directory is given as input
pub const MEASUREMENT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

// =============================================================================
// ExpoM raw log layout
// =============================================================================

pub mod expom {
    /// Zero-based line holding the channel group names
    pub const GROUP_LINE: usize = 11;

    /// Zero-based line holding the channel names with units
    pub const CHANNEL_LINE: usize = 12;

    /// Zero-based line where samples start
    pub const FIRST_DATA_LINE: usize = 14;

    /// Trailing lines holding the logger summary
    pub const TRAILER_LINES: usize = 3;

    /// Shortest log that still carries at least one sample
    pub const MIN_LINES: usize = FIRST_DATA_LINE + 1 + 2;

    /// Columns copied verbatim from the channel line
    pub const PLAIN_HEADER_COLUMNS: usize = 2;

    /// Coordinates closer to zero than this are the logger's "no fix" value
    pub const ZERO_COORDINATE_EPSILON: f64 = 1e-9;
}
