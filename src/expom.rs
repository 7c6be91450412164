//! Conversion of raw ExpoM exposimeter logs into measurement tables.
//!
//! A raw log is tab separated with `\n` line ends. Lines 12 and 13 hold a
//! two-line header (channel group, then channel name with its unit in
//! parentheses), samples start on line 15 and the last three lines are a
//! logger trailer. GPS columns are stored in the NMEA compact form
//! `DDMM.mmmmN` / `DDDMM.mmmmW` and are decoded to signed decimal degrees.

use crate::constants::expom::{
    CHANNEL_LINE, FIRST_DATA_LINE, GROUP_LINE, MIN_LINES, PLAIN_HEADER_COLUMNS, TRAILER_LINES,
    ZERO_COORDINATE_EPSILON,
};
use crate::constants::{GPS_LATITUDE_COLUMN, GPS_LONGITUDE_COLUMN};
use crate::error::{InventoryError, Result};
use crate::reader::mangle_duplicate_headers;
use csv::WriterBuilder;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A cleaned log: unique headers plus rows of header width
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedLog {
    pub headers: Vec<String>,
    /// `None` is an empty cell
    pub rows: Vec<Vec<Option<String>>>,
}

/// Raw log to clean table converter
#[derive(Debug, Clone)]
pub struct ExpomConverter {
    parenthetical: Regex,
}

impl ExpomConverter {
    pub fn new() -> Result<Self> {
        let parenthetical = Regex::new(r"\(([^()]*)\)").map_err(|e| {
            InventoryError::configuration(format!("invalid unit pattern: {}", e))
        })?;
        Ok(Self { parenthetical })
    }

    /// Convert one log file and write `<stem>.csv` into `output_dir`
    pub fn convert_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let bytes = std::fs::read(input)?;
        let text = String::from_utf8_lossy(&bytes);
        let log = self.convert_text(&text, input)?;

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(format!("{}.csv", stem));
        if output == input {
            return Err(InventoryError::OutputFailed {
                path: output,
                reason: "output would overwrite the input log".to_string(),
            });
        }

        std::fs::create_dir_all(output_dir)?;
        let mut writer = WriterBuilder::new().from_path(&output)?;
        writer.write_record(&log.headers)?;
        for row in &log.rows {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;

        info!(
            "Converted {} ({} rows) -> {}",
            input.display(),
            log.rows.len(),
            output.display()
        );
        Ok(output)
    }

    /// Convert the text of one log; `path` is only used in errors
    pub fn convert_text(&self, text: &str, path: &Path) -> Result<ConvertedLog> {
        let lines: Vec<Vec<&str>> = text
            .split('\n')
            .map(|line| line.split('\t').collect())
            .collect();
        if lines.len() < MIN_LINES {
            return Err(InventoryError::malformed(
                path,
                format!("{} lines, at least {} expected", lines.len(), MIN_LINES),
            ));
        }

        let headers = self.headers(&lines[GROUP_LINE], &lines[CHANNEL_LINE]);
        let width = headers.len();
        let latitude = find_header(&headers, GPS_LATITUDE_COLUMN);
        let longitude = find_header(&headers, GPS_LONGITUDE_COLUMN);

        let data = &lines[FIRST_DATA_LINE..lines.len() - TRAILER_LINES];
        let rows = data
            .iter()
            .map(|fields| {
                let mut row: Vec<Option<String>> =
                    fields.iter().map(|field| clean_cell(field)).collect();
                row.resize(width, None);

                if let Some(position) = latitude {
                    row[position] = decode_coordinate(row[position].as_deref(), 2, 'N', 'S')
                        .map(|degrees| degrees.to_string());
                }
                if let Some(position) = longitude {
                    row[position] = decode_coordinate(row[position].as_deref(), 3, 'E', 'W')
                        .map(|degrees| degrees.to_string());
                }
                row
            })
            .collect::<Vec<_>>();

        debug!("{}: {} columns, {} samples", path.display(), width, rows.len());
        Ok(ConvertedLog { headers, rows })
    }

    /// Merge the group and channel lines into unique column names
    ///
    /// The first two names come from the channel line. After that a named
    /// group takes the unit of the channel (`Mobile DL` + `Ch3 (V/m)` gives
    /// `Mobile DL (V/m)`) and an empty group falls back to the channel name.
    fn headers(&self, group: &[&str], channel: &[&str]) -> Vec<String> {
        let field = |line: &[&str], position: usize| -> String {
            line.get(position)
                .map(|value| value.replace('\0', "").trim().to_string())
                .unwrap_or_default()
        };

        let width = group.len().max(channel.len());
        let mut headers: Vec<String> = (0..PLAIN_HEADER_COLUMNS)
            .map(|position| field(channel, position))
            .collect();

        for position in PLAIN_HEADER_COLUMNS..width {
            let group_name = field(group, position);
            let channel_name = field(channel, position);
            let header = match (group_name.is_empty(), self.unit(&channel_name)) {
                (true, _) => channel_name,
                (false, Some(unit)) => format!("{} ({})", group_name, unit),
                (false, None) => group_name,
            };
            headers.push(header);
        }

        mangle_duplicate_headers(headers)
    }

    /// Content of the last parenthetical group, if non-empty
    fn unit<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.parenthetical
            .captures_iter(text)
            .last()
            .and_then(|captures| captures.get(1))
            .map(|unit| unit.as_str())
            .filter(|unit| !unit.is_empty())
    }
}

fn find_header(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

/// Strip NUL and CR, trim, guard formula-like text
fn clean_cell(raw: &str) -> Option<String> {
    let cleaned = raw.replace(['\0', '\r'], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else if cleaned.starts_with('=') {
        Some(format!("'{}", cleaned))
    } else {
        Some(cleaned.to_string())
    }
}

/// Decode a compact or decimal coordinate to decimal degrees
///
/// `degree_digits` is 2 for latitude and 3 for longitude. Unreadable
/// values and the logger's zero placeholder decode to `None`.
pub fn decode_coordinate(
    value: Option<&str>,
    degree_digits: usize,
    positive: char,
    negative: char,
) -> Option<f64> {
    let compact: String = value?.chars().filter(|c| *c != ' ').collect();
    let hemisphere = compact.chars().last()?.to_ascii_uppercase();

    let decoded = if (hemisphere == positive || hemisphere == negative)
        && compact.len() >= degree_digits + 2
    {
        decode_compact(&compact[..compact.len() - 1], degree_digits)
            .map(|degrees| if hemisphere == negative { -degrees } else { degrees })
            .or_else(|| compact.parse::<f64>().ok())
    } else {
        compact.parse::<f64>().ok()
    };

    decoded.filter(|degrees| degrees.is_finite() && degrees.abs() >= ZERO_COORDINATE_EPSILON)
}

fn decode_compact(body: &str, degree_digits: usize) -> Option<f64> {
    let degrees: i32 = body.get(..degree_digits)?.parse().ok()?;
    let minutes: f64 = body.get(degree_digits..)?.parse().ok()?;
    Some(degrees as f64 + minutes / 60.0)
}
