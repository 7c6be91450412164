//! Excursion timing and GPS route points.
//!
//! The first column of a measurement table is its time axis regardless
//! of its name. GPS columns are looked up by name; the logger writes
//! `(0, 0)` when it has no fix, so that pair is never a valid position.

use crate::config::InventoryConfig;
use crate::constants::OUTPUT_TIME_FORMAT;
use crate::models::{Cell, GpsFix, PositionSummary, RawMeasurementTable};
use chrono::{NaiveDateTime, NaiveTime};
use tracing::debug;

/// Extracts start/end times and start/turn/end fixes from a table
#[derive(Debug, Clone)]
pub struct PositionalExtractor {
    latitude_column: String,
    longitude_column: String,
    marker_column: String,
    turn_marker: String,
    timestamp_formats: Vec<String>,
}

impl PositionalExtractor {
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            latitude_column: config.latitude_column.clone(),
            longitude_column: config.longitude_column.clone(),
            marker_column: config.marker_column.clone(),
            turn_marker: config.turn_marker.trim().to_lowercase(),
            timestamp_formats: config.timestamp_formats.clone(),
        }
    }

    pub fn extract(&self, table: &RawMeasurementTable) -> PositionSummary {
        let (start_time, end_time, sample_count) = self.time_span(table);
        let (start_fix, end_fix) = self.route_ends(table);
        let turn_fix = self.turn_fix(table);

        debug!(
            "N={} span {}..{} start={:?} turn={:?} end={:?}",
            sample_count, start_time, end_time, start_fix, turn_fix, end_fix
        );

        PositionSummary {
            start_time,
            end_time,
            sample_count,
            start_fix,
            turn_fix,
            end_fix,
        }
    }

    /// First and last sample times plus the number of timestamped rows
    fn time_span(&self, table: &RawMeasurementTable) -> (String, String, usize) {
        if table.column_count() == 0 {
            return (String::new(), String::new(), 0);
        }

        let mut first = None;
        let mut last = None;
        let mut count = 0;
        for cell in table.column(0).filter(|cell| !cell.is_missing()) {
            first.get_or_insert(cell);
            last = Some(cell);
            count += 1;
        }

        let render = |cell: Option<&Cell>| cell.map(|c| self.format_time(c)).unwrap_or_default();
        (render(first), render(last), count)
    }

    /// `HH:MM:SS` of a timestamp cell, or empty if no known layout fits
    pub fn format_time(&self, cell: &Cell) -> String {
        let Some(text) = cell.as_text() else {
            return String::new();
        };
        let text = text.trim();

        for format in &self.timestamp_formats {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                return datetime.format(OUTPUT_TIME_FORMAT).to_string();
            }
            if let Ok(time) = NaiveTime::parse_from_str(text, format) {
                return time.format(OUTPUT_TIME_FORMAT).to_string();
            }
        }

        debug!("Unrecognised timestamp '{}'", text);
        String::new()
    }

    fn gps_columns(&self, table: &RawMeasurementTable) -> Option<(usize, usize)> {
        Some((
            table.column_index(&self.latitude_column)?,
            table.column_index(&self.longitude_column)?,
        ))
    }

    /// First and last valid fix in file order
    fn route_ends(&self, table: &RawMeasurementTable) -> (Option<GpsFix>, Option<GpsFix>) {
        let Some((lat, lon)) = self.gps_columns(table) else {
            return (None, None);
        };

        let mut first = None;
        let mut last = None;
        for row in table.rows() {
            if let Some(fix) = valid_fix(row[lat].as_number(), row[lon].as_number()) {
                first.get_or_insert(fix);
                last = Some(fix);
            }
        }
        (first, last)
    }

    /// First valid fix among rows carrying the turn marker
    fn turn_fix(&self, table: &RawMeasurementTable) -> Option<GpsFix> {
        let (lat, lon) = self.gps_columns(table)?;
        let marker = table.column_index(&self.marker_column)?;

        table
            .rows()
            .iter()
            .filter(|row| self.is_turn_marker(&row[marker]))
            .find_map(|row| valid_fix(row[lat].as_number(), row[lon].as_number()))
    }

    /// Text markers compare case-insensitively; numeric cells match a
    /// marker that reads as the same number
    fn is_turn_marker(&self, cell: &Cell) -> bool {
        match cell {
            Cell::Text(text) => text.trim().to_lowercase() == self.turn_marker,
            Cell::Number(value) => self
                .turn_marker
                .parse::<f64>()
                .is_ok_and(|marker| marker == *value),
            Cell::Missing => false,
        }
    }
}

/// A fix when both coordinates are numeric, in range and not the `(0, 0)`
/// placeholder
pub fn valid_fix(latitude: Option<f64>, longitude: Option<f64>) -> Option<GpsFix> {
    let (latitude, longitude) = (latitude?, longitude?);

    if latitude == 0.0 && longitude == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(GpsFix {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PositionalExtractor {
        PositionalExtractor::new(&InventoryConfig::default())
    }

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    fn num(value: f64) -> Cell {
        Cell::Number(value)
    }

    fn route_table() -> RawMeasurementTable {
        RawMeasurementTable::new(
            vec![
                "Date&Time".into(),
                "GPS Lat".into(),
                "GPS Lon".into(),
                "Marker".into(),
            ],
            vec![
                vec![text("10/01/2025 10:00:00"), num(0.0), num(0.0), Cell::Missing],
                vec![text("10/01/2025 10:00:05"), num(40.7), num(-73.9), Cell::Missing],
                vec![Cell::Missing, num(40.71), text("bad"), text(" X ")],
                vec![text("10/01/2025 10:00:15"), num(40.72), num(-73.95), text("x")],
                vec![text("10/01/2025 10:00:20"), num(40.73), num(-73.96), text("x")],
                vec![text("garbage"), num(0.0), num(0.0), Cell::Missing],
            ],
        )
    }

    #[test]
    fn test_valid_fix_rules() {
        assert_eq!(valid_fix(Some(0.0), Some(0.0)), None);
        assert_eq!(
            valid_fix(Some(40.7), Some(-73.9)),
            Some(GpsFix {
                latitude: 40.7,
                longitude: -73.9
            })
        );
        assert!(valid_fix(Some(0.0), Some(-73.9)).is_some());
        assert_eq!(valid_fix(Some(91.0), Some(10.0)), None);
        assert_eq!(valid_fix(Some(10.0), Some(-180.5)), None);
        assert_eq!(valid_fix(None, Some(10.0)), None);
    }

    #[test]
    fn test_time_span_and_sample_count() {
        let summary = extractor().extract(&route_table());

        assert_eq!(summary.sample_count, 5);
        assert_eq!(summary.start_time, "10:00:00");
        // Last non-missing timestamp is unreadable
        assert_eq!(summary.end_time, "");
    }

    #[test]
    fn test_start_end_and_turn_fixes() {
        let summary = extractor().extract(&route_table());

        assert_eq!(summary.start_fix.map(|f| f.latitude), Some(40.7));
        assert_eq!(summary.end_fix.map(|f| f.latitude), Some(40.73));
        // The first marked row has no numeric longitude
        assert_eq!(summary.turn_fix.map(|f| f.latitude), Some(40.72));
    }

    #[test]
    fn test_missing_columns_give_absent_fixes() {
        let table = RawMeasurementTable::new(
            vec!["Date&Time".into(), "GPS Lat".into(), "GPS Lon".into()],
            vec![vec![text("12:00:00"), num(40.0), num(-74.0)]],
        );

        let summary = extractor().extract(&table);
        assert!(summary.start_fix.is_some());
        assert!(summary.turn_fix.is_none());
        assert_eq!(summary.start_time, "12:00:00");
        assert_eq!(summary.end_time, "12:00:00");
    }

    #[test]
    fn test_marker_without_gps_columns_gives_no_fixes() {
        let table = RawMeasurementTable::new(
            vec!["Date&Time".into(), "Marker".into(), "FM Radio (RMS)".into()],
            vec![
                vec![text("12:00:00"), text("x"), num(0.1)],
                vec![text("12:00:05"), text("X"), num(0.2)],
            ],
        );

        let summary = extractor().extract(&table);
        assert!(summary.start_fix.is_none());
        assert!(summary.turn_fix.is_none());
        assert!(summary.end_fix.is_none());
        assert_eq!(summary.sample_count, 2);
    }

    #[test]
    fn test_numeric_turn_marker() {
        let config = InventoryConfig::default().with_turn_marker("1");
        let table = RawMeasurementTable::new(
            vec![
                "Date&Time".into(),
                "GPS Lat".into(),
                "GPS Lon".into(),
                "Marker".into(),
            ],
            vec![
                vec![text("12:00:00"), num(40.7), num(-73.9), num(2.0)],
                vec![text("12:00:05"), num(40.71), num(-73.91), num(1.0)],
                vec![text("12:00:10"), num(40.72), num(-73.92), text("x")],
            ],
        );

        let summary = PositionalExtractor::new(&config).extract(&table);
        assert_eq!(summary.turn_fix.map(|f| f.latitude), Some(40.71));

        // The default text marker never matches a number
        let summary = extractor().extract(&table);
        assert_eq!(summary.turn_fix.map(|f| f.latitude), Some(40.72));
    }

    #[test]
    fn test_empty_table() {
        let summary = extractor().extract(&RawMeasurementTable::default());
        assert_eq!(summary, PositionSummary::default());
    }

    #[test]
    fn test_timestamp_formats() {
        let e = extractor();

        assert_eq!(e.format_time(&text("10/01/2025 10:00:07")), "10:00:07");
        assert_eq!(e.format_time(&text("10/01/2025 10:01")), "10:01:00");
        assert_eq!(e.format_time(&text("2025-10-01 23:59:59")), "23:59:59");
        assert_eq!(e.format_time(&text("2025-10-01 08:00:01.250")), "08:00:01");
        assert_eq!(e.format_time(&text("2025-10-01T07:30:00")), "07:30:00");
        assert_eq!(e.format_time(&text(" 06:05:04 ")), "06:05:04");
        assert_eq!(e.format_time(&text("yesterday")), "");
        assert_eq!(e.format_time(&num(45567.5)), "");
    }
}
