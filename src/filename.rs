//! Metadata encoded in measurement file names.
//!
//! Excursion files are named
//! `<YYYY-MM-DD>[_hh.mm.ss] <ENV> <REGION> <location...>`, for example
//! `2024-03-11_10.15.30 C M Central Park West`. Older files carry no
//! environment token (`2024-03-11 BK Prospect Park`); for those the region
//! is the first whitespace-separated token matching a region code.
//! Parsing never fails: a name matching neither form keeps the whole name
//! as its location.

use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use crate::models::FileMetadata;
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use tracing::debug;

const DATE_PATTERN: &str = r"(\d{4}-\d{2}-\d{2})(?:[_T]\d{2}\.\d{2}\.\d{2})?";

/// Parser for excursion file names
#[derive(Debug, Clone)]
pub struct FilenameParser {
    strict: Regex,
    date: Regex,
    regions: Vec<String>,
}

impl FilenameParser {
    pub fn new(config: &InventoryConfig) -> Result<Self> {
        let regions: Vec<String> = config.regions.iter().map(|r| r.code.clone()).collect();

        // Longest codes first so FERRY is never read as a shorter code
        let mut alternatives = regions.clone();
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let region_group = alternation(&alternatives);
        let environment_group = alternation(
            &config
                .environments
                .iter()
                .map(|e| e.code.clone())
                .collect::<Vec<_>>(),
        );

        let strict = format!(
            r"^{}\s+({})\s+({})\s+(.+)$",
            DATE_PATTERN, environment_group, region_group
        );

        Ok(Self {
            strict: compile(&strict)?,
            date: compile(DATE_PATTERN)?,
            regions,
        })
    }

    /// Metadata from a path's file stem
    pub fn parse_path(&self, path: &Path) -> FileMetadata {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.parse(&stem)
    }

    /// Metadata from a base name without extension
    pub fn parse(&self, name: &str) -> FileMetadata {
        if let Some(metadata) = self.parse_strict(name) {
            return metadata;
        }
        if let Some(metadata) = self.parse_legacy(name) {
            debug!("'{}' parsed with the legacy layout", name);
            return metadata;
        }

        debug!("'{}' matches no file name layout", name);
        FileMetadata::unparsed(name)
    }

    fn parse_strict(&self, name: &str) -> Option<FileMetadata> {
        let captures = self.strict.captures(name)?;
        Some(FileMetadata {
            date: parse_date(&captures[1]),
            environment: Some(captures[2].to_string()),
            region: Some(captures[3].to_string()),
            location: captures[4].trim().to_string(),
        })
    }

    fn parse_legacy(&self, name: &str) -> Option<FileMetadata> {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let region_at = tokens
            .iter()
            .position(|token| self.regions.iter().any(|code| code == token))?;

        let date = self
            .date
            .captures(name)
            .and_then(|captures| parse_date(&captures[1]));

        Some(FileMetadata {
            date,
            region: Some(tokens[region_at].to_string()),
            environment: None,
            location: tokens[region_at + 1..].join(" "),
        })
    }
}

fn alternation(codes: &[String]) -> String {
    codes
        .iter()
        .map(|code| regex::escape(code))
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        InventoryError::configuration(format!("invalid file name pattern: {}", e))
    })
}

/// Calendar date or `None` for shapes like `2024-13-40`
fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FilenameParser {
        FilenameParser::new(&InventoryConfig::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_full_layout_with_time_suffix() {
        let metadata = parser().parse("2024-03-11_10.15.30 C M Central Park West");

        assert_eq!(metadata.date, date(2024, 3, 11));
        assert_eq!(metadata.environment.as_deref(), Some("C"));
        assert_eq!(metadata.region.as_deref(), Some("M"));
        assert_eq!(metadata.location, "Central Park West");
        assert_eq!(metadata.date_string(), "2024-03-11");
    }

    #[test]
    fn test_multi_character_region_codes() {
        let p = parser();

        let ferry = p.parse("2025-10-02T08.00.00 T FERRY St George to Whitehall");
        assert_eq!(ferry.region.as_deref(), Some("FERRY"));
        assert_eq!(ferry.location, "St George to Whitehall");

        let bronx = p.parse("2025-10-02 R BX Fordham");
        assert_eq!(bronx.region.as_deref(), Some("BX"));
        assert_eq!(bronx.environment.as_deref(), Some("R"));
    }

    #[test]
    fn test_garbled_name_keeps_full_location() {
        let metadata = parser().parse("garbled name with no codes");

        assert_eq!(metadata, FileMetadata::unparsed("garbled name with no codes"));
        assert_eq!(metadata.date, None);
        assert_eq!(metadata.region, None);
        assert_eq!(metadata.environment, None);
        assert_eq!(metadata.date_string(), "");
    }

    #[test]
    fn test_legacy_layout_without_environment() {
        let metadata = parser().parse("2024-05-01_09.00.00 BK Prospect  Park");

        assert_eq!(metadata.date, date(2024, 5, 1));
        assert_eq!(metadata.region.as_deref(), Some("BK"));
        assert_eq!(metadata.environment, None);
        assert_eq!(metadata.location, "Prospect Park");
    }

    #[test]
    fn test_legacy_layout_with_unknown_environment_token() {
        let metadata = parser().parse("2024-05-01 X Q Astoria");
        assert_eq!(metadata.region.as_deref(), Some("Q"));
        assert_eq!(metadata.location, "Astoria");
    }

    #[test]
    fn test_invalid_calendar_date_is_empty() {
        let metadata = parser().parse("2024-13-40 G SI Clove Lakes");

        assert_eq!(metadata.date, None);
        assert_eq!(metadata.region.as_deref(), Some("SI"));
        assert_eq!(metadata.environment.as_deref(), Some("G"));
        assert_eq!(metadata.location, "Clove Lakes");
    }

    #[test]
    fn test_region_code_must_be_whole_token() {
        // "Mott" starts with M but is not a region token
        let metadata = parser().parse("2024-05-01 C Mott Street");
        assert_eq!(metadata.region, None);
        assert_eq!(metadata.location, "2024-05-01 C Mott Street");
    }

    #[test]
    fn test_parse_path_uses_file_stem() {
        let metadata = parser().parse_path(Path::new("/data/2024-06-02 I Q Library.csv"));
        assert_eq!(metadata.environment.as_deref(), Some("I"));
        assert_eq!(metadata.location, "Library");
    }
}
