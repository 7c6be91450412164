//! Configuration management and validation.
//!
//! Provides the category-to-column map, the region and environment code
//! tables, positional column names and output switches. A configuration
//! is built once at start-up and handed to every component by reference.

use crate::constants::{
    BROADCAST_COLUMNS, DOWNLINK_COLUMNS, ENVIRONMENT_CODES, GPS_LATITUDE_COLUMN,
    GPS_LONGITUDE_COLUMN, MARKER_COLUMN, REGION_CODES, TDD_COLUMNS, TIMESTAMP_FORMATS,
    TURN_MARKER, UPLINK_COLUMNS, WLAN_COLUMNS,
};
use crate::error::{InventoryError, Result};
use crate::models::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Which group labels a file's composite values are pooled under
///
/// Every policy pools under the global label as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolingPolicy {
    /// Global and region
    RegionOnly,
    /// Global, region and environment
    #[default]
    RegionAndEnvironment,
}

/// A short code and its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub name: String,
}

impl CodeEntry {
    fn table(entries: &[(&str, &str)]) -> Vec<Self> {
        entries
            .iter()
            .map(|(code, name)| Self {
                code: code.to_string(),
                name: name.to_string(),
            })
            .collect()
    }
}

/// Raw sub-band columns contributing to each spectral band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMap {
    bands: BTreeMap<Category, Vec<String>>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        let to_owned = |columns: &[&str]| -> Vec<String> {
            columns.iter().map(|c| c.to_string()).collect()
        };

        let mut bands = BTreeMap::new();
        bands.insert(Category::Broadcast, to_owned(BROADCAST_COLUMNS));
        bands.insert(Category::Downlink, to_owned(DOWNLINK_COLUMNS));
        bands.insert(Category::Uplink, to_owned(UPLINK_COLUMNS));
        bands.insert(Category::Wlan, to_owned(WLAN_COLUMNS));
        bands.insert(Category::Tdd, to_owned(TDD_COLUMNS));
        Self { bands }
    }
}

impl CategoryMap {
    /// Replace the column list of a spectral band
    ///
    /// `Total` is always derived and cannot be set.
    pub fn with_band(mut self, category: Category, columns: Vec<String>) -> Result<Self> {
        if category == Category::Total {
            return Err(InventoryError::configuration(
                "the Total category is derived from the other bands",
            ));
        }
        self.bands.insert(category, columns);
        Ok(self)
    }

    /// Expected raw columns of a category, in declaration order
    ///
    /// For `Total` this is the union of every band, each column once.
    pub fn columns(&self, category: Category) -> Vec<String> {
        match category {
            Category::Total => {
                let mut seen = HashSet::new();
                Category::BANDS
                    .iter()
                    .filter_map(|band| self.bands.get(band))
                    .flatten()
                    .filter(|column| seen.insert(column.as_str()))
                    .cloned()
                    .collect()
            }
            band => self.bands.get(&band).cloned().unwrap_or_default(),
        }
    }
}

/// Global configuration for inventory processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Category to raw column mapping
    pub categories: CategoryMap,

    /// Region codes in canonical presentation order
    pub regions: Vec<CodeEntry>,

    /// Environment codes in canonical presentation order
    pub environments: Vec<CodeEntry>,

    pub latitude_column: String,
    pub longitude_column: String,
    pub marker_column: String,

    /// Marker value (case-insensitive) flagging the turn point
    pub turn_marker: String,

    /// chrono layouts tried in order for the timestamp column
    pub timestamp_formats: Vec<String>,

    pub pooling: PoolingPolicy,

    /// Emit start/turn/end GPS columns in the inventory
    pub include_gps: bool,

    /// Field delimiter override; `None` picks by file extension
    pub delimiter: Option<u8>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            categories: CategoryMap::default(),
            regions: CodeEntry::table(REGION_CODES),
            environments: CodeEntry::table(ENVIRONMENT_CODES),
            latitude_column: GPS_LATITUDE_COLUMN.to_string(),
            longitude_column: GPS_LONGITUDE_COLUMN.to_string(),
            marker_column: MARKER_COLUMN.to_string(),
            turn_marker: TURN_MARKER.to_string(),
            timestamp_formats: TIMESTAMP_FORMATS.iter().map(|f| f.to_string()).collect(),
            pooling: PoolingPolicy::default(),
            include_gps: true,
            delimiter: None,
        }
    }
}

impl InventoryConfig {
    /// Set the pooling policy
    pub fn with_pooling(mut self, pooling: PoolingPolicy) -> Self {
        self.pooling = pooling;
        self
    }

    /// Switch the GPS columns on or off
    pub fn with_gps(mut self, include_gps: bool) -> Self {
        self.include_gps = include_gps;
        self
    }

    /// Force a field delimiter for every input file
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Marker value flagging the turn-around rows
    pub fn with_turn_marker(mut self, marker: impl Into<String>) -> Self {
        self.turn_marker = marker.into();
        self
    }

    /// Replace the category map
    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    pub fn region_name(&self, code: &str) -> Option<&str> {
        lookup(&self.regions, code)
    }

    pub fn environment_name(&self, code: &str) -> Option<&str> {
        lookup(&self.environments, code)
    }

    /// Reject tables the parsers cannot work with
    pub fn validate(&self) -> Result<()> {
        for category in Category::BANDS {
            if self.categories.columns(category).is_empty() {
                return Err(InventoryError::configuration(format!(
                    "category {} has no columns",
                    category
                )));
            }
        }

        let mut codes = HashSet::new();
        for entry in self.regions.iter().chain(self.environments.iter()) {
            if entry.code.trim().is_empty() || entry.code.contains(char::is_whitespace) {
                return Err(InventoryError::configuration(format!(
                    "invalid code '{}'",
                    entry.code
                )));
            }
            if !codes.insert(entry.code.as_str()) {
                return Err(InventoryError::configuration(format!(
                    "code '{}' is declared twice",
                    entry.code
                )));
            }
        }

        if self.environments.iter().any(|e| e.code.chars().count() != 1) {
            return Err(InventoryError::configuration(
                "environment codes must be a single character",
            ));
        }

        if self.timestamp_formats.is_empty() {
            return Err(InventoryError::configuration(
                "at least one timestamp format is required",
            ));
        }

        debug!(
            "Configuration valid: {} regions, {} environments, pooling {:?}",
            self.regions.len(),
            self.environments.len(),
            self.pooling
        );
        Ok(())
    }
}

fn lookup<'a>(table: &'a [CodeEntry], code: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|entry| entry.code == code)
        .map(|entry| entry.name.as_str())
}
