//! RF Inventory Library
//!
//! Builds inventories of RF-EMF exposimeter excursions and pooled exposure
//! statistics.
//!
//! This library provides tools for:
//! - Reading delimited measurement tables and converting raw ExpoM logs
//! - Parsing date, region, environment and location from file names
//! - Deriving root-sum-of-squares composites for six frequency categories
//! - Nine-statistic summaries per file and pooled across files
//! - Extracting excursion times and start/turn/end GPS fixes
//! - Writing the inventory and summary tables as CSV, plus optional Parquet

pub mod aggregation;
pub mod composer;
pub mod composites;
pub mod config;
pub mod constants;
pub mod error;
pub mod expom;
pub mod filename;
pub mod inventory;
pub mod models;
pub mod position;
pub mod processor;
pub mod reader;
pub mod statistics;
pub mod writer;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use aggregation::AggregationStore;
pub use config::{InventoryConfig, PoolingPolicy};
pub use error::{InventoryError, Result};
pub use models::{Category, GroupLabel, ProcessingStats, StatSummary, Statistic};
pub use processor::InventoryProcessor;
