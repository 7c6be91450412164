//! Command-line argument definitions for the RF inventory builder
//!
//! Defines the CLI using the clap derive API: one subcommand per workflow
//! sharing a common set of input, output and logging options.

use crate::config::{InventoryConfig, PoolingPolicy};
use crate::error::{InventoryError, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the RF exposure inventory builder
///
/// Summarizes RF-EMF exposimeter excursion files into a per-file inventory
/// and pooled statistics by region and environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rf-inventory",
    version,
    about = "Build RF exposure inventories and pooled statistics from exposimeter excursions",
    long_about = "Reads per-excursion RF-EMF measurement tables, derives Broadcast, Downlink, \
                  Uplink, WLAN, TDD and Total composites, and writes one inventory row per file \
                  plus summary statistics pooled globally, per region and per environment."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Build inventory.csv and summary.csv (main command)
    Inventory(InventoryArgs),
    /// Write per-row category composites next to each file
    Composites(CommonArgs),
    /// Convert raw ExpoM logs into CSV measurement tables
    Convert(CommonArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct CommonArgs {
    /// Measurement files, directories or glob patterns
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory, created if missing
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Only use directory entries whose file name matches this glob
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Force the field delimiter instead of choosing it by extension
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors; hides progress and the summary
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments for the inventory command
#[derive(Debug, Clone, ClapArgs)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Keep the data rows of an existing inventory.csv
    #[arg(long = "append")]
    pub append: bool,

    /// Also write inventory.parquet
    #[arg(long = "parquet")]
    pub parquet: bool,

    /// Leave out the start/turn/end GPS columns
    #[arg(long = "no-gps")]
    pub no_gps: bool,

    /// Group labels composites are pooled under besides the global one
    #[arg(long = "pool", value_enum, default_value_t = PoolArg::RegionAndEnvironment)]
    pub pool: PoolArg,
}

/// Pooling choices on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PoolArg {
    /// Global and region
    Region,
    /// Global, region and environment
    RegionAndEnvironment,
}

impl From<PoolArg> for PoolingPolicy {
    fn from(arg: PoolArg) -> Self {
        match arg {
            PoolArg::Region => PoolingPolicy::RegionOnly,
            PoolArg::RegionAndEnvironment => PoolingPolicy::RegionAndEnvironment,
        }
    }
}

impl CommonArgs {
    /// Validate arguments clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err(InventoryError::configuration(format!(
                    "Delimiter must be a single ASCII character, got '{}'",
                    delimiter
                )));
            }
        }

        if self.output.is_file() {
            return Err(InventoryError::configuration(format!(
                "Output path is a file: {}",
                self.output.display()
            )));
        }

        Ok(())
    }

    /// Configuration with the shared overrides applied
    pub fn to_config(&self) -> InventoryConfig {
        let config = InventoryConfig::default();
        match self.delimiter {
            Some(delimiter) => config.with_delimiter(delimiter as u8),
            None => config,
        }
    }

    /// Log level derived from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

impl InventoryArgs {
    pub fn to_config(&self) -> InventoryConfig {
        self.common
            .to_config()
            .with_pooling(self.pool.into())
            .with_gps(!self.no_gps)
    }
}

impl Commands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::Inventory(args) => &args.common,
            Commands::Composites(common) | Commands::Convert(common) => common,
        }
    }
}
