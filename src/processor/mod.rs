//! Main processing engine.
//!
//! Orchestrates inventory runs: discovers input files, reads them one at a
//! time, builds the per-file inventory rows while pooling composites into
//! the aggregation store, then drains the store into the summary table.
//! A file that cannot be read is skipped and reported; it never aborts
//! the run.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;

use crate::aggregation::AggregationStore;
use crate::composer::CategoryComposer;
use crate::composites::CompositeExporter;
use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use crate::expom::ExpomConverter;
use crate::filename::FilenameParser;
use crate::inventory::{InventoryRowBuilder, OutputRow, SummaryTableBuilder};
use crate::models::{Category, CategorySummaries, ProcessingStats, RawMeasurementTable};
use crate::position::PositionalExtractor;
use crate::reader::TabularReader;
use crate::statistics::summarize;
use crate::writer::{
    CsvWorkbookWriter, WorkbookSink, merge_earlier_rows, preserved_rows, write_inventory_parquet,
};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Processor for one run over a set of inputs
#[derive(Debug)]
pub struct InventoryProcessor {
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
    config: InventoryConfig,
    discovery: FileDiscovery,
    reader: TabularReader,
    append: bool,
    parquet: bool,
    quiet: bool,
}

impl InventoryProcessor {
    /// Create a processor; the configuration is validated here
    pub fn new(inputs: Vec<PathBuf>, output_dir: PathBuf, config: InventoryConfig) -> Result<Self> {
        config.validate()?;
        if inputs.is_empty() {
            return Err(InventoryError::configuration("no input paths given"));
        }

        Ok(Self {
            inputs,
            output_dir,
            reader: TabularReader::from_config(&config),
            config,
            discovery: FileDiscovery::new(),
            append: false,
            parquet: false,
            quiet: false,
        })
    }

    /// Restrict directory inputs to file names matching a glob
    pub fn with_pattern(mut self, pattern: Option<&str>) -> Result<Self> {
        self.discovery = self.discovery.with_pattern(pattern)?;
        Ok(self)
    }

    /// Keep rows of an existing inventory
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Also write `inventory.parquet`
    pub fn with_parquet(mut self, parquet: bool) -> Self {
        self.parquet = parquet;
        self
    }

    /// Suppress the progress bar and console summary
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Build `inventory.csv` and `summary.csv` from every input file
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.announce("Building RF exposure inventory");

        let files = self.discover()?;
        let mut stats = ProcessingStats {
            files_discovered: files.len(),
            ..ProcessingStats::default()
        };

        let parser = FilenameParser::new(&self.config)?;
        let extractor = PositionalExtractor::new(&self.config);
        let composer = CategoryComposer::new(&self.config.categories);
        let row_builder = InventoryRowBuilder::new(&self.config);
        let mut store = AggregationStore::new();
        let mut rows = vec![row_builder.header_row()];

        let pb = self.progress_bar(files.len());
        for path in &files {
            pb.set_message(file_label(path));

            match self.read_table(path).await {
                Ok(table) => {
                    let metadata = parser.parse_path(path);
                    let position = extractor.extract(&table);
                    let series = composer.compose(&table);
                    let summaries = CategorySummaries::new(
                        Category::ALL.map(|category| summarize(&series.defined(category))),
                    );

                    rows.push(row_builder.build(&metadata, &position, &summaries));
                    store.fold_file(&metadata, &series, self.config.pooling);

                    stats.files_processed += 1;
                    stats.total_samples += position.sample_count;
                    debug!(
                        "{}: {} samples, region {:?}, environment {:?}",
                        path.display(),
                        position.sample_count,
                        metadata.region,
                        metadata.environment
                    );
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    stats.add_warning(file_label(path), e.to_string());
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("Files processed");

        let summary = store.into_summary_tables(&SummaryTableBuilder::new(&self.config));
        let mut sink = CsvWorkbookWriter::new(&self.output_dir).with_append(self.append);

        // The Parquet copy mirrors every row inventory.csv ends up holding
        let earlier = if self.append && self.parquet {
            preserved_rows(&sink.inventory_path())?
        } else {
            Vec::new()
        };
        stats.output_paths = write_tables(&mut sink, &rows, &summary)?;

        if self.parquet {
            let parquet_rows = merge_earlier_rows(&rows, earlier);
            stats
                .output_paths
                .push(write_inventory_parquet(&self.output_dir, &parquet_rows)?);
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            "Inventory complete: {} of {} files in {}ms",
            stats.files_processed, stats.files_discovered, stats.processing_time_ms
        );
        self.report(&stats);
        Ok(stats)
    }

    /// Write `<stem>_agg.csv` composite tables for every input file
    pub async fn export_composites(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.announce("Exporting per-row category composites");

        let files = self.discover()?;
        let mut stats = ProcessingStats {
            files_discovered: files.len(),
            ..ProcessingStats::default()
        };
        let exporter = CompositeExporter::new(&self.config);

        let pb = self.progress_bar(files.len());
        for path in &files {
            pb.set_message(file_label(path));

            let outcome = match self.read_table(path).await {
                Ok(table) => exporter
                    .export(&table, path, &self.output_dir)
                    .map(|output| (output, table.row_count())),
                Err(e) => Err(e),
            };
            match outcome {
                Ok((output, samples)) => {
                    stats.files_processed += 1;
                    stats.total_samples += samples;
                    stats.output_paths.push(output);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    stats.add_warning(file_label(path), e.to_string());
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("Composites written");

        stats.processing_time_ms = start_time.elapsed().as_millis();
        self.report(&stats);
        Ok(stats)
    }

    /// Convert raw ExpoM logs into clean CSV measurement tables
    pub async fn convert_logs(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.announce("Converting ExpoM logs");

        let files = self.discover()?;
        let mut stats = ProcessingStats {
            files_discovered: files.len(),
            ..ProcessingStats::default()
        };
        let converter = ExpomConverter::new()?;

        let pb = self.progress_bar(files.len());
        for path in &files {
            pb.set_message(file_label(path));

            let task_converter = converter.clone();
            let input = path.clone();
            let output_dir = self.output_dir.clone();
            let outcome = task::spawn_blocking(move || {
                task_converter.convert_file(&input, &output_dir)
            })
            .await
            .unwrap_or_else(|e| Err(interrupted(e)));

            match outcome {
                Ok(output) => {
                    stats.files_processed += 1;
                    stats.output_paths.push(output);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    stats.add_warning(file_label(path), e.to_string());
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("Logs converted");

        stats.processing_time_ms = start_time.elapsed().as_millis();
        self.report(&stats);
        Ok(stats)
    }

    fn discover(&self) -> Result<Vec<PathBuf>> {
        let files = self.discovery.discover(&self.inputs)?;
        if files.is_empty() {
            return Err(InventoryError::InputNotFound {
                path: self.inputs[0].clone(),
            });
        }

        if !self.quiet {
            println!(
                "  {} {} input files",
                "Found".bright_green(),
                files.len().to_string().bright_white().bold()
            );
        }
        Ok(files)
    }

    /// Read one file on the blocking pool; files are awaited one at a time
    async fn read_table(&self, path: &Path) -> Result<RawMeasurementTable> {
        let reader = self.reader.clone();
        let path = path.to_path_buf();
        task::spawn_blocking(move || reader.read(&path))
            .await
            .unwrap_or_else(|e| Err(interrupted(e)))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    fn announce(&self, title: &str) {
        if self.quiet {
            return;
        }
        println!("{}", title.bright_green().bold());
        println!("  {} {}", "Output:".bright_cyan(), self.output_dir.display());
    }

    fn report(&self, stats: &ProcessingStats) {
        if self.quiet {
            return;
        }

        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files processed:".bright_cyan(),
            stats.files_processed.to_string().bright_white()
        );
        if stats.total_samples > 0 {
            println!(
                "  {} {}",
                "Samples:".bright_cyan(),
                stats.total_samples.to_string().bright_white().bold()
            );
        }
        for path in &stats.output_paths {
            println!("  {} {}", "Wrote".bright_cyan(), path.display());
        }

        if stats.has_warnings() {
            println!(
                "  {} {}",
                "Files skipped:".bright_red(),
                stats.files_failed.to_string().bright_red().bold()
            );
            for warning in &stats.warnings {
                println!("    {} {}", warning.file.yellow(), warning.cause);
            }
        }
    }
}

/// Hand both tables to a sink
pub fn write_tables(
    sink: &mut impl WorkbookSink,
    inventory: &[OutputRow],
    summary: &[OutputRow],
) -> Result<Vec<PathBuf>> {
    Ok(vec![
        sink.write_inventory(inventory)?,
        sink.write_summary(summary)?,
    ])
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn interrupted(error: task::JoinError) -> InventoryError {
    InventoryError::Interrupted {
        reason: error.to_string(),
    }
}
