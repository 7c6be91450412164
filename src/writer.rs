//! Workbook sinks for inventory and summary rows.
//!
//! The CSV sink renders row kinds as number formats: summary statistics
//! get four decimals, inventory numbers keep full precision and empty
//! cells stay empty. The Parquet export writes the inventory rows as a
//! typed table through polars.

use crate::constants::{
    INVENTORY_FILE_NAME, INVENTORY_PARQUET_FILE_NAME, SUMMARY_DECIMALS, SUMMARY_FILE_NAME,
    SUMMARY_LEADING_COLUMNS,
};
use crate::error::{InventoryError, Result};
use crate::inventory::{OutputCell, OutputRow, RowKind};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use polars::prelude::{Column, DataFrame, ParquetCompression, ParquetWriter, StatisticsOptions};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for the two output tables
pub trait WorkbookSink {
    /// Header row followed by one row per file
    fn write_inventory(&mut self, rows: &[OutputRow]) -> Result<PathBuf>;

    /// Header row followed by label blocks
    fn write_summary(&mut self, rows: &[OutputRow]) -> Result<PathBuf>;
}

/// Writes `inventory.csv` and `summary.csv` into an output directory
#[derive(Debug, Clone)]
pub struct CsvWorkbookWriter {
    output_dir: PathBuf,
    append: bool,
}

impl CsvWorkbookWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            append: false,
        }
    }

    /// Keep data rows of an existing inventory
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.output_dir.join(INVENTORY_FILE_NAME)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE_NAME)
    }

    fn write_rows(
        &self,
        path: &Path,
        rows: &[OutputRow],
        preserved: &[StringRecord],
    ) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| output_failed(path, e))?;

        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| output_failed(path, e))?;

        let (header, body) = match rows.split_first() {
            Some((first, rest)) if first.kind == RowKind::Header => (Some(first), rest),
            _ => (None, rows),
        };

        // Blank separators span the header width
        let width = header.map_or(1, |h| h.cells.len());
        if let Some(header) = header {
            writer.write_record(render_row(header))?;
        }
        for record in preserved {
            writer.write_record(record)?;
        }
        for row in body {
            match row.kind {
                RowKind::Blank => writer.write_record(vec![""; width])?,
                _ => writer.write_record(render_row(row))?,
            }
        }

        writer.flush().map_err(|e| output_failed(path, e))?;
        Ok(())
    }
}

impl WorkbookSink for CsvWorkbookWriter {
    fn write_inventory(&mut self, rows: &[OutputRow]) -> Result<PathBuf> {
        let path = self.inventory_path();
        let preserved = if self.append && path.exists() {
            existing_data_rows(&path)?
        } else {
            Vec::new()
        };

        self.write_rows(&path, rows, &preserved)?;
        info!(
            "Wrote {} inventory rows ({} kept) to {}",
            rows.len().saturating_sub(1) + preserved.len(),
            preserved.len(),
            path.display()
        );
        Ok(path)
    }

    fn write_summary(&mut self, rows: &[OutputRow]) -> Result<PathBuf> {
        let path = self.summary_path();
        self.write_rows(&path, rows, &[])?;
        info!("Wrote summary table to {}", path.display());
        Ok(path)
    }
}

/// Data rows of an inventory written earlier, minus its header and any
/// leading blank rows
pub fn existing_data_rows(path: &Path) -> Result<Vec<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let blank = record.iter().all(|field| field.trim().is_empty());
        if blank && rows.is_empty() {
            continue;
        }
        rows.push(record);
    }

    debug!("Keeping {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Rows kept by an append run, typed back from their CSV text
///
/// Numeric fields come back as numbers; a column of fresh counts absorbs
/// them as long as they are whole. Blank rows are dropped.
pub fn preserved_rows(path: &Path) -> Result<Vec<OutputRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    Ok(existing_data_rows(path)?
        .iter()
        .filter(|record| record.iter().any(|field| !field.trim().is_empty()))
        .map(|record| OutputRow {
            kind: RowKind::Data,
            cells: record.iter().map(typed_cell).collect(),
        })
        .collect())
}

fn typed_cell(field: &str) -> OutputCell {
    let field = field.trim();
    if field.is_empty() {
        return OutputCell::Empty;
    }
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => OutputCell::Number(value),
        _ => OutputCell::Text(field.to_string()),
    }
}

/// Header of `rows`, then `earlier` data rows, then the body of `rows`
pub fn merge_earlier_rows(rows: &[OutputRow], earlier: Vec<OutputRow>) -> Vec<OutputRow> {
    match rows.split_first() {
        Some((header, body)) => std::iter::once(header.clone())
            .chain(earlier)
            .chain(body.iter().cloned())
            .collect(),
        None => earlier,
    }
}

fn render_row(row: &OutputRow) -> Vec<String> {
    row.cells
        .iter()
        .enumerate()
        .map(|(position, cell)| match (row.kind, cell) {
            (RowKind::LabelBoldNumeric, OutputCell::Number(value))
                if position >= SUMMARY_LEADING_COLUMNS.len() =>
            {
                format!("{:.*}", SUMMARY_DECIMALS, value)
            }
            _ => render_cell(cell),
        })
        .collect()
}

fn render_cell(cell: &OutputCell) -> String {
    match cell {
        OutputCell::Text(text) => text.clone(),
        OutputCell::Number(value) => value.to_string(),
        OutputCell::Count(count) => count.to_string(),
        OutputCell::Empty => String::new(),
    }
}

fn output_failed(path: &Path, error: impl std::fmt::Display) -> InventoryError {
    InventoryError::OutputFailed {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

/// Write inventory rows (header first) to `inventory.parquet`
///
/// A column holding any text is a text column rendering every cell as
/// text; a column of counts (or whole numbers among counts) is unsigned;
/// anything else is a float column.
pub fn write_inventory_parquet(output_dir: &Path, rows: &[OutputRow]) -> Result<PathBuf> {
    let path = output_dir.join(INVENTORY_PARQUET_FILE_NAME);
    let mut df = inventory_frame(rows)?;

    std::fs::create_dir_all(output_dir).map_err(|e| output_failed(&path, e))?;
    let file = File::create(&path).map_err(|e| output_failed(&path, e))?;

    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .with_statistics(StatisticsOptions::full())
        .finish(&mut df)
        .map_err(|e| output_failed(&path, format!("Failed to write parquet: {}", e)))?;

    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(path)
}

fn inventory_frame(rows: &[OutputRow]) -> Result<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let mut columns = Vec::with_capacity(header.cells.len());
    for (position, name) in header.cells.iter().enumerate() {
        let name = render_cell(name);
        let cells: Vec<&OutputCell> = body
            .iter()
            .map(|row| row.cells.get(position).unwrap_or(&OutputCell::Empty))
            .collect();

        let column = match column_kind(&cells) {
            ColumnKind::Text => Column::new(
                name.into(),
                cells
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| render_cell(cell)))
                    .collect::<Vec<Option<String>>>(),
            ),
            ColumnKind::Count => Column::new(
                name.into(),
                cells
                    .iter()
                    .map(|cell| match cell {
                        OutputCell::Count(count) => Some(*count as u64),
                        OutputCell::Number(value) => Some(*value as u64),
                        _ => None,
                    })
                    .collect::<Vec<Option<u64>>>(),
            ),
            ColumnKind::Float => Column::new(
                name.into(),
                cells
                    .iter()
                    .map(|cell| match cell {
                        OutputCell::Number(value) => Some(*value),
                        OutputCell::Count(count) => Some(*count as f64),
                        _ => None,
                    })
                    .collect::<Vec<Option<f64>>>(),
            ),
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Count,
    Float,
}

fn column_kind(cells: &[&OutputCell]) -> ColumnKind {
    let whole = |value: f64| value >= 0.0 && value.fract() == 0.0;

    if cells.iter().any(|cell| matches!(cell, OutputCell::Text(_))) {
        ColumnKind::Text
    } else if cells.iter().any(|cell| matches!(cell, OutputCell::Count(_)))
        && cells.iter().all(|cell| match cell {
            OutputCell::Number(value) => whole(*value),
            _ => true,
        })
    {
        ColumnKind::Count
    } else {
        ColumnKind::Float
    }
}
