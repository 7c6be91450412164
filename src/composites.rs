//! Per-file export of row-level category composites.
//!
//! Writes `<stem>_agg.csv` holding the first two source columns (time and
//! marker in ExpoM tables), one composite column per category, then the
//! logger's trailing block of columns when the table is wide enough.

use crate::composer::CategoryComposer;
use crate::config::InventoryConfig;
use crate::constants::{COMPOSITE_FILE_SUFFIX, PLAIN_LEADING_COLUMNS, TRAILING_COLUMNS};
use crate::error::{InventoryError, Result};
use crate::models::{Category, Cell, RawMeasurementTable};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct CompositeExporter {
    composer: CategoryComposer,
}

impl CompositeExporter {
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            composer: CategoryComposer::new(&config.categories),
        }
    }

    /// Header and rows of the composite table
    pub fn table(&self, table: &RawMeasurementTable, source: &Path) -> Result<Vec<Vec<String>>> {
        if table.column_count() < PLAIN_LEADING_COLUMNS {
            return Err(InventoryError::malformed(
                source,
                format!("fewer than {} columns", PLAIN_LEADING_COLUMNS),
            ));
        }

        let trailing = trailing_columns(table.column_count());
        let mut header: Vec<String> = table.column_names()[..PLAIN_LEADING_COLUMNS].to_vec();
        header.extend(Category::ALL.iter().map(|c| c.name().to_string()));
        header.extend_from_slice(&table.column_names()[trailing.clone()]);

        let series = self.composer.compose(table);
        let mut rows = Vec::with_capacity(table.row_count() + 1);
        rows.push(header);

        for (position, row) in table.rows().iter().enumerate() {
            let mut out: Vec<String> = row[..PLAIN_LEADING_COLUMNS].iter().map(render).collect();
            out.extend(Category::ALL.iter().map(|&category| {
                series.get(category)[position]
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            }));
            out.extend(row[trailing.clone()].iter().map(render));
            rows.push(out);
        }

        Ok(rows)
    }

    /// Write the composite table of `source` into `output_dir`
    pub fn export(
        &self,
        table: &RawMeasurementTable,
        source: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let rows = self.table(table, source)?;
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(format!("{}{}.csv", stem, COMPOSITE_FILE_SUFFIX));

        std::fs::create_dir_all(output_dir)?;
        let mut writer = WriterBuilder::new().from_path(&output)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Wrote {} composite rows to {}", rows.len() - 1, output.display());
        Ok(output)
    }
}

fn trailing_columns(width: usize) -> std::ops::Range<usize> {
    TRAILING_COLUMNS.start.min(width)..TRAILING_COLUMNS.end.min(width)
}

fn render(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) => value.to_string(),
        Cell::Text(text) => text.clone(),
        Cell::Missing => String::new(),
    }
}
