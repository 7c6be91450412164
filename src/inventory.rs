//! Logical rows of the inventory and summary tables.
//!
//! Builders here produce cell values plus a row kind; they never decide
//! how a sink renders them. Missing numbers are [`OutputCell::Empty`],
//! never zero or NaN.

use crate::aggregation::AggregationStore;
use crate::config::InventoryConfig;
use crate::constants::{
    GLOBAL_LABEL, INVENTORY_GPS_COLUMNS, INVENTORY_LEADING_COLUMNS, SAMPLE_COUNT_COLUMN,
    SUMMARY_LEADING_COLUMNS,
};
use crate::models::{
    Category, CategorySummaries, FileMetadata, GpsFix, GroupLabel, PositionSummary, Statistic,
};
use tracing::debug;

/// One output cell
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    Text(String),
    Number(f64),
    Count(usize),
    Empty,
}

impl OutputCell {
    fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            OutputCell::Empty
        } else {
            OutputCell::Text(value)
        }
    }

    fn number(value: Option<f64>) -> Self {
        value.map_or(OutputCell::Empty, OutputCell::Number)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, OutputCell::Empty)
    }
}

/// Formatting directive attached to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    /// Plain per-file row; numbers keep full precision
    Data,
    /// Bold first column, statistic cells at four decimals
    LabelBoldNumeric,
    Blank,
}

/// A row handed to a workbook sink
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub kind: RowKind,
    pub cells: Vec<OutputCell>,
}

impl OutputRow {
    pub fn header<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            kind: RowKind::Header,
            cells: names
                .iter()
                .map(|name| OutputCell::Text(name.as_ref().to_string()))
                .collect(),
        }
    }

    pub fn blank() -> Self {
        Self {
            kind: RowKind::Blank,
            cells: Vec::new(),
        }
    }
}

/// `<Category> <STAT>` names, category-major
pub fn statistic_columns() -> Vec<String> {
    Category::ALL
        .iter()
        .flat_map(|category| {
            Statistic::ALL
                .iter()
                .map(move |statistic| format!("{} {}", category.name(), statistic.name()))
        })
        .collect()
}

/// Builds one inventory row per source file
#[derive(Debug, Clone)]
pub struct InventoryRowBuilder {
    include_gps: bool,
}

impl InventoryRowBuilder {
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            include_gps: config.include_gps,
        }
    }

    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = INVENTORY_LEADING_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();
        if self.include_gps {
            header.extend(INVENTORY_GPS_COLUMNS.iter().map(|c| c.to_string()));
        }
        header.push(SAMPLE_COUNT_COLUMN.to_string());
        header.extend(statistic_columns());
        header
    }

    pub fn header_row(&self) -> OutputRow {
        OutputRow::header(&self.header())
    }

    pub fn build(
        &self,
        metadata: &FileMetadata,
        position: &PositionSummary,
        summaries: &CategorySummaries,
    ) -> OutputRow {
        let mut cells = vec![
            OutputCell::text(metadata.date_string()),
            OutputCell::text(metadata.region.clone().unwrap_or_default()),
            OutputCell::text(metadata.location.clone()),
            OutputCell::text(metadata.environment.clone().unwrap_or_default()),
            // note
            OutputCell::Empty,
            OutputCell::text(position.start_time.clone()),
            OutputCell::text(position.end_time.clone()),
        ];

        if self.include_gps {
            for fix in [position.start_fix, position.turn_fix, position.end_fix] {
                push_fix(&mut cells, fix);
            }
        }

        cells.push(OutputCell::Count(position.sample_count));

        for (_, summary) in summaries.iter() {
            cells.extend(summary.values().into_iter().map(OutputCell::number));
        }

        OutputRow {
            kind: RowKind::Data,
            cells,
        }
    }
}

fn push_fix(cells: &mut Vec<OutputCell>, fix: Option<GpsFix>) {
    cells.push(OutputCell::number(fix.map(|f| f.latitude)));
    cells.push(OutputCell::number(fix.map(|f| f.longitude)));
}

/// Builds the pooled summary table from the aggregation store
#[derive(Debug, Clone)]
pub struct SummaryTableBuilder {
    order: Vec<(GroupLabel, String)>,
}

impl SummaryTableBuilder {
    pub fn new(config: &InventoryConfig) -> Self {
        let mut order = vec![(GroupLabel::Global, GLOBAL_LABEL.to_string())];
        order.extend(
            config
                .regions
                .iter()
                .map(|r| (GroupLabel::Region(r.code.clone()), r.name.clone())),
        );
        order.extend(
            config
                .environments
                .iter()
                .map(|e| (GroupLabel::Environment(e.code.clone()), e.name.clone())),
        );
        Self { order }
    }

    pub fn header(&self) -> Vec<String> {
        SUMMARY_LEADING_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(Statistic::ALL.iter().map(|s| s.name().to_string()))
            .collect()
    }

    /// Header row, then six rows per label with data, blocks separated by
    /// one blank row
    pub fn build(&self, store: &AggregationStore) -> Vec<OutputRow> {
        let mut rows = vec![OutputRow::header(&self.header())];
        let mut blocks = 0;

        for (label, display) in &self.order {
            let Some(summaries) = store.snapshot(label) else {
                continue;
            };
            if blocks > 0 {
                rows.push(OutputRow::blank());
            }
            blocks += 1;

            for (category, summary) in summaries.iter() {
                let mut cells = vec![
                    OutputCell::Text(display.clone()),
                    OutputCell::Text(category.name().to_string()),
                ];
                cells.extend(summary.values().into_iter().map(OutputCell::number));
                rows.push(OutputRow {
                    kind: RowKind::LabelBoldNumeric,
                    cells,
                });
            }
        }

        debug!("Summary table has {} label blocks", blocks);
        rows
    }
}

impl AggregationStore {
    /// Drain the store into the summary table
    pub fn into_summary_tables(self, builder: &SummaryTableBuilder) -> Vec<OutputRow> {
        builder.build(&self)
    }
}
