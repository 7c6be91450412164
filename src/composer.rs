//! Per-row frequency category composites.
//!
//! A category composite is the root of the sum of squares (RSS) of its
//! contributing sub-band columns. Columns the table lacks and cells that
//! are not numeric are skipped; a row where none of the category's columns
//! holds a number has no composite at all.

use crate::config::CategoryMap;
use crate::models::{Category, Cell, RawMeasurementTable};
use tracing::debug;

/// Composite values of every category for every row of one table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeSeries {
    values: [Vec<Option<f64>>; Category::COUNT],
}

impl CompositeSeries {
    pub fn get(&self, category: Category) -> &[Option<f64>] {
        &self.values[category.index()]
    }

    /// Defined composites of a category in row order
    pub fn defined(&self, category: Category) -> Vec<f64> {
        self.get(category).iter().flatten().copied().collect()
    }

    pub fn row_count(&self) -> usize {
        self.values[0].len()
    }
}

/// Column positions of each category inside one table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedColumns {
    positions: [Vec<usize>; Category::COUNT],
}

impl ResolvedColumns {
    pub fn positions(&self, category: Category) -> &[usize] {
        &self.positions[category.index()]
    }
}

/// Computes category composites from raw sub-band columns
#[derive(Debug, Clone)]
pub struct CategoryComposer {
    columns: [Vec<String>; Category::COUNT],
}

impl CategoryComposer {
    pub fn new(categories: &CategoryMap) -> Self {
        Self {
            columns: Category::ALL.map(|category| categories.columns(category)),
        }
    }

    /// Expected raw columns of a category
    pub fn columns(&self, category: Category) -> &[String] {
        &self.columns[category.index()]
    }

    /// Locate each category's columns in a table, dropping absent ones
    pub fn resolve(&self, table: &RawMeasurementTable) -> ResolvedColumns {
        let positions = Category::ALL.map(|category| {
            let expected = self.columns(category);
            let missing = table.missing_columns(expected);
            if !missing.is_empty() {
                debug!(
                    "{}: {} of {} columns absent",
                    category,
                    missing.len(),
                    expected.len()
                );
            }
            expected
                .iter()
                .filter_map(|name| table.column_index(name))
                .collect()
        });

        ResolvedColumns { positions }
    }

    /// Composite of one category for one row
    pub fn composite(
        &self,
        resolved: &ResolvedColumns,
        category: Category,
        row: &[Cell],
    ) -> Option<f64> {
        root_sum_of_squares(
            resolved
                .positions(category)
                .iter()
                .map(|&position| row[position].as_number()),
        )
    }

    /// Composites of every category for every row
    pub fn compose(&self, table: &RawMeasurementTable) -> CompositeSeries {
        let resolved = self.resolve(table);
        let values = Category::ALL.map(|category| {
            table
                .rows()
                .iter()
                .map(|row| self.composite(&resolved, category, row))
                .collect()
        });

        CompositeSeries { values }
    }
}

/// RSS of the present values
///
/// `None` when no value is present or when the sum of squares overflows.
pub fn root_sum_of_squares(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut present = false;
    let mut sum = 0.0;
    for value in values.into_iter().flatten() {
        present = true;
        sum += value * value;
    }
    present.then(|| sum.sqrt()).filter(|rss| rss.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> RawMeasurementTable {
        RawMeasurementTable::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn small_map() -> CategoryMap {
        CategoryMap::default()
            .with_band(Category::Broadcast, vec!["A".into(), "B".into()])
            .unwrap()
            .with_band(Category::Downlink, vec!["C".into()])
            .unwrap()
            .with_band(Category::Uplink, vec!["U".into()])
            .unwrap()
            .with_band(Category::Wlan, vec!["B".into(), "W".into()])
            .unwrap()
            .with_band(Category::Tdd, vec!["T".into()])
            .unwrap()
    }

    #[test]
    fn test_rss_of_present_values() {
        assert_eq!(root_sum_of_squares([Some(3.0), Some(4.0)]), Some(5.0));
        assert_eq!(root_sum_of_squares([Some(3.0), None]), Some(3.0));
        assert_eq!(root_sum_of_squares([None, None]), None);
        assert_eq!(root_sum_of_squares(std::iter::empty()), None);
    }

    #[test]
    fn test_overflowing_rss_is_undefined() {
        assert_eq!(root_sum_of_squares([Some(1e200)]), None);
        assert_eq!(root_sum_of_squares([Some(1e200), Some(1.0)]), None);
        let large = 2f64.powi(500);
        assert_eq!(root_sum_of_squares([Some(large)]), Some(large));
    }

    #[test]
    fn test_absent_columns_contribute_nothing() {
        let composer = CategoryComposer::new(&small_map());
        let table = table(&["t", "A"], vec![vec![Cell::Missing, Cell::Number(2.0)]]);

        let series = composer.compose(&table);
        assert_eq!(series.get(Category::Broadcast), &[Some(2.0)]);
        assert_eq!(series.get(Category::Downlink), &[None]);
    }

    #[test]
    fn test_all_missing_row_is_undefined_not_zero() {
        let composer = CategoryComposer::new(&small_map());
        let table = table(
            &["t", "A", "B"],
            vec![
                vec![Cell::Missing, Cell::Missing, Cell::Text("--".into())],
                vec![Cell::Missing, Cell::Number(0.0), Cell::Missing],
            ],
        );

        let series = composer.compose(&table);
        assert_eq!(series.get(Category::Broadcast), &[None, Some(0.0)]);
        assert_eq!(series.defined(Category::Broadcast), vec![0.0]);
    }

    #[test]
    fn test_total_counts_shared_column_once() {
        let composer = CategoryComposer::new(&small_map());
        let table = table(
            &["t", "A", "B", "C", "W"],
            vec![vec![
                Cell::Missing,
                Cell::Number(1.0),
                Cell::Number(2.0),
                Cell::Number(2.0),
                Cell::Number(4.0),
            ]],
        );

        let series = composer.compose(&table);
        // B belongs to Broadcast and WLAN and is counted in both
        assert_eq!(series.get(Category::Broadcast)[0], Some(5f64.sqrt()));
        assert_eq!(series.get(Category::Wlan)[0], Some(20f64.sqrt()));
        // Total covers A, B, C, W with B once: 1 + 4 + 4 + 16
        assert_eq!(series.get(Category::Total)[0], Some(5.0));
    }

    #[test]
    fn test_default_map_resolves_mangled_headers() {
        let composer = CategoryComposer::new(&CategoryMap::default());
        let table = table(
            &["Date&Time", "WLAN (RMS)", "WLAN (RMS).1"],
            vec![vec![Cell::Missing, Cell::Number(3.0), Cell::Number(4.0)]],
        );

        let resolved = composer.resolve(&table);
        assert_eq!(resolved.positions(Category::Wlan), &[1, 2]);
        assert_eq!(resolved.positions(Category::Total), &[1, 2]);
        assert!(resolved.positions(Category::Tdd).is_empty());

        let series = composer.compose(&table);
        assert_eq!(series.get(Category::Wlan), &[Some(5.0)]);
        assert_eq!(series.row_count(), 1);
    }
}
