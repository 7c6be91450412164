//! Delimited-text reader for measurement tables.
//!
//! Reads one header row followed by sample rows into a
//! [`RawMeasurementTable`]. Repeated header names are disambiguated with
//! `.1`, `.2`, ... suffixes so the category map can address every repeated
//! sub-band channel by name.

use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use crate::models::{Cell, RawMeasurementTable};
use csv::ReaderBuilder;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reader for CSV and tab-separated measurement files
#[derive(Debug, Clone, Default)]
pub struct TabularReader {
    delimiter: Option<u8>,
}

impl TabularReader {
    pub fn new(delimiter: Option<u8>) -> Self {
        Self { delimiter }
    }

    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(config.delimiter)
    }

    /// Read a whole measurement file
    pub fn read(&self, path: &Path) -> Result<RawMeasurementTable> {
        let file = File::open(path)?;
        let delimiter = self.delimiter.unwrap_or_else(|| delimiter_for(path));
        self.read_from(file, delimiter, path)
    }

    /// Read a table from any byte source; `path` is only used in errors
    pub fn read_from<R: Read>(
        &self,
        source: R,
        delimiter: u8,
        path: &Path,
    ) -> Result<RawMeasurementTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| decode_field(h).trim_matches(char::from(0)).to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(InventoryError::EmptyTable {
                path: path.to_path_buf(),
            });
        }

        let columns = mangle_duplicate_headers(headers);

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(record.iter().map(|field| Cell::parse(&decode_field(field))).collect());
        }

        debug!(
            "Read {} rows x {} columns from {}",
            rows.len(),
            columns.len(),
            path.display()
        );

        Ok(RawMeasurementTable::new(columns, rows))
    }
}

/// Field text with invalid UTF-8 sequences replaced
fn decode_field(field: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(field)
}

/// Delimiter implied by a file's extension
pub fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("tsv") | Some("txt") => b'\t',
        _ => b',',
    }
}

/// Make header names unique
///
/// Blank names become `Unnamed: <position>`; the second occurrence of a
/// name becomes `name.1`, the third `name.2`, skipping any suffix already
/// taken by a literal header.
pub fn mangle_duplicate_headers(headers: Vec<String>) -> Vec<String> {
    let headers: Vec<String> = headers
        .into_iter()
        .enumerate()
        .map(|(position, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {}", position)
            } else {
                name
            }
        })
        .collect();

    let mut taken: HashSet<String> = headers.iter().cloned().collect();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(headers.len());

    for name in headers {
        let count = counts.entry(name.clone()).or_insert(0);
        if *count == 0 {
            *count = 1;
            unique.push(name);
            continue;
        }

        let mut candidate = format!("{}.{}", name, count);
        while taken.contains(&candidate) {
            *count += 1;
            candidate = format!("{}.{}", name, count);
        }
        *count += 1;
        taken.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}
