//! Pooled accumulation of composite values across files.
//!
//! Raw composite values are kept per group label and category for the
//! whole run. Statistics are computed from the pooled values on demand,
//! never from per-file summaries.

use crate::composer::CompositeSeries;
use crate::config::PoolingPolicy;
use crate::models::{Category, CategorySummaries, FileMetadata, GroupLabel};
use crate::statistics::summarize;
use std::collections::HashMap;
use tracing::debug;

type CategoryBuffers = [Vec<f64>; Category::COUNT];

/// Multi-label accumulator of raw category values
#[derive(Debug, Default)]
pub struct AggregationStore {
    groups: HashMap<GroupLabel, CategoryBuffers>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append values to a label's category multiset, creating the label on
    /// first use
    pub fn add(&mut self, label: GroupLabel, category: Category, values: &[f64]) {
        if values.is_empty() {
            return;
        }
        self.groups.entry(label).or_default()[category.index()].extend_from_slice(values);
    }

    /// Push one file's composites under every label it belongs to
    pub fn fold_file(
        &mut self,
        metadata: &FileMetadata,
        composites: &CompositeSeries,
        policy: PoolingPolicy,
    ) {
        let labels = labels_for(metadata, policy);

        for category in Category::ALL {
            let values = composites.defined(category);
            for label in &labels {
                self.add(label.clone(), category, &values);
            }
        }

        debug!("Folded {} rows under {:?}", composites.row_count(), labels);
    }

    /// Pooled summaries of every category under a label
    ///
    /// `None` for a label that never received a value.
    pub fn snapshot(&self, label: &GroupLabel) -> Option<CategorySummaries> {
        let buffers = self.groups.get(label)?;
        Some(CategorySummaries::new(
            Category::ALL.map(|category| summarize(&buffers[category.index()])),
        ))
    }

    /// Number of pooled values of one label and category
    pub fn len(&self, label: &GroupLabel, category: Category) -> usize {
        self.groups
            .get(label)
            .map_or(0, |buffers| buffers[category.index()].len())
    }

    /// Labels holding at least one value, in sorted order
    pub fn labels(&self) -> Vec<GroupLabel> {
        let mut labels: Vec<GroupLabel> = self.groups.keys().cloned().collect();
        labels.sort();
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group labels a file pools under
///
/// Empty region or environment codes produce no label.
pub fn labels_for(metadata: &FileMetadata, policy: PoolingPolicy) -> Vec<GroupLabel> {
    let mut labels = vec![GroupLabel::Global];

    if let Some(region) = metadata.region.as_deref().filter(|code| !code.is_empty()) {
        labels.push(GroupLabel::Region(region.to_string()));
    }

    let environment = metadata.environment.as_deref().filter(|code| !code.is_empty());
    if let (PoolingPolicy::RegionAndEnvironment, Some(environment)) = (policy, environment) {
        labels.push(GroupLabel::Environment(environment.to_string()));
    }

    labels
}
