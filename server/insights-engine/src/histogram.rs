//! Activity distribution: how many records ended after N iterations.

use std::collections::BTreeMap;

use crate::types::{HistogramBucket, ReflectionRecord};

/// Count records per exact iteration value, ascending, keeping the first
/// `max_buckets` distinct values. The caller filters out baselines.
pub fn build_histogram(records: &[ReflectionRecord], max_buckets: usize) -> Vec<HistogramBucket> {
  let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
  for record in records {
    *counts.entry(record.iterations).or_insert(0) += 1;
  }
  counts
    .into_iter()
    .take(max_buckets)
    .map(|(iterations, count)| HistogramBucket(iterations, count))
    .collect()
}
