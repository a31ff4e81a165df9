//! Per-domain aggregation across all records.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::Config;
use crate::normalize::normalize;
use crate::score::{combine, mean};
use crate::types::*;

#[derive(Default)]
struct DomainAccumulator {
  likert: Vec<f64>,
  mcq: Vec<f64>,
  responses: usize,
}

/// Aggregate every answer of every record by its question's domain.
///
/// Answers without a domain, in an excluded domain, or that fail to normalize
/// are skipped; `response_count` counts normalized answers only. Output is in
/// first-seen order (records in input order, answers in id order within a
/// record) so tie-breaks downstream stay deterministic.
pub fn aggregate_domains(
  records: &[ReflectionRecord],
  catalog: &QuestionCatalog,
  excluded: &HashSet<String>,
  config: &Config,
) -> Vec<DomainSummary> {
  let mut order: Vec<String> = Vec::new();
  let mut acc: HashMap<String, DomainAccumulator> = HashMap::new();

  for record in records {
    let mut qids: Vec<&String> = record.answers.keys().collect();
    qids.sort();

    for qid in qids {
      let Some(question) = catalog.get(qid.as_str()) else {
        continue;
      };
      let Some(domain) = question.domain.as_deref() else {
        continue;
      };
      if excluded.contains(domain) {
        continue;
      }
      let Some(normalized) = normalize(&record.answers[qid], question, config) else {
        continue;
      };

      let entry = acc.entry(domain.to_string()).or_insert_with(|| {
        order.push(domain.to_string());
        DomainAccumulator::default()
      });
      match normalized.kind {
        AnswerKind::Likert => entry.likert.push(normalized.score),
        AnswerKind::Mcq => entry.mcq.push(normalized.score),
      }
      entry.responses += 1;
    }
  }

  debug!("aggregated {} domains from {} records", order.len(), records.len());

  order
    .into_iter()
    .filter_map(|domain| {
      let entry = acc.remove(&domain)?;
      let likert = mean(&entry.likert);
      let mcq = mean(&entry.mcq);
      Some(DomainSummary {
        overall: combine(likert, mcq),
        likert,
        mcq,
        response_count: entry.responses,
        domain,
      })
    })
    .collect()
}

/// Sort by `overall` descending; equal scores keep their input order.
pub fn rank_domains(summaries: &[DomainSummary]) -> Vec<DomainSummary> {
  let mut ranked = summaries.to_vec();
  ranked.sort_by(|a, b| {
    b.overall
      .partial_cmp(&a.overall)
      .unwrap_or(std::cmp::Ordering::Equal)
  });
  ranked
}
