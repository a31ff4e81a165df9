//! Record scoring: combine every normalized answer of one record into a breakdown.

use std::collections::HashMap;

use crate::config::Config;
use crate::normalize::normalize;
use crate::types::*;

/// Round to 2 decimal places.
pub fn round2(v: f64) -> f64 {
  (v * 100.0).round() / 100.0
}

pub fn mean(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    None
  } else {
    Some(values.iter().sum::<f64>() / values.len() as f64)
  }
}

/// Mean of both means when both exist, else whichever exists, else 0.
pub fn combine(likert: Option<f64>, mcq: Option<f64>) -> f64 {
  match (likert, mcq) {
    (Some(l), Some(m)) => (l + m) / 2.0,
    (Some(v), None) | (None, Some(v)) => v,
    (None, None) => 0.0,
  }
}

/// Score one record's answers. Unknown questions and unscorable answers are dropped.
pub fn score_record(
  answers: &HashMap<String, AnswerValue>,
  catalog: &QuestionCatalog,
  config: &Config,
) -> ScoreBreakdown {
  let mut likert = Vec::new();
  let mut mcq = Vec::new();

  // Fixed summation order so the rounded means never depend on map order.
  let mut qids: Vec<&String> = answers.keys().collect();
  qids.sort();

  for qid in qids {
    let Some(question) = catalog.get(qid) else {
      continue;
    };
    match normalize(&answers[qid], question, config) {
      Some(NormalizedAnswer {
        score,
        kind: AnswerKind::Likert,
      }) => likert.push(score),
      Some(NormalizedAnswer {
        score,
        kind: AnswerKind::Mcq,
      }) => mcq.push(score),
      None => {}
    }
  }

  let likert_mean = mean(&likert);
  let mcq_mean = mean(&mcq);

  ScoreBreakdown {
    overall: round2(combine(likert_mean, mcq_mean)),
    likert_mean: likert_mean.map(round2),
    mcq_mean: mcq_mean.map(round2),
    likert_count: likert.len(),
    mcq_count: mcq.len(),
  }
}
