//! Normalize one raw answer against its question into a 0..=100 score.
//!
//! Total and pure: anything that cannot be interpreted yields `None`, which
//! callers drop without touching their denominators.

use crate::config::Config;
use crate::types::*;

/// Normalize `answer` for `question`.
///
/// - scale: linear position inside `[min, max]`, clamped, inverted when reverse-scored.
/// - single/multi: share of selections that are positive; empty selection scores 0.
/// - text/unknown: never scored.
pub fn normalize(
  answer: &AnswerValue,
  question: &Question,
  config: &Config,
) -> Option<NormalizedAnswer> {
  match question.kind {
    QuestionKind::Scale => normalize_scale(answer, question, config),
    QuestionKind::Single | QuestionKind::Multi => Some(normalize_choice(answer, question, config)),
    QuestionKind::Text | QuestionKind::Unknown => None,
  }
}

/// Explicit flag wins; otherwise look for the marker in the question copy.
pub fn is_reverse_scored(question: &Question, config: &Config) -> bool {
  if let Some(flag) = question.reverse_scored {
    return flag;
  }
  let marker = config.reverse_marker.to_lowercase();
  if marker.is_empty() {
    return false;
  }
  let text = format!(
    "{} {}",
    question.title.as_deref().unwrap_or(""),
    question.prompt_text
  )
  .to_lowercase();
  text.contains(&marker)
}

/// Explicit per-option flag wins; otherwise look for the marker in the label.
pub fn is_positive_selection(selection: &str, question: &Question, config: &Config) -> bool {
  let flagged = question
    .options
    .iter()
    .find(|opt| opt.label() == selection)
    .and_then(|opt| opt.positive());
  match flagged {
    Some(flag) => flag,
    None => !config.positive_marker.is_empty() && selection.contains(&config.positive_marker),
  }
}

fn normalize_scale(
  answer: &AnswerValue,
  question: &Question,
  config: &Config,
) -> Option<NormalizedAnswer> {
  let bounds = question.scale.unwrap_or_default();
  let min = bounds.min.unwrap_or(config.default_scale_min);
  let max = bounds.max.unwrap_or(config.default_scale_max);
  let value = numeric_value(answer)?;
  if !value.is_finite() || !min.is_finite() || !max.is_finite() || max <= min {
    return None;
  }

  let raw = ((value - min) / (max - min)).clamp(0.0, 1.0);
  let adjusted = if is_reverse_scored(question, config) {
    1.0 - raw
  } else {
    raw
  };
  Some(NormalizedAnswer {
    score: adjusted.clamp(0.0, 1.0) * 100.0,
    kind: AnswerKind::Likert,
  })
}

/// Numbers, and strings that hold a number.
fn numeric_value(answer: &AnswerValue) -> Option<f64> {
  match answer {
    AnswerValue::Number(n) => Some(*n),
    AnswerValue::Text(s) => s.trim().parse::<f64>().ok(),
    AnswerValue::Other(serde_json::Value::Number(n)) => n.as_f64(),
    _ => None,
  }
}

fn normalize_choice(answer: &AnswerValue, question: &Question, config: &Config) -> NormalizedAnswer {
  // (positives, total). Anything of the wrong shape is an empty selection.
  let (positives, total) = match (question.kind, answer) {
    (QuestionKind::Single, AnswerValue::Text(s)) => {
      (usize::from(is_positive_selection(s, question, config)), 1)
    }
    (QuestionKind::Multi, AnswerValue::Choices(items)) => (
      items
        .iter()
        .filter(|s| is_positive_selection(s, question, config))
        .count(),
      items.len(),
    ),
    // Mixed arrays: non-strings count as selections but are never positive.
    (QuestionKind::Multi, AnswerValue::Other(serde_json::Value::Array(items))) => (
      items
        .iter()
        .filter_map(|v| v.as_str())
        .filter(|s| is_positive_selection(s, question, config))
        .count(),
      items.len(),
    ),
    _ => (0, 0),
  };

  let score = if total == 0 {
    0.0
  } else {
    positives as f64 / total as f64 * 100.0
  };
  NormalizedAnswer {
    score,
    kind: AnswerKind::Mcq,
  }
}
