//! Core types for the insights engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

// ---------------------------------------------------------------------------
// Question catalog
// ---------------------------------------------------------------------------

/// Question type. Unknown or missing types become `Unknown` and are never scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
  Scale,
  Single,
  Multi,
  Text,
  #[default]
  #[serde(other)]
  Unknown,
}

/// Numeric range of a scale question. Missing bounds fall back to config defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
  #[serde(default)]
  pub min: Option<f64>,
  #[serde(default)]
  pub max: Option<f64>,
}

/// One choice of a single/multi question: either a bare label or a label with
/// an explicit positive flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceOption {
  Label(String),
  Detailed {
    label: String,
    #[serde(default)]
    positive: Option<bool>,
  },
}

impl ChoiceOption {
  pub fn label(&self) -> &str {
    match self {
      Self::Label(l) => l,
      Self::Detailed { label, .. } => label,
    }
  }

  pub fn positive(&self) -> Option<bool> {
    match self {
      Self::Label(_) => None,
      Self::Detailed { positive, .. } => *positive,
    }
  }
}

/// Catalog entry, keyed by `id`. Unknown fields are silently ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  #[serde(rename = "type", default)]
  pub kind: QuestionKind,
  #[serde(default)]
  pub domain: Option<String>,
  #[serde(default, alias = "promptText", alias = "question", deserialize_with = "null_as_default")]
  pub prompt_text: String,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub scale: Option<ScaleBounds>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub options: Vec<ChoiceOption>,
  /// Explicit reverse-scoring flag. When absent the prompt copy is searched
  /// for the configured marker.
  #[serde(default, alias = "reverseScored")]
  pub reverse_scored: Option<bool>,
}

/// Question catalog keyed by question id.
pub type QuestionCatalog = HashMap<String, Question>;

/// Build a catalog from a list; later definitions win on duplicate ids.
pub fn catalog_from(questions: &[Question]) -> QuestionCatalog {
  questions.iter().map(|q| (q.id.clone(), q.clone())).collect()
}

// ---------------------------------------------------------------------------
// Answers + records
// ---------------------------------------------------------------------------

/// Loosely typed answer; its meaning depends on the owning question's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
  Number(f64),
  Text(String),
  Choices(Vec<String>),
  Other(serde_json::Value),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordContext {
  Baseline,
  #[default]
  Reflection,
}

impl RecordContext {
  /// Anything but "baseline" counts as a reflection.
  pub fn from_str_loose(s: Option<&str>) -> Self {
    match s.map(|v| v.trim().to_ascii_lowercase()) {
      Some(v) if v == "baseline" => Self::Baseline,
      _ => Self::Reflection,
    }
  }

  pub fn is_baseline(self) -> bool {
    self == Self::Baseline
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  pub overall: f64,
  #[serde(default, alias = "likertMean")]
  pub likert_mean: Option<f64>,
  #[serde(default, alias = "mcqMean")]
  pub mcq_mean: Option<f64>,
  #[serde(default, alias = "likertCount")]
  pub likert_count: usize,
  #[serde(default, alias = "mcqCount")]
  pub mcq_count: usize,
}

/// Canonical internal record after ingest. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionRecord {
  pub timestamp: DateTime<Utc>,
  pub context: RecordContext,
  pub task_id: Option<String>,
  pub answers: HashMap<String, AnswerValue>,
  pub iterations: u32,
  pub duration: u64,
  pub score: Option<ScoreBreakdown>,
}

// ---------------------------------------------------------------------------
// Normalized answers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
  Likert,
  Mcq,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedAnswer {
  /// 0..=100.
  pub score: f64,
  pub kind: AnswerKind,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSummary {
  pub domain: String,
  pub overall: f64,
  pub likert: Option<f64>,
  pub mcq: Option<f64>,
  pub response_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowStats {
  pub current_avg: f64,
  pub previous_avg: f64,
  pub delta: f64,
  pub total_duration_seconds: u64,
  pub avg_iterations: f64,
  pub sample_count: usize,
}

/// `(iteration_count, record_count)`; serializes as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBucket(pub u32, pub usize);

impl HistogramBucket {
  pub fn iterations(&self) -> u32 {
    self.0
  }

  pub fn count(&self) -> usize {
    self.1
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
  pub id: String,
  pub domain: String,
  pub title: String,
  pub tip: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub example: Option<String>,
}

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One stored result as produced by the results store.
///
/// The store keeps whatever the client posted, so every field except the
/// timestamp is read leniently: null `answers` is empty, activity counts accept
/// floats (truncated) and clamp negatives to 0, and a malformed stored score is
/// dropped so the record gets rescored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundRecord {
  pub timestamp: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub context: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub task_id: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub answers: HashMap<String, AnswerValue>,
  #[serde(default, deserialize_with = "lenient_u32")]
  pub iterations: Option<u32>,
  #[serde(default, deserialize_with = "lenient_u64")]
  pub duration: Option<u64>,
  #[serde(default, deserialize_with = "lenient_score")]
  pub score: Option<ScoreBreakdown>,
}

/// A records-list entry: a readable record, or anything else, kept so ingest
/// can report and count it instead of rejecting the whole snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundRow {
  Record(InboundRecord),
  Malformed(Value),
}

/// One consistent snapshot of the three engine inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardInput {
  /// RFC 3339 reference instant for the weekly windows.
  #[serde(default)]
  pub now: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub records: Vec<InboundRow>,
  /// Malformed catalog entries are dropped with a warning.
  #[serde(default, deserialize_with = "skip_malformed")]
  pub questions: Vec<Question>,
  #[serde(default, alias = "hacks", alias = "prompt_hacks", deserialize_with = "skip_malformed")]
  pub recommendations: Vec<RecommendationEntry>,
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(s)) => Some(s),
    _ => None,
  })
}

/// Whole non-negative count from a JSON number or numeric string.
fn count_from_value(value: &Value) -> Option<u64> {
  let n = match value {
    Value::Number(n) => match n.as_u64() {
      Some(u) => return Some(u),
      None => n.as_f64()?,
    },
    Value::String(s) => s.trim().parse::<f64>().ok()?,
    _ => return None,
  };
  if !n.is_finite() {
    return None;
  }
  // Float-to-int `as` saturates, so huge values cap at u64::MAX.
  Some(n.max(0.0).trunc() as u64)
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(
    value
      .as_ref()
      .and_then(count_from_value)
      .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
  )
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value.as_ref().and_then(count_from_value))
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<ScoreBreakdown>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<Value>::deserialize(deserializer)? {
    Some(value) => serde_json::from_value(value).ok(),
    None => None,
  })
}

fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
  Ok(
    raw
      .into_iter()
      .enumerate()
      .filter_map(|(idx, value)| match serde_json::from_value(value) {
        Ok(item) => Some(item),
        Err(e) => {
          warn!("dropping malformed entry #{}: {}", idx, e);
          None
        }
      })
      .collect(),
  )
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
  Positive,
  Negative,
  Neutral,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekSummary {
  #[serde(flatten)]
  pub stats: WindowStats,
  pub delta_tone: Tone,
  pub delta_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordScore {
  pub timestamp: String,
  pub context: RecordContext,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub task_id: Option<String>,
  pub iterations: u32,
  pub duration: u64,
  pub score: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDomain {
  pub domain: String,
  pub label: String,
  pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthInsight {
  pub domain: String,
  pub label: String,
  pub strength: String,
  pub stretch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthInsight {
  pub domain: String,
  pub label: String,
  pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeTone {
  High,
  Balanced,
  Moderate,
  Low,
  Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GaugeZone {
  pub label: &'static str,
  pub tone: GaugeTone,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
  pub report_id: String,
  pub generated_at: String,
  pub records: Vec<RecordScore>,
  pub overall_average: f64,
  pub domains: Vec<DomainSummary>,
  pub top_domains: Vec<RankedDomain>,
  pub week: WeekSummary,
  pub histogram: Vec<HistogramBucket>,
  pub iterations_average: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub strength: Option<StrengthInsight>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub growth: Option<GrowthInsight>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub recommendation: Option<RecommendationEntry>,
  pub engagement: String,
  pub gauge: GaugeZone,
  pub skipped_records: usize,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
