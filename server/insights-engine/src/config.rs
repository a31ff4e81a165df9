//! Engine configuration with sane defaults.
//!
//! Everything that used to be a hard-coded table (excluded domains, friendly
//! labels, narratives, content markers) lives here so new domains need no code
//! change. Loadable from TOML; every field is optional.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;

/// Accepted `window_days`: one day up to ten years.
pub const WINDOW_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

/// Presentation metadata for one domain.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DomainMeta {
  /// Friendly label; falls back to the domain id.
  pub label: Option<String>,
  /// Curated copy for when this is the strongest domain.
  pub strength: Option<String>,
  /// Curated copy for when this domain needs work.
  pub stretch: Option<String>,
}

/// Tunable thresholds and lookup tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Domains never reported (and whose recommendations are dropped).
  pub excluded_domains: HashSet<String>,
  /// Domain id -> label + narratives.
  pub domains: BTreeMap<String, DomainMeta>,
  /// Case-insensitive marker in question copy that flags reverse scoring.
  pub reverse_marker: String,
  /// Substring in an option label that marks it positive.
  pub positive_marker: String,
  /// Length of one comparison window, in days.
  pub window_days: i64,
  /// Max distinct iteration counts kept in the histogram.
  pub histogram_max_buckets: usize,
  /// Number of ranked domains surfaced in the report.
  pub top_domains_limit: usize,
  /// Average iterations at or above which cadence counts as thorough.
  pub engagement_iterations_threshold: f64,
  /// Deltas smaller than this (absolute) read as "no change".
  pub delta_epsilon: f64,
  /// Bounds used when a scale question omits them.
  pub default_scale_min: f64,
  pub default_scale_max: f64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      excluded_domains: HashSet::from(["Analogical".to_string()]),
      domains: default_domains(),
      reverse_marker: "reverse scored".into(),
      positive_marker: "(+1".into(),
      window_days: 7,
      histogram_max_buckets: 6,
      top_domains_limit: 5,
      engagement_iterations_threshold: 3.0,
      delta_epsilon: 0.05,
      default_scale_min: 1.0,
      default_scale_max: 5.0,
    }
  }
}

impl Config {
  /// Load from a TOML file. A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, EngineError> {
    if !path.exists() {
      tracing::debug!("config {} not found, using defaults", path.display());
      return Ok(Self::default());
    }
    let content = std::fs::read_to_string(path)?;
    Self::from_toml(&content)
  }

  pub fn from_toml(content: &str) -> Result<Self, EngineError> {
    let config: Self = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Reject values the window arithmetic cannot represent.
  pub fn validate(&self) -> Result<(), EngineError> {
    if !WINDOW_DAYS_RANGE.contains(&self.window_days) {
      return Err(EngineError::validation(
        "window_days",
        &format!(
          "must be within {}..={}, got {}",
          WINDOW_DAYS_RANGE.start(),
          WINDOW_DAYS_RANGE.end(),
          self.window_days
        ),
      ));
    }
    Ok(())
  }

  pub fn is_excluded(&self, domain: &str) -> bool {
    self.excluded_domains.contains(domain)
  }

  /// Friendly label for a domain id.
  pub fn label_for<'a>(&'a self, domain: &'a str) -> &'a str {
    self
      .domains
      .get(domain)
      .and_then(|m| m.label.as_deref())
      .unwrap_or(domain)
  }

  pub fn meta(&self, domain: &str) -> Option<&DomainMeta> {
    self.domains.get(domain)
  }
}

fn meta(label: &str, strength: &str, stretch: &str) -> DomainMeta {
  DomainMeta {
    label: Some(label.into()),
    strength: Some(strength.into()),
    stretch: Some(stretch.into()),
  }
}

fn default_domains() -> BTreeMap<String, DomainMeta> {
  let entries = [
    (
      "Analytical",
      meta(
        "Analytical",
        "You excel at structuring complex prompts into actionable steps.",
        "Break larger problems into checkpoints to sharpen analytical follow-through.",
      ),
    ),
    (
      "Critical",
      meta(
        "Critical Thinking",
        "You consistently evaluate AI output with healthy scepticism.",
        "Add quick evidence checks to keep building that critical edge.",
      ),
    ),
    (
      "Flexibility",
      meta(
        "Cognitive Flexibility",
        "You adapt quickly when the AI shifts direction or tone.",
        "Experiment with alternative perspectives before locking in a solution.",
      ),
    ),
    (
      "Inductive",
      meta(
        "Inductive Reasoning",
        "You spot emerging patterns in AI suggestions with ease.",
        "Capture recurring cues to turn intuition into reusable playbooks.",
      ),
    ),
    (
      "Deductive",
      meta(
        "Deductive Logic",
        "You apply high-level rules precisely to your own context.",
        "Document a quick checklist to make each deduction even sharper.",
      ),
    ),
    (
      "Reliance",
      meta(
        "Reliance",
        "You know when to lean on the AI to speed through execution.",
        "Pair AI drafts with a quick sense-check to keep ownership tight.",
      ),
    ),
    (
      "Trust",
      meta(
        "Trust",
        "You operate with balanced confidence in the AI's responses.",
        "Introduce lightweight validation loops to sustain informed trust.",
      ),
    ),
    (
      "Confidence",
      meta(
        "Confidence",
        "You guide collaborations with AI from a place of informed clarity.",
        "Share quick summaries of how you evaluate AI to reinforce confidence.",
      ),
    ),
  ];
  entries
    .into_iter()
    .map(|(id, m)| (id.to_string(), m))
    .collect()
}
