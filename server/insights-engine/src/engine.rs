//! Core engine: scores records and assembles the dashboard report.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::config::Config;
use crate::domains;
use crate::error::EngineError;
use crate::format;
use crate::histogram;
use crate::ingest;
use crate::insights;
use crate::score;
use crate::types::*;
use crate::window;

/// The insights engine. Holds configuration only; every call is pure.
#[derive(Debug, Clone, Default)]
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Score one record's answers.
  pub fn score(
    &self,
    answers: &std::collections::HashMap<String, AnswerValue>,
    catalog: &QuestionCatalog,
  ) -> ScoreBreakdown {
    score::score_record(answers, catalog, &self.config)
  }

  /// Copy records, filling in a score wherever none was stored.
  pub fn enrich(&self, records: &[ReflectionRecord], catalog: &QuestionCatalog) -> Vec<ReflectionRecord> {
    records
      .iter()
      .map(|r| {
        let mut r = r.clone();
        if r.score.is_none() {
          r.score = Some(self.score(&r.answers, catalog));
        }
        r
      })
      .collect()
  }

  /// Build a report using the input's own `now` when present, else `clock`.
  ///
  /// An explicit but malformed `now` is rejected rather than silently replaced.
  pub fn report(&self, input: &DashboardInput, clock: DateTime<Utc>) -> Result<DashboardReport, EngineError> {
    let now = match input.now.as_deref() {
      Some(raw) => ingest::parse_timestamp(raw)
        .map_err(|e| EngineError::validation("now", &e.to_string()))?,
      None => clock,
    };
    Ok(self.report_at(input, now))
  }

  /// Build a report for an explicit reference instant.
  pub fn report_at(&self, input: &DashboardInput, now: DateTime<Utc>) -> DashboardReport {
    let config = &self.config;
    let catalog = catalog_from(&input.questions);
    let (records, skipped_records) = ingest::ingest_records(&input.records);
    let records = self.enrich(&records, &catalog);

    let mut newest_first: Vec<&ReflectionRecord> = records.iter().collect();
    newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let reflections: Vec<ReflectionRecord> = records
      .iter()
      .filter(|r| !r.context.is_baseline())
      .cloned()
      .collect();

    let summaries = domains::aggregate_domains(&records, &catalog, &config.excluded_domains, config);
    let ranked = domains::rank_domains(&summaries);
    let extremes = insights::select_top_and_bottom(&summaries);

    let stats = window::compute_window_stats(&records, now, config.window_days);
    let week = WeekSummary {
      stats,
      delta_tone: window::delta_tone(stats.delta, config),
      delta_display: format::format_delta(stats.delta, config),
    };

    let catalog_visible = insights::visible_recommendations(&input.recommendations, config);
    let recommendation = insights::select_recommendation(&summaries, &catalog_visible).cloned();

    debug!(
      "report: {} records ({} skipped), {} domains, {} in current window",
      records.len(),
      skipped_records,
      summaries.len(),
      stats.sample_count
    );

    DashboardReport {
      report_id: report_id(&records, now),
      generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
      records: newest_first
        .iter()
        .map(|r| RecordScore {
          timestamp: r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
          context: r.context,
          task_id: r.task_id.clone(),
          iterations: r.iterations,
          duration: r.duration,
          score: r.score.unwrap_or_default(),
        })
        .collect(),
      overall_average: window::lifetime_average(&records),
      top_domains: insights::ranked_labels(&ranked, config.top_domains_limit, config),
      strength: extremes.top.map(|t| insights::strength_insight(t, config)),
      growth: extremes.bottom.map(|b| insights::growth_insight(b, config)),
      domains: ranked,
      histogram: histogram::build_histogram(&reflections, config.histogram_max_buckets),
      iterations_average: window::lifetime_iterations(&records),
      recommendation,
      engagement: insights::engagement_message(&stats, config).to_string(),
      gauge: insights::gauge_zone(stats.current_avg),
      week,
      skipped_records,
    }
  }
}

/// Stable id for one input snapshot: hash of `now` plus each record's
/// timestamp and overall score, in input order.
fn report_id(records: &[ReflectionRecord], now: DateTime<Utc>) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(now.to_rfc3339().as_bytes());
  for r in records {
    hasher.update(b"|");
    hasher.update(r.timestamp.to_rfc3339().as_bytes());
    hasher.update(b":");
    let overall = r.score.map(|s| s.overall).unwrap_or(0.0);
    hasher.update(&overall.to_le_bytes());
  }
  let hex = hasher.finalize().to_hex();
  format!("rpt-{}", &hex[..16])
}
