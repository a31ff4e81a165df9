//! Weekly window statistics: current vs previous window averages, delta, cadence.

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::types::*;

/// Compare the window ending at `now` with the one before it.
///
/// Baseline records are ignored. Current window: `ts >= now - window`;
/// previous: `now - 2*window <= ts < now - window`. Averages only count records
/// with a score and fall back to 0. Duration, iterations and sample count
/// describe the current window only.
pub fn compute_window_stats(
  records: &[ReflectionRecord],
  now: DateTime<Utc>,
  window_days: i64,
) -> WindowStats {
  let start_current = window_start(now, window_days);
  let start_previous = window_start(now, window_days.saturating_mul(2));

  let reflections = records.iter().filter(|r| !r.context.is_baseline());
  let (current, previous): (Vec<&ReflectionRecord>, Vec<&ReflectionRecord>) = reflections
    .filter(|r| r.timestamp >= start_previous)
    .partition(|r| r.timestamp >= start_current);

  let current_avg = average_overall(&current);
  let previous_avg = average_overall(&previous);

  let total_duration_seconds: u64 = current.iter().map(|r| r.duration).sum();
  let avg_iterations = if current.is_empty() {
    0.0
  } else {
    current.iter().map(|r| r.iterations as f64).sum::<f64>() / current.len() as f64
  };

  WindowStats {
    current_avg,
    previous_avg,
    delta: current_avg - previous_avg,
    total_duration_seconds,
    avg_iterations,
    sample_count: current.len(),
  }
}

/// `now - days`, saturating at the earliest representable instant.
fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
  Duration::try_days(days)
    .and_then(|span| now.checked_sub_signed(span))
    .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn average_overall(records: &[&ReflectionRecord]) -> f64 {
  let scored: Vec<f64> = records
    .iter()
    .filter_map(|r| r.score.map(|s| s.overall))
    .collect();
  if scored.is_empty() {
    0.0
  } else {
    scored.iter().sum::<f64>() / scored.len() as f64
  }
}

/// Direction of a delta; small or non-finite deltas read as no change.
pub fn delta_tone(delta: f64, config: &Config) -> Tone {
  if !delta.is_finite() || delta.abs() < config.delta_epsilon {
    Tone::Neutral
  } else if delta > 0.0 {
    Tone::Positive
  } else {
    Tone::Negative
  }
}

/// Mean `score.overall` over every record (baseline included); scoreless records count as 0.
pub fn lifetime_average(records: &[ReflectionRecord]) -> f64 {
  if records.is_empty() {
    return 0.0;
  }
  let total: f64 = records
    .iter()
    .map(|r| r.score.map(|s| s.overall).unwrap_or(0.0))
    .sum();
  total / records.len() as f64
}

/// Mean iterations over all non-baseline records.
pub fn lifetime_iterations(records: &[ReflectionRecord]) -> f64 {
  let reflections: Vec<u32> = records
    .iter()
    .filter(|r| !r.context.is_baseline())
    .map(|r| r.iterations)
    .collect();
  if reflections.is_empty() {
    0.0
  } else {
    reflections.iter().map(|&i| i as f64).sum::<f64>() / reflections.len() as f64
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
  }

  fn rec(days_ago: i64, overall: Option<f64>, iterations: u32, duration: u64) -> ReflectionRecord {
    ReflectionRecord {
      timestamp: now() - Duration::days(days_ago),
      context: RecordContext::Reflection,
      task_id: None,
      answers: Default::default(),
      iterations,
      duration,
      score: overall.map(|o| ScoreBreakdown {
        overall: o,
        ..ScoreBreakdown::default()
      }),
    }
  }

  #[test]
  fn current_vs_previous_week() {
    let records = vec![
      rec(1, Some(80.0), 2, 600),
      rec(3, Some(60.0), 4, 300),
      rec(9, Some(50.0), 1, 900),
      rec(30, Some(10.0), 9, 900),
    ];
    let stats = compute_window_stats(&records, now(), 7);
    assert_eq!(stats.current_avg, 70.0);
    assert_eq!(stats.previous_avg, 50.0);
    assert_eq!(stats.delta, 20.0);
    assert_eq!(stats.total_duration_seconds, 900);
    assert_eq!(stats.avg_iterations, 3.0);
    assert_eq!(stats.sample_count, 2);
  }

  #[test]
  fn empty_or_baseline_only_is_all_zero() {
    let stats = compute_window_stats(&[], now(), 7);
    assert_eq!(stats, WindowStats::default());

    let mut baseline = rec(1, Some(90.0), 3, 100);
    baseline.context = RecordContext::Baseline;
    let stats = compute_window_stats(&[baseline], now(), 7);
    assert_eq!(stats.sample_count, 0);
    assert_eq!(stats.current_avg, 0.0);
    assert_eq!(stats.total_duration_seconds, 0);
  }

  #[test]
  fn window_boundaries_are_half_open() {
    let exactly_week = rec(7, Some(40.0), 0, 0);
    let exactly_two_weeks = rec(14, Some(20.0), 0, 0);
    let stats = compute_window_stats(&[exactly_week, exactly_two_weeks], now(), 7);
    // ts == now - 7d is current; ts == now - 14d is previous.
    assert_eq!(stats.sample_count, 1);
    assert_eq!(stats.current_avg, 40.0);
    assert_eq!(stats.previous_avg, 20.0);
  }

  #[test]
  fn scoreless_records_count_as_samples_but_not_in_average() {
    let records = vec![rec(1, Some(60.0), 1, 0), rec(2, None, 3, 0)];
    let stats = compute_window_stats(&records, now(), 7);
    assert_eq!(stats.current_avg, 60.0);
    assert_eq!(stats.sample_count, 2);
    assert_eq!(stats.avg_iterations, 2.0);
  }

  #[test]
  fn future_records_land_in_current_window() {
    let stats = compute_window_stats(&[rec(-2, Some(30.0), 1, 10)], now(), 7);
    assert_eq!(stats.sample_count, 1);
  }

  #[test]
  fn huge_window_saturates_instead_of_panicking() {
    let records = vec![rec(1, Some(80.0), 1, 0), rec(5_000, Some(20.0), 1, 0)];
    let stats = compute_window_stats(&records, now(), 200_000_000);
    assert_eq!(stats.sample_count, 2);
    assert_eq!(stats.current_avg, 50.0);
    assert_eq!(stats.previous_avg, 0.0);

    let stats = compute_window_stats(&records, now(), i64::MAX);
    assert_eq!(stats.sample_count, 2);
  }

  #[test]
  fn delta_tone_uses_epsilon() {
    let config = Config::default();
    assert_eq!(delta_tone(0.04, &config), Tone::Neutral);
    assert_eq!(delta_tone(-0.04, &config), Tone::Neutral);
    assert_eq!(delta_tone(f64::NAN, &config), Tone::Neutral);
    assert_eq!(delta_tone(1.5, &config), Tone::Positive);
    assert_eq!(delta_tone(-2.0, &config), Tone::Negative);
  }

  #[test]
  fn lifetime_averages() {
    let mut baseline = rec(40, Some(30.0), 8, 0);
    baseline.context = RecordContext::Baseline;
    let records = vec![rec(1, Some(90.0), 2, 0), rec(2, None, 4, 0), baseline];
    assert_eq!(lifetime_average(&records), 40.0);
    assert_eq!(lifetime_iterations(&records), 3.0);
    assert_eq!(lifetime_average(&[]), 0.0);
    assert_eq!(lifetime_iterations(&[]), 0.0);
  }
}
