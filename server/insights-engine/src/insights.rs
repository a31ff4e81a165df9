//! Strongest/weakest domain selection, recommendation matching and the
//! rule-based copy shown next to them.

use crate::config::Config;
use crate::types::*;

/// Strongest and weakest domain. The first one seen wins ties; both are `None`
/// for an empty input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainExtremes<'a> {
  pub top: Option<&'a DomainSummary>,
  pub bottom: Option<&'a DomainSummary>,
}

pub fn select_top_and_bottom(summaries: &[DomainSummary]) -> DomainExtremes<'_> {
  let mut top: Option<&DomainSummary> = None;
  let mut bottom: Option<&DomainSummary> = None;
  for s in summaries {
    if top.map_or(true, |t| s.overall > t.overall) {
      top = Some(s);
    }
    if bottom.map_or(true, |b| s.overall < b.overall) {
      bottom = Some(s);
    }
  }
  DomainExtremes { top, bottom }
}

/// First catalog entry for the weakest domain, else the catalog's first entry.
pub fn select_recommendation<'a>(
  summaries: &[DomainSummary],
  catalog: &'a [RecommendationEntry],
) -> Option<&'a RecommendationEntry> {
  let bottom = select_top_and_bottom(summaries).bottom?;
  catalog
    .iter()
    .find(|entry| entry.domain == bottom.domain)
    .or_else(|| catalog.first())
}

/// Drop catalog entries that target excluded domains.
pub fn visible_recommendations(
  catalog: &[RecommendationEntry],
  config: &Config,
) -> Vec<RecommendationEntry> {
  catalog
    .iter()
    .filter(|entry| !config.is_excluded(&entry.domain))
    .cloned()
    .collect()
}

/// Copy for the strongest domain; generic templates when none is curated.
pub fn strength_insight(top: &DomainSummary, config: &Config) -> StrengthInsight {
  let label = config.label_for(&top.domain).to_string();
  let meta = config.meta(&top.domain);
  let strength = meta
    .and_then(|m| m.strength.clone())
    .unwrap_or_else(|| format!("You show consistent progress in {}.", label));
  let stretch = meta
    .and_then(|m| m.stretch.clone())
    .unwrap_or_else(|| {
      format!(
        "Keep exploring new scenarios to reinforce your {} instincts.",
        label
      )
    });
  StrengthInsight {
    domain: top.domain.clone(),
    label,
    strength,
    stretch,
  }
}

/// Stretch copy for the weakest domain.
pub fn growth_insight(bottom: &DomainSummary, config: &Config) -> GrowthInsight {
  let label = config.label_for(&bottom.domain).to_string();
  let message = config
    .meta(&bottom.domain)
    .and_then(|m| m.stretch.clone())
    .unwrap_or_else(|| {
      format!(
        "Capture one takeaway after each session to strengthen {} habits.",
        label
      )
    });
  GrowthInsight {
    domain: bottom.domain.clone(),
    label,
    message,
  }
}

/// Cadence copy for the current window.
pub fn engagement_message(week: &WindowStats, config: &Config) -> &'static str {
  if week.sample_count == 0 {
    "Complete a few reflections this week to unlock cadence insights."
  } else if week.avg_iterations >= config.engagement_iterations_threshold {
    "Your iteration cadence shows thoughtful refinement before closing tasks."
  } else {
    "Layer in one more iteration per task this week to deepen your AI-assisted thinking."
  }
}

pub fn gauge_zone(value: f64) -> GaugeZone {
  let (label, tone) = if !value.is_finite() {
    ("No data yet", GaugeTone::Neutral)
  } else if value >= 80.0 {
    ("High zone", GaugeTone::High)
  } else if value >= 60.0 {
    ("Balanced zone", GaugeTone::Balanced)
  } else if value >= 40.0 {
    ("Moderate zone", GaugeTone::Moderate)
  } else {
    ("Low zone", GaugeTone::Low)
  };
  GaugeZone { label, tone }
}

/// Top `limit` domains by score with friendly labels and integer values.
pub fn ranked_labels(ranked: &[DomainSummary], limit: usize, config: &Config) -> Vec<RankedDomain> {
  ranked
    .iter()
    .take(limit)
    .map(|s| RankedDomain {
      domain: s.domain.clone(),
      label: config.label_for(&s.domain).to_string(),
      value: s.overall.round() as i64,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn summary(domain: &str, overall: f64) -> DomainSummary {
    DomainSummary {
      domain: domain.into(),
      overall,
      likert: Some(overall),
      mcq: None,
      response_count: 1,
    }
  }

  fn hack(id: &str, domain: &str) -> RecommendationEntry {
    RecommendationEntry {
      id: id.into(),
      domain: domain.into(),
      title: format!("{} title", id),
      tip: "tip".into(),
      example: None,
    }
  }

  #[test]
  fn extremes_first_seen_wins_ties() {
    let s = vec![
      summary("A", 50.0),
      summary("B", 90.0),
      summary("C", 90.0),
      summary("D", 10.0),
      summary("E", 10.0),
    ];
    let ex = select_top_and_bottom(&s);
    assert_eq!(ex.top.unwrap().domain, "B");
    assert_eq!(ex.bottom.unwrap().domain, "D");
  }

  #[test]
  fn extremes_empty() {
    let ex = select_top_and_bottom(&[]);
    assert!(ex.top.is_none());
    assert!(ex.bottom.is_none());
  }

  #[test]
  fn single_summary_is_both_top_and_bottom() {
    let s = vec![summary("Only", 42.0)];
    let ex = select_top_and_bottom(&s);
    assert_eq!(ex.top, ex.bottom);
  }

  #[test]
  fn recommendation_matches_weakest_domain() {
    let s = vec![summary("Critical", 80.0), summary("Trust", 20.0)];
    let catalog = vec![hack("h1", "Critical"), hack("h2", "Trust"), hack("h3", "Trust")];
    assert_eq!(select_recommendation(&s, &catalog).unwrap().id, "h2");
  }

  #[test]
  fn recommendation_falls_back_to_first_entry() {
    let s = vec![summary("Deductive", 20.0)];
    let catalog = vec![hack("h1", "Critical"), hack("h2", "Trust")];
    assert_eq!(select_recommendation(&s, &catalog).unwrap().id, "h1");
  }

  #[test]
  fn recommendation_absent_without_data() {
    let catalog = vec![hack("h1", "Critical")];
    assert!(select_recommendation(&[], &catalog).is_none());
    assert!(select_recommendation(&[summary("Critical", 1.0)], &[]).is_none());
  }

  #[test]
  fn excluded_recommendations_are_hidden() {
    let config = Config::default();
    let visible = visible_recommendations(&[hack("h1", "Analogical"), hack("h2", "Trust")], &config);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "h2");
  }

  #[test]
  fn curated_and_fallback_narratives() {
    let config = Config::default();
    let curated = strength_insight(&summary("Critical", 90.0), &config);
    assert_eq!(curated.label, "Critical Thinking");
    assert!(curated.strength.contains("healthy scepticism"));

    let fallback = strength_insight(&summary("Curiosity", 90.0), &config);
    assert_eq!(fallback.strength, "You show consistent progress in Curiosity.");
    assert!(fallback.stretch.contains("Curiosity instincts"));

    let growth = growth_insight(&summary("Curiosity", 5.0), &config);
    assert_eq!(
      growth.message,
      "Capture one takeaway after each session to strengthen Curiosity habits."
    );
    let growth = growth_insight(&summary("Trust", 5.0), &config);
    assert!(growth.message.contains("validation loops"));
  }

  #[test]
  fn engagement_thresholds() {
    let config = Config::default();
    let mut week = WindowStats::default();
    assert!(engagement_message(&week, &config).starts_with("Complete a few"));
    week.sample_count = 2;
    week.avg_iterations = 3.0;
    assert!(engagement_message(&week, &config).starts_with("Your iteration cadence"));
    week.avg_iterations = 2.5;
    assert!(engagement_message(&week, &config).starts_with("Layer in one more"));
  }

  #[test]
  fn gauge_zones() {
    assert_eq!(gauge_zone(85.0).tone, GaugeTone::High);
    assert_eq!(gauge_zone(60.0).tone, GaugeTone::Balanced);
    assert_eq!(gauge_zone(59.99).tone, GaugeTone::Moderate);
    assert_eq!(gauge_zone(0.0).tone, GaugeTone::Low);
    assert_eq!(gauge_zone(f64::NAN).label, "No data yet");
  }

  #[test]
  fn ranked_labels_limit_and_round() {
    let config = Config::default();
    let ranked = vec![summary("Critical", 66.6), summary("Trust", 40.2), summary("X", 1.0)];
    let out = ranked_labels(&ranked, 2, &config);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].label, "Critical Thinking");
    assert_eq!(out[0].value, 67);
    assert_eq!(out[1].value, 40);
  }
}
