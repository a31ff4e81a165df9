//! Display helpers for report consumers.

use crate::config::Config;
use crate::types::Tone;
use crate::window::delta_tone;

/// `"42%"`, or an em dash for missing/NaN values.
pub fn format_percent(value: Option<f64>, precision: usize) -> String {
  match value {
    Some(v) if !v.is_nan() => format!("{:.*}%", precision, v),
    _ => "\u{2014}".to_string(),
  }
}

/// One decimal with an explicit `+`; `"0.0"` when the change is negligible.
pub fn format_delta(delta: f64, config: &Config) -> String {
  match delta_tone(delta, config) {
    Tone::Neutral => "0.0".to_string(),
    Tone::Positive => format!("+{:.1}", delta),
    Tone::Negative => format!("{:.1}", delta),
  }
}

pub fn format_duration(seconds: u64) -> String {
  if seconds == 0 {
    return "0 m".to_string();
  }
  let hrs = seconds / 3600;
  let mins = (seconds % 3600) / 60;
  let secs = seconds % 60;
  if hrs > 0 {
    format!("{} hr {} m", hrs, mins)
  } else if mins > 0 {
    format!("{} min", mins)
  } else {
    format!("{}s", secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percent() {
    assert_eq!(format_percent(Some(66.666), 0), "67%");
    assert_eq!(format_percent(Some(66.666), 1), "66.7%");
    assert_eq!(format_percent(None, 0), "\u{2014}");
    assert_eq!(format_percent(Some(f64::NAN), 0), "\u{2014}");
  }

  #[test]
  fn delta() {
    let config = Config::default();
    assert_eq!(format_delta(20.0, &config), "+20.0");
    assert_eq!(format_delta(-3.26, &config), "-3.3");
    assert_eq!(format_delta(0.049, &config), "0.0");
    assert_eq!(format_delta(f64::INFINITY, &config), "0.0");
  }

  #[test]
  fn duration() {
    assert_eq!(format_duration(0), "0 m");
    assert_eq!(format_duration(42), "42s");
    assert_eq!(format_duration(125), "2 min");
    assert_eq!(format_duration(3_900), "1 hr 5 m");
  }
}
