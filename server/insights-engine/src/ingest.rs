//! Turn inbound results-store rows into canonical `ReflectionRecord`s.
//!
//! A row that cannot be read or placed in time is dropped (and counted), never fatal.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::error::EngineError;
use crate::types::*;

/// Parse a timestamp: RFC 3339 first, then naive ISO-8601 read as UTC
/// (the results store writes local `isoformat()` without an offset).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, EngineError> {
  let s = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
    .map(|naive| naive.and_utc())
    .map_err(|e| EngineError::parse(format!("timestamp {:?}: {}", raw, e)))
}

/// Convert one inbound row.
pub fn ingest_record(raw: &InboundRecord) -> Result<ReflectionRecord, EngineError> {
  let timestamp = parse_timestamp(&raw.timestamp)?;
  Ok(ReflectionRecord {
    timestamp,
    context: RecordContext::from_str_loose(raw.context.as_deref()),
    task_id: raw.task_id.clone(),
    answers: raw.answers.clone(),
    iterations: raw.iterations.unwrap_or(0),
    duration: raw.duration.unwrap_or(0),
    score: raw.score,
  })
}

/// Convert one records-list entry; a malformed entry reports why it failed.
pub fn ingest_row(row: &InboundRow) -> Result<ReflectionRecord, EngineError> {
  match row {
    InboundRow::Record(raw) => ingest_record(raw),
    InboundRow::Malformed(value) => match serde_json::from_value::<InboundRecord>(value.clone()) {
      Ok(raw) => ingest_record(&raw),
      Err(e) => Err(e.into()),
    },
  }
}

/// Convert all rows, returning the accepted records and the number skipped.
pub fn ingest_records(rows: &[InboundRow]) -> (Vec<ReflectionRecord>, usize) {
  let mut records = Vec::with_capacity(rows.len());
  let mut skipped = 0;
  for (idx, row) in rows.iter().enumerate() {
    match ingest_row(row) {
      Ok(r) => records.push(r),
      Err(e) => {
        warn!("skipping record #{}: {}", idx, e);
        skipped += 1;
      }
    }
  }
  (records, skipped)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use serde_json::json;

  fn record(value: serde_json::Value) -> InboundRecord {
    serde_json::from_value(value).unwrap()
  }

  fn row(value: serde_json::Value) -> InboundRow {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn parses_rfc3339_and_naive_iso() {
    let expected = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
    assert_eq!(parse_timestamp("2025-01-15T10:30:00Z").unwrap(), expected);
    assert_eq!(parse_timestamp("2025-01-15T12:30:00+02:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2025-01-15T10:30:00").unwrap(), expected);
    let frac = parse_timestamp("2025-01-15T10:30:00.123456").unwrap();
    assert_eq!(frac.timestamp(), expected.timestamp());
  }

  #[test]
  fn rejects_garbage_timestamp() {
    let err = parse_timestamp("yesterday").unwrap_err();
    assert!(err.to_string().contains("timestamp"));
  }

  #[test]
  fn defaults_missing_activity_fields() {
    let rec = ingest_record(&record(json!({ "timestamp": "2025-01-15T10:30:00Z" }))).unwrap();
    assert_eq!(rec.iterations, 0);
    assert_eq!(rec.duration, 0);
    assert_eq!(rec.context, RecordContext::Reflection);
    assert!(rec.answers.is_empty());
    assert!(rec.score.is_none());
  }

  #[test]
  fn null_fields_and_baseline_context() {
    let raw: InboundRecord = serde_json::from_str(
      r#"{"timestamp":"2025-01-15T10:30:00","context":"baseline","answers":null,"iterations":null,"duration":null,"score":null}"#,
    )
    .unwrap();
    let rec = ingest_record(&raw).unwrap();
    assert!(rec.context.is_baseline());
    assert_eq!(rec.iterations, 0);
    assert!(rec.answers.is_empty());
    assert!(rec.score.is_none());
  }

  #[test]
  fn loose_activity_values_are_coerced() {
    let rec = ingest_record(&record(json!({
      "timestamp": "2025-01-15T10:30:00Z",
      "iterations": -1,
      "duration": 12.9,
      "task_id": 42,
      "score": {"overall": "high"}
    })))
    .unwrap();
    assert_eq!(rec.iterations, 0);
    assert_eq!(rec.duration, 12);
    assert!(rec.task_id.is_none());
    assert!(rec.score.is_none());

    let rec = ingest_record(&record(json!({
      "timestamp": "2025-01-15T10:30:00Z",
      "iterations": "3",
      "duration": 1e30
    })))
    .unwrap();
    assert_eq!(rec.iterations, 3);
    assert_eq!(rec.duration, u64::MAX);
  }

  #[test]
  fn bad_rows_are_counted_not_fatal() {
    let rows = vec![
      row(json!({ "timestamp": "2025-01-15T10:30:00Z" })),
      row(json!({ "timestamp": "nope" })),
      row(json!({ "answers": {"q1": 3} })),
      row(json!({ "timestamp": "2025-01-15T11:00:00Z", "answers": "oops" })),
      row(json!(42)),
      row(json!({ "timestamp": "2025-01-16T08:00:00", "duration": 12.5 })),
    ];
    assert!(matches!(rows[2], InboundRow::Malformed(_)));
    assert!(matches!(rows[4], InboundRow::Malformed(_)));

    let (records, skipped) = ingest_records(&rows);
    assert_eq!(records.len(), 2);
    assert_eq!(skipped, 4);
    assert_eq!(records[1].duration, 12);
  }

  #[test]
  fn malformed_row_reports_its_shape_error() {
    let err = ingest_row(&row(json!({ "answers": {} }))).unwrap_err();
    assert!(matches!(err, EngineError::Json(_)));
    assert!(err.to_string().contains("timestamp"));
  }
}
