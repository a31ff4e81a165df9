//! Reflection Scoring & Insights Engine — deterministic, rule-based.
//!
//! Normalizes survey answers (Likert, single/multi choice) to 0-100 scores,
//! scores each reflection, aggregates by domain, compares this week with the
//! previous one, buckets activity by iteration count and picks the
//! strongest/weakest domain plus a matching recommendation.
//!
//! No DB, no network, no clock; pure computation over caller-supplied snapshots.

pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod format;
pub mod histogram;
pub mod ingest;
pub mod insights;
pub mod normalize;
pub mod score;
pub mod types;
pub mod window;

pub use config::{Config, DomainMeta};
pub use domains::aggregate_domains;
pub use engine::Engine;
pub use error::EngineError;
pub use histogram::build_histogram;
pub use insights::{select_recommendation, select_top_and_bottom};
pub use normalize::normalize;
pub use score::score_record;
pub use types::{DashboardInput, DashboardReport, Question, ReflectionRecord, ScoreBreakdown};
pub use window::compute_window_stats;
