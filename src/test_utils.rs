//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Assessment seed helpers
//! - Mock data factories
//! - Helper assertions

use crate::scoring::{self, CompositeScore, Pillar, ScoreScale};
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Assessment Seed Helpers
/// ---------------------------------------------------------------------------

/// Score and insert one assessment the same way the submit flow does.
/// Returns the new assessment id.
pub async fn seed_assessment(
  pool: &SqlitePool,
  user_id: &str,
  assessment_type: &str,
  answers: &[(&str, &str)],
) -> i64 {
  let answers_map: HashMap<String, String> = answers
    .iter()
    .map(|(q, o)| (q.to_string(), o.to_string()))
    .collect();

  let scored = scoring::score_assessment(assessment_type, &answers_map, None);

  let result = sqlx::query(
    r#"
    INSERT INTO assessments (user_id, assessment_type, answers_json, sub_scores_json, completed_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
  )
  .bind(user_id)
  .bind(assessment_type)
  .bind(serde_json::to_string(&answers_map).unwrap())
  .bind(serde_json::to_string(&scored.sub_scores).unwrap())
  .bind(Utc::now())
  .execute(pool)
  .await
  .expect("Failed to insert test assessment");

  let assessment_id = result.last_insert_rowid();

  for composite in &scored.composite_scores {
    sqlx::query(
      r#"
      INSERT INTO assessment_scores (assessment_id, pillar, topic, score, scale_max, severity)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
    )
    .bind(assessment_id)
    .bind(composite.pillar.as_str())
    .bind(&composite.topic)
    .bind(composite.score)
    .bind(composite.scale.ceiling())
    .bind(composite.band.label())
    .execute(pool)
    .await
    .expect("Failed to insert test score");
  }

  assessment_id
}

/// Seed a sleep assessment scoring deep in the poor band
pub async fn seed_poor_sleep_assessment(pool: &SqlitePool, user_id: &str) -> i64 {
  seed_assessment(
    pool,
    user_id,
    "sleep-symptom",
    &[
      ("sleep_quality", "poor"),
      ("fall_asleep", "over_60_min"),
      ("night_wakings", "three_or_more"),
      ("morning_rested", "exhausted"),
    ],
  )
  .await
}

/// Seed a hormone compass assessment with critical hot flashes
pub async fn seed_critical_hormone_assessment(pool: &SqlitePool, user_id: &str) -> i64 {
  seed_assessment(
    pool,
    user_id,
    "hormone-compass",
    &[
      ("hot_flash_frequency", "several_daily"),
      ("night_sweats", "frequently"),
      ("mood_swings", "daily"),
      ("energy_level", "low_afternoons"),
    ],
  )
  .await
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Create a mock percent-scale composite score for testing
pub fn mock_percent_score(topic: &str, score: f64) -> CompositeScore {
  use crate::scoring::{PercentBand, SeverityBand};
  CompositeScore {
    pillar: Pillar::Body,
    topic: topic.to_string(),
    score,
    scale: ScoreScale::Percent,
    band: SeverityBand::Percent(PercentBand::classify(score)),
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify key tables exist
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('assessments', 'assessment_scores', 'protocols', 'protocol_items')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_assessment_inserts_scores() {
    let pool = setup_test_db().await;

    let id = seed_poor_sleep_assessment(&pool, "user-1").await;
    assert!(id > 0);

    let score_count: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM assessment_scores WHERE assessment_id = ?1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .expect("Failed to count scores");
    assert_eq!(score_count, 1);

    let severity: String =
      sqlx::query_scalar("SELECT severity FROM assessment_scores WHERE assessment_id = ?1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .expect("Failed to fetch severity");
    assert_eq!(severity, "poor");

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let score = mock_percent_score("sleep", 22.0);
    assert_eq!(score.topic, "sleep");
    assert_eq!(score.band.label(), "poor");
  }
}
