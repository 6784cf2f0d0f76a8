use crate::db::AppState;
use crate::projection::{self, BiologicalAgeProjection, DEFAULT_HORIZONS, OPTIMAL_REFERENCE_SCORE};
use crate::scoring::{
  self, CompassBand, CompositeScore, PercentBand, Pillar, ScoreScale, ScoredAssessment,
  SeverityBand,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tauri::State;

/// ---------------------------------------------------------------------------
/// Pure Scoring Commands
/// ---------------------------------------------------------------------------

/// Score an answer set without storing anything. Unknown assessment types
/// take the neutral fallback path, so this always returns a result.
#[tauri::command]
pub fn score_assessment(
  assessment_type: String,
  answers: HashMap<String, String>,
  prior_answers: Option<HashMap<String, String>>,
) -> ScoredAssessment {
  scoring::score_assessment(&assessment_type, &answers, prior_answers.as_ref())
}

/// Project a sustained score over a set of horizons. Pure; safe to call on
/// every view.
#[tauri::command]
pub fn project_biological_age(
  sustained_score: f64,
  horizons: Option<Vec<u32>>,
  optimal_score: Option<f64>,
) -> Vec<BiologicalAgeProjection> {
  let horizons = horizons.unwrap_or_else(|| DEFAULT_HORIZONS.to_vec());
  projection::project(
    sustained_score,
    &horizons,
    optimal_score.unwrap_or(OPTIMAL_REFERENCE_SCORE),
  )
}

/// ---------------------------------------------------------------------------
/// Assessment Completion Flow
/// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SubmitAssessmentResult {
  pub assessment_id: i64,
  pub scored: ScoredAssessment,
}

/// Score an answer set and store both the immutable assessment row and its
/// computed composite scores.
#[tauri::command]
pub async fn submit_assessment(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  assessment_type: String,
  answers: HashMap<String, String>,
  prior_answers: Option<HashMap<String, String>>,
) -> Result<SubmitAssessmentResult, String> {
  let scored = scoring::score_assessment(&assessment_type, &answers, prior_answers.as_ref());

  let answers_json =
    serde_json::to_string(&answers).map_err(|e| format!("Failed to encode answers: {}", e))?;
  let sub_scores_json = serde_json::to_string(&scored.sub_scores).unwrap_or_default();

  let result = sqlx::query(
    r#"
    INSERT INTO assessments (user_id, assessment_type, answers_json, sub_scores_json, completed_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
  )
  .bind(&user_id)
  .bind(&assessment_type)
  .bind(&answers_json)
  .bind(&sub_scores_json)
  .bind(Utc::now())
  .execute(&state.db)
  .await
  .map_err(|e| format!("Failed to store assessment: {}", e))?;

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
    .execute(&state.db)
    .await
    .map_err(|e| format!("Failed to store score: {}", e))?;
  }

  log::info!(
    "stored {} assessment for {} with {} composites",
    assessment_type,
    user_id,
    scored.composite_scores.len()
  );

  Ok(SubmitAssessmentResult {
    assessment_id,
    scored,
  })
}

/// ---------------------------------------------------------------------------
/// Stored Score Lookup
/// ---------------------------------------------------------------------------

/// One stored composite from the most recent assessment of its type
#[derive(Debug, Clone, Serialize)]
pub struct StoredScore {
  pub assessment_type: String,
  pub pillar: String,
  pub topic: String,
  pub score: f64,
  pub scale_max: f64,
  pub severity: String,
}

/// (pillar, topic, score, scale_max, severity, assessment_type)
pub(crate) type ScoreRow = (String, String, f64, f64, String, String);

/// Composite scores from each type's most recent assessment for a user
pub(crate) async fn latest_score_rows(
  db: &crate::db::DbPool,
  user_id: &str,
) -> Result<Vec<ScoreRow>, sqlx::Error> {
  sqlx::query_as(
    r#"
    SELECT s.pillar, s.topic, s.score, s.scale_max, s.severity, a.assessment_type
    FROM assessment_scores s
    JOIN assessments a ON a.id = s.assessment_id
    WHERE a.user_id = ?1
      AND a.id IN (
        SELECT MAX(id) FROM assessments WHERE user_id = ?1 GROUP BY assessment_type
      )
    ORDER BY s.id
    "#,
  )
  .bind(user_id)
  .fetch_all(db)
  .await
}

/// Rebuild a typed composite from a stored score row. The band is
/// reclassified from the score so a stale stored label can never disagree
/// with current thresholds.
pub(crate) fn composite_from_stored(
  pillar: &str,
  topic: &str,
  score: f64,
  scale_max: f64,
) -> CompositeScore {
  let (scale, band) = if scale_max == ScoreScale::FivePoint.ceiling() {
    (
      ScoreScale::FivePoint,
      SeverityBand::Compass(CompassBand::classify(score)),
    )
  } else {
    (
      ScoreScale::Percent,
      SeverityBand::Percent(PercentBand::classify(score)),
    )
  };

  CompositeScore {
    pillar: Pillar::parse(pillar).unwrap_or(Pillar::Body),
    topic: topic.to_string(),
    score,
    scale,
    band,
  }
}

#[tauri::command]
pub async fn get_latest_scores(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<Vec<StoredScore>, String> {
  let rows = latest_score_rows(&state.db, &user_id)
    .await
    .map_err(|e| format!("Failed to fetch scores: {}", e))?;

  Ok(
    rows
      .into_iter()
      .map(
        |(pillar, topic, score, scale_max, severity, assessment_type)| StoredScore {
          assessment_type,
          pillar,
          topic,
          score,
          scale_max,
          severity,
        },
      )
      .collect(),
  )
}

/// ---------------------------------------------------------------------------
/// Biological Age
/// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BiologicalAgeSummary {
  pub sustained_score: f64,
  pub projections: Vec<BiologicalAgeProjection>,
}

/// Project the user's sustained overall score over the default horizons.
/// The sustained score is the average of the most recent composite per
/// assessment type, compass scores rescaled onto 0-100.
#[tauri::command]
pub async fn get_biological_age(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<BiologicalAgeSummary, String> {
  let rows = latest_score_rows(&state.db, &user_id)
    .await
    .map_err(|e| format!("Failed to fetch scores: {}", e))?;

  let composites: Vec<CompositeScore> = rows
    .iter()
    .map(|(pillar, topic, score, scale_max, _, _)| {
      composite_from_stored(pillar, topic, *score, *scale_max)
    })
    .collect();

  let sustained_score = scoring::overall_score(&composites)
    .ok_or_else(|| "No assessment data yet - complete an assessment first".to_string())?;

  Ok(BiologicalAgeSummary {
    sustained_score,
    projections: projection::project(
      sustained_score,
      &DEFAULT_HORIZONS,
      OPTIMAL_REFERENCE_SCORE,
    ),
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::*;
  use serial_test::serial;
  use tauri::Manager;

  fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
      .iter()
      .map(|(q, o)| (q.to_string(), o.to_string()))
      .collect()
  }

  #[test]
  fn test_score_assessment_command_is_pure() {
    let scored = score_assessment(
      "sleep-symptom".to_string(),
      answers(&[("sleep_quality", "poor")]),
      None,
    );
    assert_eq!(scored.composite_scores.len(), 1);
  }

  #[test]
  fn test_project_command_defaults() {
    let projections = project_biological_age(42.0, None, None);
    assert_eq!(projections.len(), DEFAULT_HORIZONS.len());
    assert_eq!(projections[0].current_impact_years, 2.5);
  }

  #[tokio::test]
  #[serial]
  async fn test_submit_assessment_stores_scores() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    let result = submit_assessment(
      app.state(),
      "user-1".to_string(),
      "sleep-symptom".to_string(),
      answers(&[
        ("sleep_quality", "poor"),
        ("fall_asleep", "over_60_min"),
        ("night_wakings", "three_or_more"),
        ("morning_rested", "exhausted"),
      ]),
      None,
    )
    .await
    .unwrap();

    assert!(result.assessment_id > 0);

    let scores = get_latest_scores(app.state(), "user-1".to_string())
      .await
      .unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].topic, "sleep");
    assert_eq!(scores[0].severity, "poor");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_latest_scores_take_most_recent_per_type() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    seed_poor_sleep_assessment(&pool, "user-1").await;
    // Retake with good answers supersedes the poor instance.
    seed_assessment(
      &pool,
      "user-1",
      "sleep-symptom",
      &[
        ("sleep_quality", "excellent"),
        ("fall_asleep", "under_15_min"),
        ("night_wakings", "never"),
        ("morning_rested", "rested"),
      ],
    )
    .await;

    let scores = get_latest_scores(app.state(), "user-1".to_string())
      .await
      .unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].severity, "excellent");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_get_biological_age_requires_data() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    let result = get_biological_age(app.state(), "user-1".to_string()).await;
    assert!(result.is_err());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_get_biological_age_with_seeded_scores() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    seed_poor_sleep_assessment(&pool, "user-1").await;

    let summary = get_biological_age(app.state(), "user-1".to_string())
      .await
      .unwrap();
    // A single poor sleep score keeps the sustained score below 60, which
    // clamps to the worst base impact.
    assert!(summary.sustained_score < 60.0);
    assert_eq!(summary.projections.len(), 4);
    assert!(summary.projections[0].current_impact_years > 0.0);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_composite_from_stored_picks_scale_by_ceiling() {
    let percent = composite_from_stored("body", "sleep", 22.0, 100.0);
    assert_eq!(percent.band.label(), "poor");

    let compass = composite_from_stored("balance", "hot-flashes", 1.2, 5.0);
    assert_eq!(compass.band.label(), "critical");
  }
}
