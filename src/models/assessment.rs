use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed questionnaire instance. Immutable once created; a retake
/// inserts a new row and supersedes this one by recency.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assessment {
  pub id: i64,
  /// User id or anonymous session id
  pub user_id: String,
  pub assessment_type: String,
  pub answers_json: String,
  pub sub_scores_json: Option<String>,
  pub completed_at: DateTime<Utc>,
  pub created_at: Option<DateTime<Utc>>,
}

/// For inserting new assessments (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssessment {
  pub user_id: String,
  pub assessment_type: String,
  pub answers_json: String,
  pub sub_scores_json: Option<String>,
  pub completed_at: DateTime<Utc>,
}

/// One stored composite score, attached to its parent assessment
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssessmentScore {
  pub id: i64,
  pub assessment_id: i64,
  pub pillar: String,
  pub topic: String,
  pub score: f64,
  pub scale_max: f64,
  pub severity: String,
  pub computed_at: Option<DateTime<Utc>>,
}
