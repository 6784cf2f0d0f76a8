use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's protocol container. At most one active instance per user,
/// enforced by a partial unique index at the store layer; regeneration
/// reuses the row instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Protocol {
  pub id: i64,
  pub user_id: String,
  pub active: bool,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// One persisted recommendation. Deactivated, never deleted, when a later
/// generation run supersedes it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProtocolItem {
  pub id: i64,
  pub protocol_id: i64,
  pub item_type: String,
  pub name: String,
  pub rationale: Option<String>,
  pub frequency: Option<String>,
  pub time_of_day_json: Option<String>,
  pub priority: String,
  pub source: Option<String>,
  pub active: bool,
  pub created_at: Option<DateTime<Utc>>,
}
