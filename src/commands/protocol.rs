use crate::db::AppState;
use crate::llm::AugmentationClient;
use crate::models::{Protocol, ProtocolItem};
use crate::protocol::{build_local_protocol, merge_augmentation, MergedItem};
use serde::Serialize;
use std::sync::Arc;
use tauri::State;
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

/// User-visible generation failures. Everything else (including augmentation
/// trouble) is recovered internally.
#[derive(Debug, Error, Serialize)]
pub enum ProtocolError {
  #[error("No assessment data yet - complete an assessment first")]
  NoAssessmentData,

  #[error("Could not save protocol - try again: {0}")]
  Persistence(String),
}

/// ---------------------------------------------------------------------------
/// Protocol Generation
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateProtocolResult {
  pub protocol_id: i64,
  pub item_count: usize,
  pub focus_areas: Vec<String>,
}

/// Generate (or regenerate) the user's protocol from their most recent
/// assessment per type.
///
/// The local pipeline always completes on its own; augmentation is layered
/// on best-effort and persistence is the only step allowed to fail the call.
#[tauri::command]
pub async fn generate_protocol(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<GenerateProtocolResult, ProtocolError> {
  let rows = super::scoring::latest_score_rows(&state.db, &user_id)
    .await
    .map_err(|e| ProtocolError::Persistence(e.to_string()))?;

  if rows.is_empty() {
    return Err(ProtocolError::NoAssessmentData);
  }

  let composites: Vec<_> = rows
    .iter()
    .map(|(pillar, topic, score, scale_max, _, _)| {
      super::scoring::composite_from_stored(pillar, topic, *score, *scale_max)
    })
    .collect();

  let (focus_areas, mut items) = build_local_protocol(&composites);

  // Best-effort augmentation. A missing key, timeout or malformed response
  // leaves the locally computed list untouched.
  if !focus_areas.is_empty() {
    match AugmentationClient::from_env() {
      Ok(client) => {
        let focus_lines: Vec<String> = focus_areas.iter().map(|f| f.describe()).collect();
        let current: Vec<String> = items
          .iter()
          .map(|i| format!("{}: {}", i.item_type.as_str(), i.name))
          .collect();
        let outcome = client.suggest_protocol_items(&focus_lines, &current).await;
        let appended = merge_augmentation(&mut items, outcome);
        if appended > 0 {
          log::info!("augmentation added {} items", appended);
        }
      }
      Err(e) => log::warn!("augmentation skipped: {}", e),
    }
  }

  let protocol_id = persist_protocol(&state.db, &user_id, &items)
    .await
    .map_err(|e| ProtocolError::Persistence(e.to_string()))?;

  log::info!(
    "generated protocol {} for {}: {} items across {} focus areas",
    protocol_id,
    user_id,
    items.len(),
    focus_areas.len()
  );

  Ok(GenerateProtocolResult {
    protocol_id,
    item_count: items.len(),
    focus_areas: focus_areas.iter().map(|f| f.describe()).collect(),
  })
}

/// Deactivate-then-insert as one transaction. A failed insert rolls the
/// deactivation back, so the store never shows zero active items when a
/// prior generation existed.
async fn persist_protocol(
  db: &crate::db::DbPool,
  user_id: &str,
  items: &[MergedItem],
) -> Result<i64, sqlx::Error> {
  let mut tx = db.begin().await?;

  let existing: Option<(i64,)> =
    sqlx::query_as("SELECT id FROM protocols WHERE user_id = ?1 AND active = 1")
      .bind(user_id)
      .fetch_optional(&mut *tx)
      .await?;

  let protocol_id = match existing {
    Some((id,)) => {
      sqlx::query("UPDATE protocols SET updated_at = CURRENT_TIMESTAMP WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
      id
    }
    None => {
      let result = sqlx::query("INSERT INTO protocols (user_id) VALUES (?1)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
      result.last_insert_rowid()
    }
  };

  sqlx::query("UPDATE protocol_items SET active = 0 WHERE protocol_id = ?1 AND active = 1")
    .bind(protocol_id)
    .execute(&mut *tx)
    .await?;

  for item in items {
    let time_of_day_json = serde_json::to_string(&item.time_of_day).unwrap_or_default();
    sqlx::query(
      r#"
      INSERT INTO protocol_items (
        protocol_id, item_type, name, rationale, frequency,
        time_of_day_json, priority, source
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      "#,
    )
    .bind(protocol_id)
    .bind(item.item_type.as_str())
    .bind(&item.name)
    .bind(&item.rationale)
    .bind(&item.frequency)
    .bind(&time_of_day_json)
    .bind(item.priority.as_str())
    .bind(&item.source)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;
  Ok(protocol_id)
}

/// ---------------------------------------------------------------------------
/// Active Protocol Lookup
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ActiveProtocol {
  pub protocol: Protocol,
  pub items: Vec<ProtocolItem>,
}

#[tauri::command]
pub async fn get_active_protocol(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<Option<ActiveProtocol>, String> {
  let protocol: Option<Protocol> =
    sqlx::query_as("SELECT * FROM protocols WHERE user_id = ?1 AND active = 1")
      .bind(&user_id)
      .fetch_optional(&state.db)
      .await
      .map_err(|e| format!("Failed to fetch protocol: {}", e))?;

  let Some(protocol) = protocol else {
    return Ok(None);
  };

  let items: Vec<ProtocolItem> = sqlx::query_as(
    "SELECT * FROM protocol_items WHERE protocol_id = ?1 AND active = 1 ORDER BY id",
  )
  .bind(protocol.id)
  .fetch_all(&state.db)
  .await
  .map_err(|e| format!("Failed to fetch protocol items: {}", e))?;

  Ok(Some(ActiveProtocol { protocol, items }))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::*;
  use serial_test::serial;
  use std::collections::HashSet;
  use tauri::Manager;

  async fn active_item_keys(pool: &sqlx::SqlitePool) -> HashSet<(String, String)> {
    let rows: Vec<(String, String)> =
      sqlx::query_as("SELECT item_type, name FROM protocol_items WHERE active = 1")
        .fetch_all(pool)
        .await
        .expect("Failed to fetch active items");
    rows.into_iter().collect()
  }

  #[tokio::test]
  #[serial]
  async fn test_generate_without_assessments_is_typed_error() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    std::env::remove_var("ANTHROPIC_API_KEY");
    let result = generate_protocol(app.state(), "user-1".to_string()).await;
    assert!(matches!(result, Err(ProtocolError::NoAssessmentData)));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_generate_succeeds_when_augmentation_is_unavailable() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    seed_poor_sleep_assessment(&pool, "user-1").await;

    // With no API key configured every augmentation attempt fails; the
    // locally resolved list must come through unchanged.
    std::env::remove_var("ANTHROPIC_API_KEY");
    let result = generate_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap();

    assert!(result.item_count >= 2);
    assert!(result
      .focus_areas
      .iter()
      .any(|f| f.starts_with("sleep: poor")));

    let keys = active_item_keys(&pool).await;
    assert!(keys.contains(&("supplement".to_string(), "Magnesium Glycinate".to_string())));
    assert!(keys
      .iter()
      .any(|(t, n)| t == "habit" && n.contains("Sleep Hygiene")));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_regeneration_is_idempotent_by_item_identity() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    seed_poor_sleep_assessment(&pool, "user-1").await;
    seed_critical_hormone_assessment(&pool, "user-1").await;

    std::env::remove_var("ANTHROPIC_API_KEY");
    let first = generate_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap();
    let first_keys = active_item_keys(&pool).await;

    let second = generate_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap();
    let second_keys = active_item_keys(&pool).await;

    // Same protocol row, same (type, name) identity, new underlying rows.
    assert_eq!(first.protocol_id, second.protocol_id);
    assert_eq!(first_keys, second_keys);

    let total_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM protocol_items")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(total_rows as usize, first.item_count + second.item_count);

    let protocol_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM protocols")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(protocol_count, 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_regeneration_deactivates_superseded_items() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    seed_poor_sleep_assessment(&pool, "user-1").await;

    std::env::remove_var("ANTHROPIC_API_KEY");
    let first = generate_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap();

    // The user retakes the assessment with healthy answers; the new
    // generation has nothing to recommend and the old items go inactive.
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

    let second = generate_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap();
    assert_eq!(second.item_count, 0);
    assert!(second.focus_areas.is_empty());

    let active: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM protocol_items WHERE active = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(active, 0);

    let inactive: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM protocol_items WHERE active = 0")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(inactive as usize, first.item_count);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_items_from_urgent_sources_are_immediate() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    seed_poor_sleep_assessment(&pool, "user-1").await;

    std::env::remove_var("ANTHROPIC_API_KEY");
    generate_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap();

    let priorities: Vec<(String,)> =
      sqlx::query_as("SELECT DISTINCT priority FROM protocol_items WHERE active = 1")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(priorities, vec![("immediate".to_string(),)]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_get_active_protocol_round_trip() {
    let pool = setup_test_db().await;
    let state = Arc::new(AppState { db: pool.clone() });
    let app = tauri::test::mock_app();
    app.manage(state);

    assert!(get_active_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap()
      .is_none());

    seed_poor_sleep_assessment(&pool, "user-1").await;
    std::env::remove_var("ANTHROPIC_API_KEY");
    let generated = generate_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap();

    let active = get_active_protocol(app.state(), "user-1".to_string())
      .await
      .unwrap()
      .expect("expected an active protocol");

    assert_eq!(active.protocol.id, generated.protocol_id);
    assert_eq!(active.items.len(), generated.item_count);
    assert!(active.items.iter().all(|i| i.active));

    teardown_test_db(pool).await;
  }
}
