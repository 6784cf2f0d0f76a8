pub mod protocol;
pub mod scoring;

use crate::db::AppState;
use crate::models::Assessment;
use std::sync::Arc;
use tauri::State;

#[tauri::command]
pub async fn get_assessments(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<Vec<Assessment>, String> {
  sqlx::query_as::<_, Assessment>(
    "SELECT * FROM assessments WHERE user_id = ?1 ORDER BY completed_at DESC LIMIT 50",
  )
  .bind(&user_id)
  .fetch_all(&state.db)
  .await
  .map_err(|e| format!("Failed to fetch assessments: {}", e))
}
