mod catalog;
mod commands;
mod db;
mod llm;
mod models;
mod projection;
mod protocol;
mod scoring;
#[cfg(test)]
mod test_utils;

use db::AppState;
use std::sync::Arc;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  env_logger::try_init().ok();

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(|app| {
      // Initialize database
      let app_handle = app.handle().clone();
      tauri::async_runtime::block_on(async move {
        match db::initialize_db(&app_handle).await {
          Ok(pool) => {
            let state = Arc::new(AppState { db: pool });
            app_handle.manage(state);
            log::info!("Database ready");
          }
          Err(e) => {
            log::error!("Failed to initialize database: {}", e);
          }
        }
      });
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      commands::get_assessments,
      // Scoring commands
      commands::scoring::score_assessment,
      commands::scoring::submit_assessment,
      commands::scoring::get_latest_scores,
      commands::scoring::project_biological_age,
      commands::scoring::get_biological_age,
      // Protocol commands
      commands::protocol::generate_protocol,
      commands::protocol::get_active_protocol,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
