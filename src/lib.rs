pub mod commands;
pub mod config;
pub mod core_state;
pub mod remote;
pub mod workflow;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("CohortGen starting v{}", config::APP_VERSION);
    tracing::info!(api = %config::api_base_url(), "Processing service endpoint");

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(Arc::new(core_state::CoreState::new()))
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::workflow::get_workflow,
            commands::workflow::select_file,
            commands::workflow::clear_file,
            commands::workflow::set_disease_name,
            commands::workflow::set_source_url,
            commands::workflow::submit_workflow,
            commands::workflow::download_result,
            commands::workflow::download_template,
        ])
        .run(tauri::generate_context!())
        .expect("error while running CohortGen");
}
