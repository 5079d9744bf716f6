// localmind - local-first chat and data analysis with optional cloud fallback

pub mod agents;
pub mod analysis;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod models;
pub mod routes;
pub mod settings;  // Well-known settings and cloud overrides
pub mod storage;
pub mod types;
pub mod utils;

use std::sync::Arc;

use tokio::sync::RwLock;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}

/// Open the store, load the analysis engine and restore the transcript
pub async fn build_state(config: Config, adapter: Arc<dyn llm::LLMAdapter>) -> AppResult<AppState> {
    let store = storage::LocalStore::with_path(config.storage.data_dir.clone());
    store.init().await?;

    let processor = analysis::DataProcessor::initialize(&config.analysis);
    let transcript = conversation::Transcript::new(store.list_messages().await);

    Ok(AppState {
        config,
        store,
        processor: Arc::new(processor),
        adapter,
        transcript: Arc::new(RwLock::new(transcript)),
    })
}
