//! Subcommand implementations and the start-up wiring they share.

pub mod ask;
pub mod history;
pub mod serve;
pub mod sessions;
pub mod status;

use helpdesk_assistant::{ContextWindow, PromptAssembler, SupportAssistant};
use helpdesk_config::AppConfig;
use helpdesk_core::corpus::Corpus;
use helpdesk_store::SqliteStore;
use std::path::Path;
use std::sync::Arc;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?)
}

pub async fn open_store(config: &AppConfig) -> Result<SqliteStore, Box<dyn std::error::Error>> {
    Ok(SqliteStore::new(&config.database_path)
        .await
        .map_err(|e| format!("Failed to open database {}: {e}", config.database_path))?)
}

/// Load the corpus, open the store, and build the provider chain.
pub async fn build_assistant(
    config: &AppConfig,
) -> Result<SupportAssistant, Box<dyn std::error::Error>> {
    let corpus = Corpus::load(Path::new(&config.docs_path))?;
    let store = open_store(config).await?;
    let providers = helpdesk_providers::build_from_config(config);

    if !config.has_any_credential() {
        tracing::warn!("No provider credential set; every chat turn will fail until OPENROUTER_API_KEY or GEMINI_API_KEY is configured");
    }

    Ok(
        SupportAssistant::new(Arc::new(store), PromptAssembler::new(corpus), providers)
            .with_window(ContextWindow::new(config.history_window)),
    )
}
