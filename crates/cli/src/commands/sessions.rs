//! `helpdesk sessions` — List sessions, most recently active first.

use helpdesk_core::store::ConversationStore;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    let sessions = store.list_sessions().await?;
    if sessions.is_empty() {
        println!("No sessions yet");
        return Ok(());
    }

    println!("{:<40} {:<20} {:<20}", "SESSION", "CREATED", "LAST ACTIVE");
    for s in sessions {
        println!(
            "{:<40} {:<20} {:<20}",
            s.id,
            s.created_at.format("%Y-%m-%d %H:%M:%S"),
            s.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
