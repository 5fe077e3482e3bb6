//! `helpdesk history` — Print a session transcript.

use helpdesk_core::message::SessionId;
use helpdesk_core::store::ConversationStore;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    session: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    let messages = store.all_messages(&SessionId::from(session.as_str())).await?;
    if messages.is_empty() {
        println!("No messages for session {session}");
        return Ok(());
    }

    for m in messages {
        println!(
            "[{}] {:>9}: {}",
            m.created_at.format("%Y-%m-%d %H:%M:%S"),
            m.role,
            m.content
        );
    }

    Ok(())
}
