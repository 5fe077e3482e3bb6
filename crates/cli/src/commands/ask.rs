//! `helpdesk ask` — Run one persisted chat turn from the terminal.

use helpdesk_core::message::SessionId;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    session: String,
    message: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let assistant = super::build_assistant(&config).await?;

    let reply = assistant
        .handle_turn(&SessionId::from(session), &message)
        .await?;
    println!("{reply}");

    Ok(())
}
