//! `helpdesk serve` — Start the HTTP API server.

use std::path::Path;
use std::sync::Arc;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let assistant = super::build_assistant(&config).await?;

    println!("Helpdesk Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Docs:      {} ({} entries)", config.docs_path, assistant.assembler().corpus().len());
    println!("   Database:  {}", config.database_path);
    println!(
        "   Providers: {}",
        match assistant.providers().configured_providers().as_slice() {
            [] => "none configured".to_string(),
            names => names.join(" -> "),
        }
    );

    helpdesk_gateway::start(&config.gateway, Arc::new(assistant)).await?;

    Ok(())
}
