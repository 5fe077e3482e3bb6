//! `helpdesk status` — Show resolved configuration.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    println!("Helpdesk Status");
    println!("===============");
    println!("  Docs:         {}", config.docs_path);
    println!("  Database:     {}", config.database_path);
    println!("  History:      {} messages", config.history_window);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  Rate limit:   {}/min", config.gateway.rate_limit_per_minute);
    println!("  Static dir:   {}", config.gateway.static_dir);

    println!("\n  Providers (in fallback order):");
    for (name, provider) in config.provider_entries() {
        let model = provider
            .model
            .as_deref()
            .unwrap_or_else(|| helpdesk_providers::router::default_model(name));
        let state = if provider.credential().is_some() {
            "configured"
        } else {
            "no credential"
        };
        println!("    {name:<11} {model:<36} {state}");
    }

    if Path::new(&config.docs_path).exists() {
        println!("\n  Docs file found");
    } else {
        println!("\n  No docs file at {}", config.docs_path);
    }
    if !config.has_any_credential() {
        println!("  Set OPENROUTER_API_KEY or GEMINI_API_KEY to enable answers");
    }

    Ok(())
}
