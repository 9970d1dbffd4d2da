use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use yt_seo_assistant::{create_llm, CategoryTable, Config, GoogleSuggestClient, SuggestionTreeBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("yt_seo_assistant=info,check_services=info")
        .init();

    info!("🔍 Checking service availability...");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            info!("❌ {}", e);
            info!("💡 Fix or remove seo-assistant.toml");
            return Ok(());
        }
    };
    for line in config.summary().lines() {
        info!("   {}", line);
    }

    if let Err(e) = config.validate() {
        info!("❌ {}", e);
        return Ok(());
    }

    // Autocomplete endpoint
    info!("🌐 Testing autocomplete endpoint...");
    let builder = SuggestionTreeBuilder::new(Arc::new(GoogleSuggestClient::new(&config.suggestions)?))
        .with_call_timeout(Duration::from_secs(config.suggestions.request_timeout_seconds));
    match builder
        .suggestions("youtube", &config.youtube.default_language, 3)
        .await
    {
        Ok(suggestions) => info!("✅ Autocomplete reachable: {}", suggestions.join(", ")),
        Err(e) => info!("❌ Autocomplete unavailable: {}", e),
    }

    // Text generation provider
    info!("✍️ Testing {:?} provider...", config.llm.provider);
    match create_llm(&config.llm) {
        Ok(llm) => {
            if llm.is_available().await {
                info!("✅ {:?} provider available ({})", llm.provider_type(), config.llm.model);
            } else {
                info!("❌ {:?} provider not reachable", llm.provider_type());
            }
        }
        Err(e) => {
            info!("❌ {}", e);
            info!("💡 Set OPENAI_API_KEY or configure [llm] in seo-assistant.toml");
        }
    }

    // YouTube Data API key
    match config.require_youtube_api_key() {
        Ok(_) => info!("✅ YouTube API key configured"),
        Err(e) => info!("❌ {}", e),
    }

    // Categories
    match &config.youtube.categories_file {
        Some(path) => match CategoryTable::from_file(path) {
            Ok(categories) => info!("📚 {} video categories loaded", categories.len()),
            Err(e) => {
                info!("❌ Categories file {} unusable: {}", path.display(), e);
                info!("💡 Falling back to {} built-in categories", CategoryTable::builtin().len());
            }
        },
        None => info!("📚 {} built-in video categories", CategoryTable::builtin().len()),
    }

    info!("🎉 Service check finished");
    info!("💡 Try: cargo run --bin yt-seo -- tree \"youtube seo\"");

    Ok(())
}
