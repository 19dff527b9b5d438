use std::sync::Arc;

use wa_assist::channels::{Channel, CliChannel, WhatsAppChannel};
use wa_assist::config::AppConfig;
use wa_assist::llm::{LlmConfig, create_provider};
use wa_assist::orchestrator::Orchestrator;
use wa_assist::store::HttpProfileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        eprintln!("  export WA_ASSIST_API_URL=http://localhost:3000");
        std::process::exit(1);
    });

    let llm = create_provider(&LlmConfig {
        api_key: config.openai_api_key.clone(),
        model: config.model.clone(),
        base_url: config.openai_base_url.clone(),
    });

    let store = Arc::new(HttpProfileStore::new(&config.store_url));

    let channel: Arc<dyn Channel> = match config.gateway {
        Some(ref gateway) => {
            Arc::new(WhatsAppChannel::new(&gateway.base_url, gateway.session.clone()))
        }
        None => Arc::new(CliChannel::new()),
    };

    eprintln!("🤖 WA Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Profile store: {}", config.store_url);
    eprintln!("   Channel: {}", channel.name());
    if let Some(ref gateway) = config.gateway {
        eprintln!("   Gateway: {} (session: {})", gateway.base_url, gateway.session);
    } else {
        eprintln!("   Type a message and press Enter. Ctrl+C to exit.");
    }

    // The bot cannot run without knowing which account it operates as; only
    // that account may trigger onboarding.
    let account = channel.controlling_account().await?;
    eprintln!("   Operating as: {account}\n");
    tracing::info!(account = %account, "Controlling account resolved");

    let orchestrator = Orchestrator::new(config.orchestrator, channel, store, llm, account);
    orchestrator.run().await?;

    Ok(())
}
