use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use courier_core::config::CourierConfig;
use courier_discord::{DiscordAdapter, Service, TextMessage};

/// Minimal service wiring: greets joined guilds and echoes everything else.
struct EchoService;

#[async_trait]
impl Service for EchoService {
    fn emojize(&self, text: &str) -> String {
        text.to_string()
    }

    async fn handle_text_message(&self, msg: TextMessage<Self>) {
        if msg.system_join {
            msg.send_text("Hello! Talk to me with the configured prefix.", &[]);
            return;
        }

        info!(user = %msg.user_id, text = %msg.text, "inbound message");
        msg.send_question(&format!("You said: {}", msg.text), &[]);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier_bot=info,courier_discord=info".into()),
        )
        .init();

    // load config: explicit path via COURIER_CONFIG > ~/.courier/courier.toml
    let config_path = std::env::var("COURIER_CONFIG").ok();
    let config = CourierConfig::load(config_path.as_deref())?;

    let adapter = DiscordAdapter::new(&config.discord, Arc::new(EchoService))?;
    adapter.spawn();

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
