use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use courier_core::config::DiscordConfig;

use crate::context::Service;
use crate::error::DiscordError;
use crate::handler::DiscordHandler;
use crate::replies::SentMessages;

/// Discord channel adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process
/// exits, reconnecting whenever the gateway drops. The sent-message buffer
/// lives here so reply correlation survives reconnects.
pub struct DiscordAdapter<S: Service> {
    service: Arc<S>,
    config: DiscordConfig,
    sent: Arc<Mutex<SentMessages>>,
}

impl<S: Service> DiscordAdapter<S> {
    pub fn new(config: &DiscordConfig, service: Arc<S>) -> Result<Self, DiscordError> {
        if config.bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        Ok(Self {
            service,
            config: config.clone(),
            sent: Arc::new(Mutex::new(SentMessages::new())),
        })
    }

    /// Run the adapter on a background task and return immediately.
    ///
    /// Fire-and-forget: there is no shutdown surface — the task lives until
    /// the process (or runtime) exits.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns — runs for the lifetime of the process.
    pub async fn run(self) {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = self.connect(intents).await;

        loop {
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(Duration::from_secs(5)).await;
            client = self.connect(intents).await;
        }
    }

    /// Build a client, retrying indefinitely until construction succeeds.
    async fn connect(&self, intents: GatewayIntents) -> Client {
        loop {
            match self.build_client(intents).await {
                Ok(client) => return client,
                Err(e) => {
                    error!("Discord: connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        }
    }

    /// Build a fresh serenity `Client` with our event handler.
    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, DiscordError> {
        let handler = DiscordHandler {
            service: Arc::clone(&self.service),
            prefixes: self.config.prefixes(),
            sent: Arc::clone(&self.sent),
            bot_id: OnceLock::new(),
        };

        let client = Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await?;
        Ok(client)
    }
}
