/// Errors surfaced while building the Discord client.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("serenity client error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("discord bot token is missing or empty")]
    NoToken,
}
