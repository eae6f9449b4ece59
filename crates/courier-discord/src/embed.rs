//! Rich-embed construction for link and photo sends.

use serenity::builder::{CreateEmbed, CreateEmbedFooter};

/// Embed for a link send: the URL is both title and click target; the
/// description (caption text plus any button legend) is attached only when
/// it has visible content.
pub fn link_embed(url: &str, description: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title(url).url(url);
    if !description.trim().is_empty() {
        embed = embed.description(description);
    }
    embed
}

/// Embed for a photo send: the image renders inline and the footer repeats
/// the source URL as a caption.
pub fn photo_embed(url: &str, description: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .url(url)
        .image(url)
        .footer(CreateEmbedFooter::new(url));
    if !description.is_empty() {
        embed = embed.description(description);
    }
    embed
}
