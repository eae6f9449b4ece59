//! Serenity event handler — inbound normalization and forwarding.

use std::sync::{Arc, Mutex, OnceLock};

use chrono::Utc;
use serenity::async_trait;
use serenity::model::channel::{ChannelType, GuildChannel, Message};
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, Member};
use serenity::model::id::UserId;
use serenity::model::Permissions;
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info, warn};

use crate::context::{Service, TextMessage};
use crate::replies::SentMessages;
use crate::send::Outbound;

/// Serenity event handler wired to the service callback.
pub struct DiscordHandler<S: Service> {
    pub service: Arc<S>,
    /// Normalized prefix set, longest-first. Empty = no gating.
    pub prefixes: Vec<String>,
    pub sent: Arc<Mutex<SentMessages>>,
    pub bot_id: OnceLock<UserId>,
}

#[async_trait]
impl<S: Service> EventHandler for DiscordHandler<S> {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.bot_id.set(ready.user.id).ok();
        info!(name = %ready.user.name, "Discord bot connected");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let text = if self.prefixes.is_empty() {
            msg.content.clone()
        } else if let Some(stripped) = strip_command_prefix(&self.prefixes, &msg.content) {
            stripped
        } else {
            // No prefix — forward only if this is a timely reply to
            // something we sent this author in this channel.
            let matched = self.sent.lock().unwrap().take_reply_match(
                msg.guild_id,
                msg.channel_id,
                msg.author.id,
                Utc::now(),
            );
            if matched.is_none() {
                debug!(channel = %msg.channel_id, "not a command or a timely reply, dropping");
                return;
            }
            msg.content.clone()
        };

        let event = TextMessage {
            outbound: self.outbound(&ctx),
            user_id: msg.author.id,
            text,
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            author: Some(msg.author.clone()),
            origin: Some(msg),
            system_join: false,
        };
        self.service.handle_text_message(event).await;
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        // GUILD_CREATE also fires as a cache fill on every (re)connect;
        // only an actual join gets the greeting.
        if is_new != Some(true) {
            return;
        }

        let Some(bot_id) = self.bot_id.get().copied() else {
            return;
        };

        // Own membership, needed for the send-permission check. The join
        // payload usually carries it; fall back to a REST fetch.
        let me: Member = match guild.members.get(&bot_id) {
            Some(member) => member.clone(),
            None => match ctx.http.get_member(guild.id, bot_id).await {
                Ok(member) => member,
                Err(e) => {
                    warn!(guild = %guild.id, error = %e, "cannot resolve own membership, skipping greeting");
                    return;
                }
            },
        };

        let mut candidates: Vec<&GuildChannel> = guild
            .channels
            .values()
            .filter(|ch| {
                ch.kind == ChannelType::Text
                    && guild
                        .user_permissions_in(ch, &me)
                        .contains(Permissions::SEND_MESSAGES)
            })
            .collect();

        if candidates.is_empty() {
            debug!(guild = %guild.id, "joined a guild with no writable text channel");
            return;
        }

        candidates.sort_by_key(|ch| channel_rank(&ch.name, ch.position));
        let channel_id = candidates[0].id;

        info!(guild = %guild.id, channel = %channel_id, "joined guild, greeting the owner");

        let event = TextMessage {
            outbound: self.outbound(&ctx),
            user_id: guild.owner_id,
            text: "/start".to_string(),
            origin: None,
            channel_id,
            guild_id: Some(guild.id),
            author: None,
            system_join: true,
        };
        self.service.handle_text_message(event).await;
    }
}

impl<S: Service> DiscordHandler<S> {
    fn outbound(&self, ctx: &Context) -> Outbound<S> {
        Outbound::new(
            Arc::clone(&ctx.http),
            Arc::clone(&self.service),
            Arc::clone(&self.sent),
        )
    }
}

/// Strip the first matching prefix plus one layer of surrounding
/// whitespace. Prefixes arrive pre-sorted longest-first.
fn strip_command_prefix(prefixes: &[String], text: &str) -> Option<String> {
    for prefix in prefixes {
        if let Some(rest) = text.strip_prefix(prefix.as_str()) {
            return Some(rest.trim().to_string());
        }
    }
    None
}

/// Sort key for join-greeting channel selection: a channel literally named
/// "general" outranks everything, then lower platform position wins.
fn channel_rank(name: &str, position: u16) -> i32 {
    if name == "general" {
        -1
    } else {
        i32::from(position)
    }
}
