//! Service seam — the callback interface between the adapter and the
//! application, and the normalized message handed across it.

use async_trait::async_trait;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::user::User;

use courier_core::types::Button;

use crate::send::Outbound;

/// The application behind the adapter.
///
/// The adapter normalizes every accepted inbound event into a
/// [`TextMessage`] and hands it here; the implementation may answer through
/// the send helpers on the message. `emojize` is the text substitution
/// applied to outbound text and button legends (`:smile:` → 😄 or similar);
/// implementations with no substitution table return the input unchanged.
#[async_trait]
pub trait Service: Sized + Send + Sync + 'static {
    fn emojize(&self, text: &str) -> String;

    async fn handle_text_message(&self, msg: TextMessage<Self>);
}

/// A normalized inbound message.
///
/// Either a real chat message (with `origin`/`author` set) or a synthesized
/// guild-join greeting addressed to the server owner (`system_join`, no
/// origin, no author).
pub struct TextMessage<S: Service> {
    /// Handle for sending back through the adapter.
    pub outbound: Outbound<S>,
    /// The logical sender: message author, or guild owner for join events.
    pub user_id: UserId,
    /// Message body with any recognized command prefix stripped.
    pub text: String,
    /// The originating platform message. `None` for join events; sends
    /// answering a message without an origin never match as replies.
    pub origin: Option<Message>,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: Option<User>,
    /// True for the synthesized "/start" emitted when the bot joins a guild.
    pub system_join: bool,
}

impl<S: Service> TextMessage<S> {
    /// Send plain text. Does not open a reply window beyond the short
    /// default.
    pub fn send_text(&self, text: &str, buttons: &[Button]) {
        self.outbound.send_text(self, text, buttons);
    }

    /// Send a question: the author's next message in this channel counts as
    /// a reply for the extended window.
    pub fn send_question(&self, text: &str, buttons: &[Button]) {
        self.outbound.send_question(self, text, buttons);
    }

    /// Send a link as a rich embed, with optional caption text.
    pub fn send_link(&self, url: &str, buttons: &[Button], text: &str) {
        self.outbound.send_link(self, url, buttons, text);
    }

    /// Send a photo as an image embed captioned with its URL.
    pub fn send_photo(&self, url: &str, buttons: &[Button]) {
        self.outbound.send_photo(self, url, buttons);
    }
}
