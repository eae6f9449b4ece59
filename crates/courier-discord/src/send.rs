//! Outbound dispatch — fire-and-forget sends with reply bookkeeping.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use tracing::warn;

use courier_core::types::Button;

use crate::context::{Service, TextMessage};
use crate::replies::{SentMessages, SentRecord};

/// Handle the service uses to send messages back through the adapter.
///
/// Sends do not block the caller: the serenity call runs on a spawned task,
/// and on success the send is recorded for later reply correlation.
pub struct Outbound<S> {
    http: Arc<Http>,
    service: Arc<S>,
    sent: Arc<Mutex<SentMessages>>,
}

impl<S> Clone for Outbound<S> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            service: Arc::clone(&self.service),
            sent: Arc::clone(&self.sent),
        }
    }
}

impl<S: Service> Outbound<S> {
    pub(crate) fn new(http: Arc<Http>, service: Arc<S>, sent: Arc<Mutex<SentMessages>>) -> Self {
        Self {
            http,
            service,
            sent,
        }
    }

    pub(crate) fn send_text(&self, msg: &TextMessage<S>, text: &str, buttons: &[Button]) {
        let mut body = self.service.emojize(text);
        body.push_str(&button_legend(self.service.as_ref(), buttons));
        self.dispatch(msg, false, CreateMessage::new().content(body));
    }

    pub(crate) fn send_question(&self, msg: &TextMessage<S>, text: &str, buttons: &[Button]) {
        let mut body = self.service.emojize(text);
        body.push_str(&button_legend(self.service.as_ref(), buttons));
        self.dispatch(msg, true, CreateMessage::new().content(body));
    }

    pub(crate) fn send_link(
        &self,
        msg: &TextMessage<S>,
        url: &str,
        buttons: &[Button],
        text: &str,
    ) {
        let mut description = text.to_string();
        description.push_str(&button_legend(self.service.as_ref(), buttons));
        let embed = crate::embed::link_embed(url, &description);
        self.dispatch(msg, false, CreateMessage::new().embed(embed));
    }

    pub(crate) fn send_photo(&self, msg: &TextMessage<S>, url: &str, buttons: &[Button]) {
        let description = button_legend(self.service.as_ref(), buttons);
        let embed = crate::embed::photo_embed(url, &description);
        self.dispatch(msg, false, CreateMessage::new().embed(embed));
    }

    /// Fire the send on a background task. The caller returns immediately;
    /// the buffer append happens when (and only when) delivery succeeds.
    fn dispatch(&self, msg: &TextMessage<S>, expects_reply: bool, payload: CreateMessage) {
        let http = Arc::clone(&self.http);
        let sent = Arc::clone(&self.sent);
        let channel_id = msg.channel_id;
        let guild_id = msg.guild_id;
        let reply_to = msg.origin.as_ref().map(|m| m.author.id);

        tokio::spawn(async move {
            match channel_id.send_message(&http, payload).await {
                Ok(delivered) => {
                    let record = SentRecord {
                        message_id: delivered.id,
                        channel_id,
                        guild_id,
                        reply_to,
                        sent_at: Utc::now(),
                        expects_reply,
                    };
                    sent.lock().unwrap().push(record);
                }
                Err(e) => {
                    warn!(channel = %channel_id, error = %e, "Discord send failed");
                }
            }
        });
    }
}

/// Render the button legend appended to outbound text.
///
/// One line per button: `label: value`, or just `label` when there is no
/// value; labels and values go through the service's emoji substitution.
/// A non-empty legend is preceded by a blank line.
pub(crate) fn button_legend<S: Service>(service: &S, buttons: &[Button]) -> String {
    let mut legend = String::new();
    for button in buttons {
        let label = service.emojize(&button.label);
        match &button.value {
            Some(value) => {
                legend.push_str(&format!("\n{}: {}", label, service.emojize(value)));
            }
            None => legend.push_str(&format!("\n{}", label)),
        }
    }
    if legend.is_empty() {
        legend
    } else {
        format!("\n{legend}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Brackets;

    #[async_trait]
    impl Service for Brackets {
        fn emojize(&self, text: &str) -> String {
            format!("[{text}]")
        }

        async fn handle_text_message(&self, _msg: TextMessage<Self>) {}
    }

    #[test]
    fn legend_is_empty_without_buttons() {
        assert_eq!(button_legend(&Brackets, &[]), "");
    }

    #[test]
    fn legend_renders_labels_and_values() {
        let buttons = [
            Button::with_value("Yes", "accept"),
            Button::new("No"),
        ];
        assert_eq!(
            button_legend(&Brackets, &buttons),
            "\n\n[Yes]: [accept]\n[No]"
        );
    }
}
