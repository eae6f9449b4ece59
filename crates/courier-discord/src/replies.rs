//! Sent-message buffer and reply correlation.
//!
//! Every successful outbound send is recorded here. When a prefix-gated
//! message arrives without a prefix, the buffer is scanned newest-first for
//! a recent send to the same author in the same guild/channel; a hit means
//! the message is treated as a reply and forwarded, and the matched record
//! is consumed so it can match at most once.

use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

use courier_core::config::{
    SENT_BUFFER_CAP, SENT_BUFFER_KEEP, WAIT_FOR_EXPECTED_REPLY_SECS, WAIT_FOR_REPLY_SECS,
};

/// One successfully delivered outbound message.
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    /// Author of the inbound message this send answered. `None` for sends
    /// triggered by synthesized contexts (guild join) — those never match.
    pub reply_to: Option<UserId>,
    pub sent_at: DateTime<Utc>,
    pub expects_reply: bool,
}

/// Ordered buffer of recent sends, insertion order = recency.
#[derive(Debug, Default)]
pub struct SentMessages {
    records: Vec<SentRecord>,
}

impl SentMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record. Once the buffer grows past [`SENT_BUFFER_CAP`]
    /// entries it is batch-trimmed down to the [`SENT_BUFFER_KEEP`] most
    /// recent ones — a cheap periodic trim, not a strict ring buffer.
    pub fn push(&mut self, record: SentRecord) {
        self.records.push(record);
        if self.records.len() > SENT_BUFFER_CAP {
            let excess = self.records.len() - SENT_BUFFER_KEEP;
            self.records.drain(..excess);
        }
    }

    /// Find and consume the most recent record that `author`'s message in
    /// `guild_id`/`channel_id` counts as a reply to.
    ///
    /// A record matches when it answered this author in this guild and
    /// channel and `now` is still inside its reply window: 360 s for a
    /// question send, 5 s otherwise. The record is removed on match.
    pub fn take_reply_match(
        &mut self,
        guild_id: Option<GuildId>,
        channel_id: ChannelId,
        author: UserId,
        now: DateTime<Utc>,
    ) -> Option<SentRecord> {
        let idx = self.records.iter().rposition(|record| {
            if record.reply_to != Some(author)
                || record.channel_id != channel_id
                || record.guild_id != guild_id
            {
                return false;
            }
            let elapsed = (now - record.sent_at).num_seconds();
            let window = if record.expects_reply {
                WAIT_FOR_EXPECTED_REPLY_SECS
            } else {
                WAIT_FOR_REPLY_SECS
            };
            (0..window).contains(&elapsed)
        })?;
        Some(self.records.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(n: u64, expects_reply: bool, sent_at: DateTime<Utc>) -> SentRecord {
        SentRecord {
            message_id: MessageId::new(n),
            channel_id: ChannelId::new(10),
            guild_id: Some(GuildId::new(20)),
            reply_to: Some(UserId::new(7)),
            sent_at,
            expects_reply,
        }
    }

    #[test]
    fn plain_send_matches_only_within_short_window() {
        let base = Utc::now();
        let mut buf = SentMessages::new();
        buf.push(record(1, false, base));

        assert!(buf
            .take_reply_match(
                Some(GuildId::new(20)),
                ChannelId::new(10),
                UserId::new(7),
                base + Duration::seconds(6),
            )
            .is_none());
        assert!(buf
            .take_reply_match(
                Some(GuildId::new(20)),
                ChannelId::new(10),
                UserId::new(7),
                base + Duration::seconds(4),
            )
            .is_some());
    }

    #[test]
    fn question_matches_within_long_window() {
        let base = Utc::now();
        let mut buf = SentMessages::new();
        buf.push(record(1, true, base));

        let matched = buf.take_reply_match(
            Some(GuildId::new(20)),
            ChannelId::new(10),
            UserId::new(7),
            base + Duration::seconds(359),
        );
        assert!(matched.is_some());
    }

    #[test]
    fn question_expires_after_long_window() {
        let base = Utc::now();
        let mut buf = SentMessages::new();
        buf.push(record(1, true, base));

        let matched = buf.take_reply_match(
            Some(GuildId::new(20)),
            ChannelId::new(10),
            UserId::new(7),
            base + Duration::seconds(361),
        );
        assert!(matched.is_none());
        assert_eq!(buf.len(), 1, "expired record stays in the buffer");
    }

    #[test]
    fn match_consumes_exactly_the_most_recent_record() {
        let base = Utc::now();
        let mut buf = SentMessages::new();
        buf.push(record(1, true, base));
        buf.push(record(2, true, base + Duration::seconds(1)));

        let first = buf
            .take_reply_match(
                Some(GuildId::new(20)),
                ChannelId::new(10),
                UserId::new(7),
                base + Duration::seconds(2),
            )
            .expect("reply should match");
        assert_eq!(first.message_id, MessageId::new(2));
        assert_eq!(buf.len(), 1, "older record survives for a later reply");

        let second = buf
            .take_reply_match(
                Some(GuildId::new(20)),
                ChannelId::new(10),
                UserId::new(7),
                base + Duration::seconds(2),
            )
            .expect("second reply should match the older record");
        assert_eq!(second.message_id, MessageId::new(1));
        assert!(buf.is_empty());
    }

    #[test]
    fn wrong_channel_author_or_guild_never_matches() {
        let base = Utc::now();
        let mut buf = SentMessages::new();
        buf.push(record(1, true, base));

        let now = base + Duration::seconds(1);
        assert!(buf
            .take_reply_match(Some(GuildId::new(20)), ChannelId::new(11), UserId::new(7), now)
            .is_none());
        assert!(buf
            .take_reply_match(Some(GuildId::new(20)), ChannelId::new(10), UserId::new(8), now)
            .is_none());
        assert!(buf
            .take_reply_match(Some(GuildId::new(21)), ChannelId::new(10), UserId::new(7), now)
            .is_none());
        assert!(buf
            .take_reply_match(None, ChannelId::new(10), UserId::new(7), now)
            .is_none());
    }

    #[test]
    fn proactive_sends_never_match() {
        let base = Utc::now();
        let mut buf = SentMessages::new();
        let mut proactive = record(1, true, base);
        proactive.reply_to = None;
        buf.push(proactive);

        assert!(buf
            .take_reply_match(
                Some(GuildId::new(20)),
                ChannelId::new(10),
                UserId::new(7),
                base + Duration::seconds(1),
            )
            .is_none());
    }

    #[test]
    fn buffer_trims_to_thirty_most_recent_after_cap() {
        let base = Utc::now();
        let mut buf = SentMessages::new();
        for n in 1..=1001 {
            buf.push(record(n, false, base));
        }

        assert_eq!(buf.len(), 30);
        // The survivors are the 30 most recent appends, oldest-first.
        let ids: Vec<u64> = buf.records.iter().map(|r| r.message_id.get()).collect();
        let expected: Vec<u64> = (972..=1001).collect();
        assert_eq!(ids, expected);
    }
}
