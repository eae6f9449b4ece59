use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Adapter constants — Discord-side limits and the reply-correlation windows
pub const MAX_MESSAGE_LENGTH: usize = 2000; // Discord hard limit; documented, not enforced here
pub const WAIT_FOR_REPLY_SECS: i64 = 5; // plain send: reply window
pub const WAIT_FOR_EXPECTED_REPLY_SECS: i64 = 360; // question send: reply window
pub const SENT_BUFFER_CAP: usize = 1000; // trim trigger for the sent-message buffer
pub const SENT_BUFFER_KEEP: usize = 30; // entries kept after a trim

/// Top-level config (courier.toml + COURIER_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// Command prefix gating. Absent (or effectively empty after
    /// normalization) means every message is forwarded ungated.
    #[serde(default)]
    pub prefix: Option<PrefixSetting>,
}

/// A single prefix string or a list of them, as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefixSetting {
    One(String),
    Many(Vec<String>),
}

impl DiscordConfig {
    /// Normalized prefix set: whitespace-only entries removed, remaining
    /// entries sorted longest-first so an overlapping longer prefix (`!!`)
    /// is matched before a shorter one (`!`). Empty result = no gating.
    pub fn prefixes(&self) -> Vec<String> {
        let raw: Vec<&str> = match &self.prefix {
            None => return Vec::new(),
            Some(PrefixSetting::One(s)) => vec![s.as_str()],
            Some(PrefixSetting::Many(list)) => list.iter().map(String::as_str).collect(),
        };

        let mut prefixes: Vec<String> = raw
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string)
            .collect();
        prefixes.sort_by_key(|p| std::cmp::Reverse(p.len()));
        prefixes
    }
}

impl CourierConfig {
    /// Load config: explicit path > ~/.courier/courier.toml, with
    /// COURIER_* env overrides on top.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CourierConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("COURIER_").split("_"))
            .extract()
            .map_err(|e| crate::error::CourierError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.courier/courier.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(prefix: Option<PrefixSetting>) -> DiscordConfig {
        DiscordConfig {
            bot_token: "token".to_string(),
            prefix,
        }
    }

    #[test]
    fn absent_prefix_means_no_gating() {
        assert!(config_with(None).prefixes().is_empty());
    }

    #[test]
    fn whitespace_only_prefix_means_no_gating() {
        let cfg = config_with(Some(PrefixSetting::One("   ".to_string())));
        assert!(cfg.prefixes().is_empty());
    }

    #[test]
    fn prefix_list_is_sorted_longest_first() {
        let cfg = config_with(Some(PrefixSetting::Many(vec![
            "!".to_string(),
            "!!".to_string(),
        ])));
        assert_eq!(cfg.prefixes(), vec!["!!".to_string(), "!".to_string()]);
    }

    #[test]
    fn empty_entries_are_dropped_from_lists() {
        let cfg = config_with(Some(PrefixSetting::Many(vec![
            "".to_string(),
            "cmd ".to_string(),
        ])));
        assert_eq!(cfg.prefixes(), vec!["cmd ".to_string()]);
    }
}
