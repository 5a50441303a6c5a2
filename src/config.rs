//! Layered configuration: compiled defaults, `storefront.toml`, then environment.
//!
//! Top-level keys come from `STOREFRONT_*` variables (`STOREFRONT_BIND_ADDRESS`),
//! the Discord section from `DISCORD_*` variables (`DISCORD_BOT_TOKEN` maps to
//! `discord.bot_token`).

use std::fmt;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

pub const CONFIG_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bind_address: String,
    pub log_level: String,
    pub seed_sample_products: bool,
    pub discord: DiscordConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            log_level: "info".to_string(),
            seed_sample_products: true,
            discord: DiscordConfig::default(),
        }
    }
}

/// Discord credentials and destinations. Identifiers are kept as strings, the
/// way Discord renders snowflakes; an empty string counts as unset.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscordConfig {
    #[serde(deserialize_with = "snowflake")]
    pub bot_token: Option<String>,
    #[serde(deserialize_with = "snowflake")]
    pub owner_id: Option<String>,
    #[serde(deserialize_with = "snowflake")]
    pub co_owner_id: Option<String>,
    #[serde(deserialize_with = "snowflake")]
    pub logs_channel_id: Option<String>,
    #[serde(deserialize_with = "snowflake")]
    pub server_id: Option<String>,
    #[serde(deserialize_with = "snowflake")]
    pub client_id: Option<String>,
    pub send_timeout_secs: u64,
    pub queue_capacity: usize,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            owner_id: None,
            co_owner_id: None,
            logs_channel_id: None,
            server_id: None,
            client_id: None,
            send_timeout_secs: 5,
            queue_capacity: 64,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(u64),
}

// Environment values such as `DISCORD_OWNER_ID=1234` arrive as numbers.
fn snowflake<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    }))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DiscordConfig {
    /// `None` means the Discord layer stays off.
    pub fn bot_token(&self) -> Option<&str> {
        non_empty(&self.bot_token)
    }

    pub fn owner_id(&self) -> Option<&str> {
        non_empty(&self.owner_id)
    }

    pub fn co_owner_id(&self) -> Option<&str> {
        non_empty(&self.co_owner_id)
    }

    pub fn logs_channel_id(&self) -> Option<&str> {
        non_empty(&self.logs_channel_id)
    }

    pub fn server_id(&self) -> Option<&str> {
        non_empty(&self.server_id)
    }

    pub fn client_id(&self) -> Option<&str> {
        non_empty(&self.client_id)
    }

    /// Owner and co-owner, skipping whichever is unset.
    pub fn admin_ids(&self) -> Vec<String> {
        [self.owner_id(), self.co_owner_id()]
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs.max(1))
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &self.bot_token().map(|_| "<redacted>"))
            .field("owner_id", &self.owner_id)
            .field("co_owner_id", &self.co_owner_id)
            .field("logs_channel_id", &self.logs_channel_id)
            .field("server_id", &self.server_id)
            .field("client_id", &self.client_id)
            .field("send_timeout_secs", &self.send_timeout_secs)
            .field("queue_capacity", &self.queue_capacity)
            .finish()
    }
}

/// Load from defaults, `./storefront.toml` and the environment.
pub fn load_config() -> Result<Config, figment::Error> {
    build_figment().extract()
}

/// Defaults plus a TOML string, without the environment.
pub fn load_config_from_str(toml: &str) -> Result<Config, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::string(toml))
        .extract()
}

pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed("STOREFRONT_").only(&["bind_address", "log_level", "seed_sample_products"]))
        .merge(discord_env())
}

fn discord_env() -> Env {
    Env::prefixed("DISCORD_")
        .only(&[
            "bot_token",
            "owner_id",
            "co_owner_id",
            "logs_channel_id",
            "server_id",
            "client_id",
            "send_timeout_secs",
            "queue_capacity",
        ])
        .map(|key| format!("discord.{}", key.as_str()).into())
}
