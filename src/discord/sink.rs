use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};
use serenity::model::Timestamp;
use thiserror::Error;
use tracing::{debug, instrument};

use super::embeds::Embed;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("Invalid Discord id: {0}")]
    InvalidId(String),
    #[error("Discord API error: {0}")]
    Api(String),
    #[error("Discord send timed out")]
    Timeout,
}

/// Where rendered embeds go. The worker talks to Discord only through this.
#[async_trait]
pub trait DiscordSink: Send + Sync {
    async fn send_dm(&self, user_id: &str, embed: &Embed) -> Result<(), SinkError>;
    async fn send_channel(&self, channel_id: &str, embed: &Embed) -> Result<(), SinkError>;
}

fn parse_snowflake(id: &str) -> Result<u64, SinkError> {
    match id.trim().parse::<u64>() {
        Ok(value) if value != 0 => Ok(value),
        _ => Err(SinkError::InvalidId(id.to_string())),
    }
}

pub fn to_serenity_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new().title(&embed.title).colour(embed.colour);
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(timestamp) = embed
        .timestamp
        .and_then(|ts| Timestamp::from_unix_timestamp(ts.timestamp()).ok())
    {
        builder = builder.timestamp(timestamp);
    }
    builder
}

/// Sends through Discord's REST API.
#[derive(Clone)]
pub struct SerenitySink {
    http: Arc<Http>,
}

impl SerenitySink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(Http::new(token)))
    }
}

impl std::fmt::Debug for SerenitySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerenitySink").finish_non_exhaustive()
    }
}

#[async_trait]
impl DiscordSink for SerenitySink {
    #[instrument(skip(self, embed), fields(title = %embed.title))]
    async fn send_dm(&self, user_id: &str, embed: &Embed) -> Result<(), SinkError> {
        let user = UserId::new(parse_snowflake(user_id)?);
        let message = CreateMessage::new().embed(to_serenity_embed(embed));
        user.direct_message(&*self.http, message)
            .await
            .map_err(|e| SinkError::Api(e.to_string()))?;
        debug!("DM delivered");
        Ok(())
    }

    #[instrument(skip(self, embed), fields(title = %embed.title))]
    async fn send_channel(&self, channel_id: &str, embed: &Embed) -> Result<(), SinkError> {
        let channel = ChannelId::new(parse_snowflake(channel_id)?);
        let message = CreateMessage::new().embed(to_serenity_embed(embed));
        channel
            .send_message(&*self.http, message)
            .await
            .map_err(|e| SinkError::Api(e.to_string()))?;
        debug!("Channel message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflakes_must_be_positive_integers() {
        assert_eq!(parse_snowflake("123456789012345678"), Ok(123456789012345678));
        assert_eq!(parse_snowflake(" 42 "), Ok(42));
        assert!(matches!(parse_snowflake("0"), Err(SinkError::InvalidId(_))));
        assert!(matches!(parse_snowflake("owner"), Err(SinkError::InvalidId(_))));
        assert!(matches!(parse_snowflake(""), Err(SinkError::InvalidId(_))));
    }
}
