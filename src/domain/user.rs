use serde::{Deserialize, Serialize};

/// A storefront account bound to a Discord identity.
///
/// Created on first Discord login and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub discord_id: String,
    pub discord_username: String,
    pub discord_avatar: Option<String>,
}

/// Payload for creating a new user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub discord_id: String,
    pub discord_username: String,
    #[serde(default)]
    pub discord_avatar: Option<String>,
}

impl UserCreate {
    pub fn new(discord_id: impl Into<String>, discord_username: impl Into<String>) -> Self {
        Self {
            discord_id: discord_id.into(),
            discord_username: discord_username.into(),
            discord_avatar: None,
        }
    }
}
