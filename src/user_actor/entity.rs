use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{User, UserCreate};

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Notes
    /// Duplicate Discord ids are accepted; callers look users up first.
    fn from_create(id: String, params: UserCreate) -> Result<Self, FrameworkError> {
        Ok(Self {
            id,
            discord_id: params.discord_id,
            discord_username: params.discord_username,
            discord_avatar: params.discord_avatar,
        })
    }
}
