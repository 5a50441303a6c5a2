use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate};
use crate::user_actor::UserError;

/// Client for interacting with the User actor.
#[derive(Clone, Debug)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self))]
    pub async fn create_user(&self, user: UserCreate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner
            .create(user)
            .await
            .map_err(|e| UserError::ActorCommunicationError(e.to_string()))
    }

    /// Linear scan over all users; the actor keeps no secondary index.
    #[instrument(skip(self))]
    pub async fn find_by_discord_id(&self, discord_id: &str) -> Result<Option<User>, UserError> {
        let users = self.list_users().await?;
        Ok(users.into_iter().find(|user| user.discord_id == discord_id))
    }
}
