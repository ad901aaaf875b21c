use async_trait::async_trait;
use popcorn_model::{User, UserId};

use crate::error::Result;

/// Account storage. Lookups by username and email are exact matches.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create(&self, user: &User) -> Result<()>;

    /// Returns the number of rows changed; 0 when the user is gone.
    async fn update(
        &self,
        id: UserId,
        username: &str,
        email: &str,
    ) -> Result<u64>;

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<u64>;

    async fn delete(&self, id: UserId) -> Result<u64>;
}
