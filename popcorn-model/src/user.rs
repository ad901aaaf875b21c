use chrono::{DateTime, Utc};

use crate::ids::UserId;

/// A registered account. `password_hash` is an opaque PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing, default))]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub const USERNAME_MIN_LENGTH: usize = 3;
    pub const USERNAME_MAX_LENGTH: usize = 16;

    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
