//! Account management: registration, profile edits, password changes and
//! credential checks. Rejections surface as [`UserError`] codes.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use popcorn_model::{User, UserId};
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::cancel::cancellable;
use crate::database::UserRepository;
use crate::error::{PopcornError, Result, UserError};
use crate::security::PasswordHasher;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+$").expect("username regex should compile")
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w.\-]+)@([\w\-]+)((\.(\w){2,3})+)$")
        .expect("email regex should compile")
});

const PASSWORD_MIN_LENGTH: usize = 8;
const PASSWORD_MAX_LENGTH: usize = 20;

/// 8 to 20 ASCII letters and digits with at least one lowercase letter,
/// one uppercase letter and one digit.
pub fn is_strong_password(password: &str) -> bool {
    let length = password.chars().count();
    (PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length)
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// First failing rule for a username/email pair, in the order the rules
/// are checked.
pub fn validate_profile(username: &str, email: &str) -> Option<UserError> {
    if username.trim().is_empty() {
        return Some(UserError::EmptyUsername);
    }
    let length = username.chars().count();
    if !(User::USERNAME_MIN_LENGTH..=User::USERNAME_MAX_LENGTH).contains(&length)
    {
        return Some(UserError::InvalidUsernameLength);
    }
    if !USERNAME_REGEX.is_match(username) {
        return Some(UserError::BadUsernameFormat);
    }
    if email.trim().is_empty() {
        return Some(UserError::EmptyEmail);
    }
    if !EMAIL_REGEX.is_match(email) {
        return Some(UserError::BadEmailFormat);
    }
    None
}

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl fmt::Debug for UserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self { repository, hasher }
    }

    pub async fn get_by_id(
        &self,
        id: UserId,
        cancel: &CancellationToken,
    ) -> Result<Option<User>> {
        cancellable(cancel, "get user", self.repository.get_by_id(id)).await
    }

    async fn require(
        &self,
        id: UserId,
        cancel: &CancellationToken,
    ) -> Result<User> {
        self.get_by_id(id, cancel)
            .await?
            .ok_or_else(|| UserError::NotFound.into())
    }

    /// Registers an account and returns its id. Password strength is
    /// checked before uniqueness, and uniqueness before format.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<UserId> {
        if !is_strong_password(password) {
            return Err(UserError::WeakPassword.into());
        }

        let by_email = cancellable(
            cancel,
            "find user by email",
            self.repository.get_by_email(email),
        )
        .await?;
        if by_email.is_some() {
            return Err(UserError::EmailAlreadyExists.into());
        }

        let by_username = cancellable(
            cancel,
            "find user by username",
            self.repository.get_by_username(username),
        )
        .await?;
        if by_username.is_some() {
            return Err(UserError::UsernameAlreadyExists.into());
        }

        if let Some(err) = validate_profile(username, email) {
            return Err(err.into());
        }

        let password_hash = self.hasher.hash(password)?;
        let user = User::new(username, email, password_hash);
        cancellable(cancel, "create user", self.repository.create(&user))
            .await?;

        info!("Created user {} ({})", user.username, user.id);
        Ok(user.id)
    }

    /// Replaces username and email. Both must stay unique among the other
    /// accounts; keeping the current values is allowed.
    pub async fn update(
        &self,
        id: UserId,
        username: &str,
        email: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.require(id, cancel).await?;

        if let Some(err) = validate_profile(username, email) {
            return Err(err.into());
        }

        let by_email = cancellable(
            cancel,
            "find user by email",
            self.repository.get_by_email(email),
        )
        .await?;
        if by_email.is_some_and(|other| other.id != id) {
            return Err(UserError::EmailAlreadyExists.into());
        }

        let by_username = cancellable(
            cancel,
            "find user by username",
            self.repository.get_by_username(username),
        )
        .await?;
        if by_username.is_some_and(|other| other.id != id) {
            return Err(UserError::UsernameAlreadyExists.into());
        }

        let rows = cancellable(
            cancel,
            "update user",
            self.repository.update(id, username, email),
        )
        .await?;
        if rows == 0 {
            return Err(UserError::NotFound.into());
        }
        debug!("Updated profile of user {}", id);
        Ok(())
    }

    pub async fn change_password(
        &self,
        id: UserId,
        old_password: &str,
        new_password: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if !is_strong_password(new_password) {
            return Err(UserError::WeakPassword.into());
        }

        let user = self.require(id, cancel).await?;
        if !self.hasher.verify(old_password, &user.password_hash)? {
            return Err(UserError::WrongPassword.into());
        }

        let password_hash = self.hasher.hash(new_password)?;
        let rows = cancellable(
            cancel,
            "update password",
            self.repository.update_password_hash(id, &password_hash),
        )
        .await?;
        if rows == 0 {
            return Err(UserError::NotFound.into());
        }
        info!("Changed password of user {}", id);
        Ok(())
    }

    pub async fn delete(
        &self,
        id: UserId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.require(id, cancel).await?;
        cancellable(cancel, "delete user", self.repository.delete(id)).await?;
        info!("Deleted user {}", id);
        Ok(())
    }

    /// Looks the account up by username and checks the password. Session
    /// or token issuance is left to the caller.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<User> {
        let user = cancellable(
            cancel,
            "find user by username",
            self.repository.get_by_username(username),
        )
        .await?
        .ok_or(PopcornError::User(UserError::NotFound))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            debug!("Rejected credentials for {}", username);
            return Err(UserError::WrongPassword.into());
        }
        Ok(user)
    }
}
