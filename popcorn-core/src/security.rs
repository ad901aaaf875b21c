//! Password hashing port and its Argon2id implementation.

use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};

use crate::error::{PopcornError, Result};

/// Turns plaintext passwords into storable PHC strings and checks them back.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(false)` on mismatch; `Err` only when `password_hash` is malformed.
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool>;
}

impl From<PasswordHashError> for PopcornError {
    fn from(err: PasswordHashError) -> Self {
        PopcornError::PasswordHash(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    const DEFAULT_ITERATIONS: u32 = 3;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    /// Argon2id with 64 MiB memory and 3 iterations.
    pub fn new() -> Result<Self> {
        let params = ParamsBuilder::new()
            .m_cost(Self::DEFAULT_MEMORY_KIB)
            .t_cost(Self::DEFAULT_ITERATIONS)
            .p_cost(Self::DEFAULT_PARALLELISM)
            .output_len(32)
            .build()
            .map_err(|err| PopcornError::PasswordHash(err.to_string()))?;
        Ok(Self::with_params(params))
    }

    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| PopcornError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::with_params(
            Params::new(8, 1, 1, None).unwrap(),
        )
    }

    #[test]
    fn hashes_passwords_and_verifies() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Sunflower42").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Sunflower42", &hash).unwrap());
        assert!(!hasher.verify("Sunflower43", &hash).unwrap());
    }

    #[test]
    fn salts_every_hash() {
        let hasher = fast_hasher();
        let first = hasher.hash("Sunflower42").unwrap();
        let second = hasher.hash("Sunflower42").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = fast_hasher().verify("Sunflower42", "not-a-phc").unwrap_err();
        assert_eq!(err.code(), "security.password_hash");
    }

    #[test]
    fn default_parameters_build() {
        assert!(Argon2PasswordHasher::new().is_ok());
    }
}
