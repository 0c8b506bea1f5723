use tracing::warn;

use crate::error::StoreError;

/// bcrypt only reads this many bytes; anything beyond would be ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted bcrypt hashing. Work runs on the blocking pool.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, StoreError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(StoreError::PasswordTooLong);
        }

        let password = password.to_owned();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    /// Constant-time check of `password` against a stored hash. A malformed
    /// hash counts as a mismatch, and so does a password bcrypt would truncate.
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, StoreError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await?;

        match result {
            Ok(valid) => Ok(valid),
            Err(e) => {
                warn!("Stored password hash could not be parsed: {e}");
                Ok(false)
            }
        }
    }

    /// Spends the same bcrypt work as [`verify`](Self::verify) for a user that
    /// does not exist, then reports a mismatch.
    pub async fn verify_unknown(&self, password: &str) -> Result<bool, StoreError> {
        let password: String = password.chars().take(MAX_PASSWORD_BYTES).collect();
        let cost = self.cost;
        if let Err(e) = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await? {
            warn!("Password hashing for unknown user failed: {e}");
        }
        Ok(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
