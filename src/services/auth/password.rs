//! bcrypt password hashing.
//!
//! bcrypt is CPU-heavy, so both operations run on the blocking pool.

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// bcrypt only looks at the first 72 bytes.
pub const MAX_PASSWORD_LENGTH: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let cost = self.cost;

        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hashed)
    }

    /// `Ok(false)` on mismatch. A stored hash that bcrypt cannot parse is also
    /// a mismatch, so a corrupt row can never log anyone in.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let hash = hash.to_string();

        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
        match matched {
            Ok(ok) => Ok(ok),
            Err(err) => {
                tracing::warn!(error = %err, "stored password hash is unreadable");
                Ok(false)
            }
        }
    }
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err("password must be at least 8 characters");
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err("password must be at most 72 bytes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts; keeps the tests fast.
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash("senha12345").await.unwrap();

        assert_ne!(hash, "senha12345");
        assert!(hasher.verify("senha12345", &hash).await.unwrap());
        assert!(!hasher.verify("wrong-password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = hasher();
        let a = hasher.hash("senha12345").await.unwrap();
        let b = hasher.hash("senha12345").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn garbage_hash_is_a_mismatch() {
        assert!(!hasher().verify("senha12345", "not-a-bcrypt-hash").await.unwrap());
    }

    #[test]
    fn length_limits() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }
}
