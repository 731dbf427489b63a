//! Password hashing using bcrypt.
//!
//! The cost factor comes from configuration; each digest embeds its own
//! random salt. Hashing is intentionally CPU-intensive, so async
//! callers go through the `spawn_blocking` wrappers.

use anyhow::Result;

/// Password hashing service with a configurable bcrypt cost factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password (blocking operation).
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password on the blocking thread pool, keeping the async
    /// runtime free.
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || {
            bcrypt::hash(&password, cost)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a digest (blocking operation).
    ///
    /// Mismatches and malformed digests both verify as `false`; this
    /// never surfaces an error to the caller.
    pub fn verify(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Verify a password on the blocking thread pool.
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the suite fast; production cost comes from config.
    fn test_service() -> PasswordService {
        PasswordService::new(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let service = test_service();
        let hash = service.hash("Secret123").unwrap();

        assert!(PasswordService::verify("Secret123", &hash));
        assert!(!PasswordService::verify("WrongPass1", &hash));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let service = test_service();
        let hash1 = service.hash("Secret123").unwrap();
        let hash2 = service.hash("Secret123").unwrap();

        // Random salt per call
        assert_ne!(hash1, hash2);
        assert!(PasswordService::verify("Secret123", &hash1));
        assert!(PasswordService::verify("Secret123", &hash2));
    }

    #[test]
    fn test_malformed_digest_verifies_false() {
        assert!(!PasswordService::verify("Secret123", "not-a-bcrypt-digest"));
        assert!(!PasswordService::verify("Secret123", ""));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let service = test_service();
        let hash = service.hash_async("Secret123".to_string()).await.unwrap();

        assert!(
            PasswordService::verify_async("Secret123".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !PasswordService::verify_async("WrongPass1".to_string(), hash)
                .await
                .unwrap()
        );
    }
}
