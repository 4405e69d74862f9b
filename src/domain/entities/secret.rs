//! Persisted signing secret.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Storage for the token signing secret.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// The previously persisted secret, if any.
    async fn get_secret(&self) -> Result<Option<Vec<u8>>, AppError>;

    /// Persist the secret.
    async fn put_secret(&self, secret: &[u8]) -> Result<(), AppError>;
}
