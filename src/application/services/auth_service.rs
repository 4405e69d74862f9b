//! Authentication Service
//!
//! Provisions the token signing secret and issues/validates the anonymous
//! user tokens that authorize writes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::domain::SecretRepository;
use crate::shared::error::AppError;
use crate::shared::fatal::FatalSignal;

/// Length of the signing secret in bytes (256 bits).
pub const SECRET_LEN: usize = 32;

/// Fills a buffer from a cryptographically secure source.
pub type RandomSource = fn(&mut [u8]) -> Result<(), String>;

fn os_random(buf: &mut [u8]) -> Result<(), String> {
    OsRng.try_fill_bytes(buf).map_err(|e| e.to_string())
}

/// Failure to obtain a signing secret. The process cannot serve safely
/// without one.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProvisioningError {
    #[error("secure random source unavailable: {0}")]
    RandomUnavailable(String),

    #[error("secret store failure: {0}")]
    Store(String),

    #[error("stored secret has {0} bytes, expected {SECRET_LEN}")]
    Corrupt(usize),
}

/// Lazily obtains the signing secret: loaded from the store when present,
/// generated and persisted otherwise, then cached for the process lifetime.
pub struct SecretProvisioner {
    repo: Arc<dyn SecretRepository>,
    random: RandomSource,
    cached: OnceCell<Vec<u8>>,
}

impl SecretProvisioner {
    pub fn new(repo: Arc<dyn SecretRepository>) -> Self {
        Self::with_random_source(repo, os_random)
    }

    pub fn with_random_source(repo: Arc<dyn SecretRepository>, random: RandomSource) -> Self {
        Self { repo, random, cached: OnceCell::new() }
    }

    /// The signing secret. Consults the store at most once per successful
    /// initialization; concurrent first callers share one initialization.
    pub async fn secret(&self) -> Result<&[u8], ProvisioningError> {
        let secret = self.cached.get_or_try_init(|| self.load_or_create()).await?;
        Ok(secret.as_slice())
    }

    pub fn is_provisioned(&self) -> bool {
        self.cached.initialized()
    }

    async fn load_or_create(&self) -> Result<Vec<u8>, ProvisioningError> {
        let stored = self
            .repo
            .get_secret()
            .await
            .map_err(|e| ProvisioningError::Store(e.to_string()))?;

        if let Some(secret) = stored {
            if secret.len() != SECRET_LEN {
                return Err(ProvisioningError::Corrupt(secret.len()));
            }
            tracing::debug!("Loaded signing secret from store");
            return Ok(secret);
        }

        let mut secret = vec![0u8; SECRET_LEN];
        (self.random)(&mut secret).map_err(ProvisioningError::RandomUnavailable)?;

        self.repo
            .put_secret(&secret)
            .await
            .map_err(|e| ProvisioningError::Store(e.to_string()))?;

        tracing::info!("Generated and persisted a new signing secret");
        Ok(secret)
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Issued anonymous user credentials
#[derive(Debug, Clone)]
pub struct IssuedUser {
    pub userid: String,
    pub token: String,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired | AuthError::InvalidToken => AppError::Unauthorized(err.to_string()),
            AuthError::Provisioning(e) => AppError::Provisioning(e.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a new anonymous user and its token
    async fn issue_user(&self) -> Result<IssuedUser, AuthError>;

    /// Validate a token and extract the user ID
    async fn validate_token(&self, token: &str) -> Result<String, AuthError>;
}

/// AuthService implementation
pub struct AuthServiceImpl {
    provisioner: Arc<SecretProvisioner>,
    fatal: FatalSignal,
    token_expiry_days: i64,
}

impl AuthServiceImpl {
    pub fn new(provisioner: Arc<SecretProvisioner>, fatal: FatalSignal, token_expiry_days: i64) -> Self {
        Self { provisioner, fatal, token_expiry_days }
    }

    /// Secret access that escalates provisioning failures to the fatal signal.
    async fn secret(&self) -> Result<&[u8], AuthError> {
        self.provisioner.secret().await.map_err(|e| {
            self.fatal.raise(format!("signing secret: {}", e));
            AuthError::Provisioning(e)
        })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn issue_user(&self) -> Result<IssuedUser, AuthError> {
        let secret = self.secret().await?;

        let userid = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let claims = Claims {
            sub: userid.clone(),
            exp: (now + Duration::days(self.token_expiry_days)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        tracing::debug!(userid = %userid, "Issued user token");
        Ok(IssuedUser { userid, token })
    }

    async fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        let secret = self.secret().await?;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(token_data.claims.sub)
    }
}
