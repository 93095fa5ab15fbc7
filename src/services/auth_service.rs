//! Authentication service - Handles user registration, login and tokens.
//!
//! Password hashing runs on tokio's blocking pool, outside any open
//! unit of work.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::domain::{normalize_email, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWorkFactory;
use crate::security::{AccessClaims, PasswordHasher, TokenResponse, TokenService};
use crate::with_unit_of_work;

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, email: String, password: String, name: Option<String>)
        -> AppResult<User>;

    /// Login and return an access token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify an access token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<AccessClaims>;
}

/// Hash `password` without blocking the async runtime.
pub(crate) async fn hash_blocking(hasher: &PasswordHasher, password: String) -> AppResult<String> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_blocking(hasher: &PasswordHasher, password: String, hash: String) -> AppResult<bool> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {}", e)))
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator {
    factory: Arc<dyn UnitOfWorkFactory>,
    hasher: PasswordHasher,
    tokens: TokenService,
    // Verified against when the email is unknown so both paths cost the same
    dummy_hash: OnceCell<String>,
}

impl Authenticator {
    pub fn new(
        factory: Arc<dyn UnitOfWorkFactory>,
        hasher: PasswordHasher,
        tokens: TokenService,
    ) -> Self {
        Self {
            factory,
            hasher,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    async fn dummy_hash(&self) -> AppResult<String> {
        self.dummy_hash
            .get_or_try_init(|| hash_blocking(&self.hasher, "timing-equalizer".to_string()))
            .await
            .cloned()
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(
        &self,
        email: String,
        password: String,
        name: Option<String>,
    ) -> AppResult<User> {
        // Email and password shape are validated by the handler's ValidatedJson extractor
        let password_hash = hash_blocking(&self.hasher, password).await?;
        let user = User::create(&email, password_hash, name)?;

        let created = with_unit_of_work!(self.factory.as_ref(), |uow| {
            if uow.users().find_by_email(user.email()).await?.is_some() {
                return Err(AppError::conflict("User"));
            }
            let id = uow.users().create(&user).await?;
            let stored = uow.users().find_by_id(id).await?.ok_or_not_found()?;
            uow.commit().await?;
            Ok(stored)
        })?;

        tracing::info!(user_id = ?created.id(), "User registered");
        Ok(created)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = normalize_email(&email);
        let found = with_unit_of_work!(self.factory.as_ref(), |uow| {
            uow.users().find_by_email(&email).await
        })?;

        // Unknown and inactive accounts still pay for one verification so
        // response timing does not reveal which emails exist.
        let candidate = found.filter(User::is_active);
        let hash = match &candidate {
            Some(user) => user.password_hash().to_string(),
            None => self.dummy_hash().await?,
        };
        let password_valid = verify_blocking(&self.hasher, password, hash).await?;

        match candidate {
            Some(user) if password_valid => self.tokens.issue_access_token(&user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<AccessClaims> {
        self.tokens.verify_access_token(token)
    }
}
