//! User domain entity and related types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DomainError;

/// User identifier assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Lower-case and trim an email address the way it is stored.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// User aggregate root.
///
/// Holds a password hash only, never the plaintext. The email is fixed
/// at creation; there is no update path for it.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    id: Option<UserId>,
    email: String,
    password_hash: String,
    name: Option<String>,
    is_active: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

// Don't expose hash in debug output (security)
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("name", &self.name)
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Fields to replace in [`User::with_updates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

impl User {
    /// Create a new active user.
    ///
    /// # Errors
    /// - `InvalidEmail` when the normalized email is empty or lacks `@`
    /// - `MissingPasswordHash` when `password_hash` is empty
    pub fn create(
        email: &str,
        password_hash: impl Into<String>,
        name: Option<String>,
    ) -> Result<Self, DomainError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::InvalidEmail);
        }
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(DomainError::MissingPasswordHash);
        }

        Ok(Self {
            id: None,
            email,
            password_hash,
            name,
            is_active: true,
            created_at: None,
            updated_at: None,
        })
    }

    /// Derive a new snapshot with the given fields replaced.
    pub fn with_updates(&self, changes: UserChanges) -> Result<Self, DomainError> {
        let password_hash = match changes.password_hash {
            Some(hash) if hash.is_empty() => return Err(DomainError::MissingPasswordHash),
            Some(hash) => hash,
            None => self.password_hash.clone(),
        };

        Ok(Self {
            id: self.id,
            email: self.email.clone(),
            password_hash,
            name: changes.name.or_else(|| self.name.clone()),
            is_active: changes.is_active.unwrap_or(self.is_active),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    /// Attach store-assigned identity and timestamps.
    pub fn persisted(self, id: UserId, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: Some(id),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
            ..self
        }
    }

    /// Rebuild a user from storage, restoring its active flag.
    pub fn restore(
        id: UserId,
        email: &str,
        password_hash: impl Into<String>,
        name: Option<String>,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let user = Self::create(email, password_hash, name)?.with_updates(UserChanges {
            is_active: Some(is_active),
            ..Default::default()
        })?;
        Ok(user.persisted(id, created_at, updated_at))
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = 1)]
    pub id: Option<i32>,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User display name
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// Whether the account is active
    pub is_active: bool,
    /// Account creation timestamp
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.0),
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}
