//! Password hashing - Argon2id with configurable cost.
//!
//! Hashes are PHC strings, so each one carries its own salt and
//! parameters; verification never needs the configured cost.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordHashCost;
use crate::errors::{AppError, AppResult};

/// Argon2id hasher bound to a cost configuration.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// Build a hasher from cost settings.
    ///
    /// # Errors
    /// `AppError::Config` when Argon2 rejects the parameters.
    pub fn new(cost: PasswordHashCost) -> AppResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AppError::config(format!("Invalid password hash cost: {}", e)))?;
        Ok(Self { params })
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// Validation error when `plain_text` is empty.
    pub fn hash(&self, plain_text: &str) -> AppResult<String> {
        if plain_text.is_empty() {
            return Err(AppError::validation("Password must be a non-empty string"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `false` for empty input or a hash that does not parse.
    pub fn verify(&self, plain_text: &str, hash: &str) -> bool {
        if plain_text.is_empty() || hash.is_empty() {
            return false;
        }
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    #[inline]
    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

/// Hash with the default cost.
pub fn hash_password(plain_text: &str) -> AppResult<String> {
    PasswordHasher::default().hash(plain_text)
}

/// Verify against any Argon2 PHC hash.
pub fn verify_password(plain_text: &str, hash: &str) -> bool {
    PasswordHasher::default().verify(plain_text, hash)
}
