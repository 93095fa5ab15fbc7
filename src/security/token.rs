//! Signed access tokens (HMAC JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_MINUTE, TOKEN_TYPE_BEARER};
use crate::domain::{User, UserId};
use crate::errors::{AppError, AppResult};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default)]
    pub jti: String,
}

impl AccessClaims {
    /// Subject as a user id.
    pub fn user_id(&self) -> AppResult<UserId> {
        self.sub
            .parse::<i32>()
            .map(UserId)
            .map_err(|_| AppError::TokenInvalid)
    }
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 1800)]
    pub expires_in: i64,
}

/// Issues and verifies tokens with one secret and algorithm.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl_minutes: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("default_ttl_minutes", &self.default_ttl_minutes)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], algorithm: Algorithm, default_ttl_minutes: i64) -> Self {
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            default_ttl_minutes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret_bytes(),
            config.jwt_algorithm,
            config.access_token_expire_minutes,
        )
    }

    /// Sign `claims` plus `iat` and a fresh `jti`.
    ///
    /// `exp` is added only when the effective ttl is positive; `None`
    /// falls back to the configured default.
    pub fn issue_token(&self, claims: &Map<String, Value>, ttl_minutes: Option<i64>) -> AppResult<String> {
        let now = Utc::now();
        let ttl = ttl_minutes.unwrap_or(self.default_ttl_minutes);

        let mut payload = claims.clone();
        payload.insert("iat".into(), Value::from(now.timestamp()));
        payload.insert("jti".into(), Value::from(Uuid::new_v4().to_string()));
        if ttl > 0 {
            let expires_at = now + Duration::minutes(ttl);
            payload.insert("exp".into(), Value::from(expires_at.timestamp()));
        }

        encode(&Header::new(self.algorithm), &payload, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))
    }

    /// Verify signature and expiry, returning the raw claims.
    pub fn verify_token(&self, token: &str) -> AppResult<Map<String, Value>> {
        self.decode_as(token)
    }

    /// Issue an access token for a persisted user.
    pub fn issue_access_token(&self, user: &User) -> AppResult<TokenResponse> {
        let id = user
            .id()
            .ok_or_else(|| AppError::internal("Cannot issue a token for an unsaved user"))?;

        let mut claims = Map::new();
        claims.insert("sub".into(), Value::from(id.to_string()));
        claims.insert("email".into(), Value::from(user.email()));

        let access_token = self.issue_token(&claims, None)?;
        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.default_ttl_minutes.max(0) * SECONDS_PER_MINUTE,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<AccessClaims> {
        self.decode_as(token)
    }

    fn decode_as<T: DeserializeOwned>(&self, token: &str) -> AppResult<T> {
        if token.is_empty() {
            return Err(AppError::TokenInvalid);
        }

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::TokenInvalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-that-is-at-least-32-chars";

    fn service() -> TokenService {
        TokenService::new(SECRET, Algorithm::HS256, 30)
    }

    fn claims(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = service();
        let token = tokens
            .issue_token(&claims(&[("sub", Value::from("7"))]), None)
            .unwrap();
        let decoded = tokens.verify_token(&token).unwrap();

        assert_eq!(decoded["sub"], "7");
        assert!(decoded.contains_key("iat"));
        assert!(decoded.contains_key("jti"));
        let lifetime = decoded["exp"].as_i64().unwrap() - decoded["iat"].as_i64().unwrap();
        assert_eq!(lifetime, 30 * 60);
    }

    #[test]
    fn test_zero_ttl_omits_expiry() {
        let tokens = service();
        let token = tokens.issue_token(&Map::new(), Some(0)).unwrap();
        let decoded = tokens.verify_token(&token).unwrap();

        assert!(!decoded.contains_key("exp"));
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let tokens = service();
        let past = Utc::now().timestamp() - 60;
        let token = tokens
            .issue_token(&claims(&[("exp", Value::from(past))]), Some(0))
            .unwrap();

        assert!(matches!(tokens.verify_token(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_tampered_or_foreign_token_is_invalid() {
        let tokens = service();
        let token = tokens.issue_token(&Map::new(), None).unwrap();
        let other = TokenService::new(b"another-secret-key-that-is-32-chars-long", Algorithm::HS256, 30);

        assert!(matches!(other.verify_token(&token), Err(AppError::TokenInvalid)));
        assert!(matches!(tokens.verify_token("not.a.token"), Err(AppError::TokenInvalid)));
        assert!(matches!(tokens.verify_token(""), Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_algorithm_mismatch_is_invalid() {
        let token = TokenService::new(SECRET, Algorithm::HS512, 30)
            .issue_token(&Map::new(), None)
            .unwrap();

        assert!(matches!(service().verify_token(&token), Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_jti_is_unique() {
        let tokens = service();
        let first = tokens.verify_token(&tokens.issue_token(&Map::new(), None).unwrap()).unwrap();
        let second = tokens.verify_token(&tokens.issue_token(&Map::new(), None).unwrap()).unwrap();

        assert_ne!(first["jti"], second["jti"]);
    }

    #[test]
    fn test_access_token_for_user() {
        let tokens = service();
        let user = User::create("jane@example.com", "hash", None)
            .unwrap()
            .persisted(UserId(12), Utc::now(), Utc::now());

        let response = tokens.issue_access_token(&user).unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 1800);

        let claims = tokens.verify_access_token(&response.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId(12));
        assert_eq!(claims.email, "jane@example.com");
    }

    #[test]
    fn test_access_token_requires_persisted_user() {
        let user = User::create("jane@example.com", "hash", None).unwrap();
        assert!(matches!(service().issue_access_token(&user), Err(AppError::Internal(_))));
    }
}
