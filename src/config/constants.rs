//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default offset into a listing
pub const DEFAULT_PAGE_OFFSET: u64 = 0;

// =============================================================================
// Money
// =============================================================================

/// Number of fractional digits kept for monetary amounts
pub const MONEY_SCALE: u32 = 2;

/// Largest storable amount in cents (`NUMERIC(12,2)` holds 9_999_999_999.99)
pub const MAX_MONEY_CENTS: i64 = 999_999_999_999;

// =============================================================================
// Authentication & Security
// =============================================================================

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Default JWT signing algorithm
pub const DEFAULT_JWT_ALGORITHM: &str = "HS256";

/// JWT algorithms accepted with a shared secret
pub const SUPPORTED_JWT_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per minute (for token expiration calculation)
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Argon2 memory cost in KiB (argon2 crate default)
pub const DEFAULT_PASSWORD_HASH_MEMORY_KIB: u32 = 19_456;

/// Argon2 iteration count (argon2 crate default)
pub const DEFAULT_PASSWORD_HASH_ITERATIONS: u32 = 2;

/// Argon2 lanes (argon2 crate default)
pub const DEFAULT_PASSWORD_HASH_PARALLELISM: u32 = 1;

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Methods allowed by the CORS layer
pub const CORS_ALLOWED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

// =============================================================================
// Database
// =============================================================================

/// Default database connection URL (for development)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Maximum password length accepted by the API
pub const MAX_PASSWORD_LENGTH: u64 = 128;

/// Maximum display name length
pub const MAX_NAME_LENGTH: u64 = 255;

/// Minimum name length requirement
pub const MIN_NAME_LENGTH: u64 = 1;
