//! Bearer credential issuance and verification
//!
//! # Architecture
//!
//! - A credential carries user id, email and admin flag, valid for 7 days
//!   from issuance (`auth_token_ttl_seconds` setting)
//! - Encoding: `base64url(claims JSON) + "." + hex(SHA-256(canonical JSON + secret))`
//! - Canonical JSON: alphabetically sorted keys, no whitespace
//! - The signing secret is a random non-zero i64 stored in the settings table
//!
//! Password digests and reset codes live here as well; both are pure
//! functions over the stored salt/hash columns. No HTTP framework
//! dependencies - request extraction is server-side code.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

/// Default credential lifetime: 7 days
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

// ========================================
// Error Types
// ========================================

/// Credential verification error types
#[derive(Debug, Clone)]
pub enum AuthError {
    /// Token is not `payload.signature` or the payload fails to decode
    Malformed(String),

    /// Signature does not match the calculated value
    InvalidSignature,

    /// Credential expiry timestamp is in the past
    Expired { expired_at: i64, now: i64 },

    /// Database error loading the signing secret
    DatabaseError(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Malformed(reason) => write!(f, "Malformed credential: {}", reason),
            AuthError::InvalidSignature => write!(f, "Invalid credential signature"),
            AuthError::Expired { expired_at, now } => {
                write!(f, "Credential expired at {} (now {})", expired_at, now)
            }
            AuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for AuthError {}

// ========================================
// Identity and Claims
// ========================================

/// The identity asserted by a verified credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: Uuid,
    email: String,
    is_admin: bool,
    exp: i64,
}

// ========================================
// Signing Secret Management
// ========================================

/// Load the credential signing secret from database settings
///
/// Key: `auth_token_secret`, value: non-zero i64. Generated and stored on
/// first use.
#[cfg(feature = "sqlx")]
pub async fn load_token_secret(db: &SqlitePool) -> Result<i64, AuthError> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = 'auth_token_secret'")
            .fetch_optional(db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .parse::<i64>()
            .map_err(|e| AuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_token_secret(db).await,
    }
}

/// Generate and store a fresh signing secret (non-zero random i64)
#[cfg(feature = "sqlx")]
pub async fn initialize_token_secret(db: &SqlitePool) -> Result<i64, AuthError> {
    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES ('auth_token_secret', ?)")
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Credential Issuance and Verification
// ========================================

/// Issue a signed credential for an identity, valid for `ttl_seconds`
pub fn issue_token(identity: &Identity, secret: i64, ttl_seconds: i64) -> String {
    sign_with_expiry(identity, secret, Utc::now().timestamp() + ttl_seconds)
}

/// Sign a credential with an explicit expiry timestamp (unix seconds)
///
/// Exposed for expiry tests; production callers use [`issue_token`].
pub fn sign_with_expiry(identity: &Identity, secret: i64, exp: i64) -> String {
    let claims = serde_json::json!({
        "user_id": identity.user_id,
        "email": identity.email,
        "is_admin": identity.is_admin,
        "exp": exp,
    });

    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signature = calculate_signature(&claims, secret);

    format!("{}.{}", payload, signature)
}

/// Verify a credential and return the identity it asserts
///
/// Fails on malformed encoding, signature mismatch, or expiry. The inverse
/// property `verify(issue(x)) == x` holds until the expiry timestamp passes.
pub fn verify_token(token: &str, secret: i64) -> Result<Identity, AuthError> {
    let (payload, provided_sig) = token
        .split_once('.')
        .ok_or_else(|| AuthError::Malformed("expected payload.signature".to_string()))?;

    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::Malformed(format!("base64: {}", e)))?;

    let claims_value: Value = serde_json::from_slice(&decoded)
        .map_err(|e| AuthError::Malformed(format!("claims JSON: {}", e)))?;

    let calculated = calculate_signature(&claims_value, secret);
    if provided_sig != calculated {
        return Err(AuthError::InvalidSignature);
    }

    let claims: Claims = serde_json::from_value(claims_value)
        .map_err(|e| AuthError::Malformed(format!("claims fields: {}", e)))?;

    let now = Utc::now().timestamp();
    if claims.exp < now {
        return Err(AuthError::Expired {
            expired_at: claims.exp,
            now,
        });
    }

    Ok(Identity {
        user_id: claims.user_id,
        email: claims.email,
        is_admin: claims.is_admin,
    })
}

/// Calculate the credential signature
///
/// SHA-256 over canonical JSON (sorted keys, no whitespace) with the secret
/// appended as a decimal i64 string, rendered as 64 hex characters.
fn calculate_signature(claims: &Value, secret: i64) -> String {
    let canonical = to_canonical_json(claims);
    let mut hasher = Sha256::new();
    hasher.update(format!("{}{}", canonical, secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("\"{}\":{}", k, to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

// ========================================
// Password Digests
// ========================================

/// Generate a random password salt (32 alphanumeric characters)
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Digest a password with its salt (SHA-256, 64 hex characters)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", salt, password).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password against the stored salt and digest
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

// ========================================
// Password Reset Codes
// ========================================

/// Generate a 6-digit numeric reset code
pub fn generate_reset_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

// ========================================
// Tests
// ========================================
