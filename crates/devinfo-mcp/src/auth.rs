// crates/devinfo-mcp/src/auth.rs
// ============================================================================
// Module: MCP Auth
// Description: Bearer-token authentication for inbound MCP requests.
// Purpose: Enforce the shared-secret check before any method dispatch.
// Dependencies: sha2, subtle, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`AuthGuard`] checks an optional `Authorization` header against a shared
//! secret configured once at startup. Without a secret every request passes;
//! that posture is logged at construction and never reported as secure.
//! Evaluation is stateless: no lockout and no rate limiting.
//!
//! Security posture: presented tokens are compared through SHA-256 digests in
//! constant time and are only ever exposed as short fingerprints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted `Authorization` header size in bytes.
pub const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;
/// Number of digest bytes rendered in a token fingerprint.
const FINGERPRINT_BYTES: usize = 8;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Authentication method used for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Authentication disabled (development mode).
    Disabled,
    /// Bearer token matched the shared secret.
    BearerToken,
}

impl AuthMethod {
    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::BearerToken => "bearer_token",
        }
    }
}

/// Successful authentication result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    /// Method that admitted the request.
    pub method: AuthMethod,
    /// SHA-256 fingerprint of the presented token, when one was checked.
    pub token_fingerprint: Option<String>,
}

/// Shared-secret bearer authentication guard.
///
/// # Invariants
/// - The secret is held only as a SHA-256 digest.
/// - Configuration is fixed at construction.
#[derive(Clone)]
pub struct AuthGuard {
    /// Digest of the shared secret; `None` disables authentication.
    secret_digest: Option<[u8; 32]>,
}

impl AuthGuard {
    /// Builds a guard from an optional shared secret.
    ///
    /// An absent or empty secret disables authentication and logs a warning.
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        let secret_digest = secret.filter(|value| !value.is_empty()).map(|value| digest(&value));
        if secret_digest.is_none() {
            tracing::warn!(
                "authentication disabled: no shared secret configured, all requests are accepted \
                 (development mode)"
            );
        }
        Self {
            secret_digest,
        }
    }

    /// Builds a guard with authentication disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Returns true when a shared secret is enforced.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.secret_digest.is_some()
    }

    /// Authenticates a presented `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when a secret is configured and the credential
    /// is missing, malformed, or does not match.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<Authorized, AuthError> {
        let Some(expected) = &self.secret_digest else {
            return Ok(Authorized {
                method: AuthMethod::Disabled,
                token_fingerprint: None,
            });
        };
        let token = parse_bearer_token(credential)?;
        let presented = digest(token);
        if !bool::from(presented.as_slice().ct_eq(expected.as_slice())) {
            return Err(AuthError::InvalidToken);
        }
        Ok(Authorized {
            method: AuthMethod::BearerToken,
            token_fingerprint: Some(fingerprint(&presented)),
        })
    }
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard").field("enabled", &self.is_enabled()).finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was presented.
    #[error("missing authorization")]
    MissingCredential,
    /// Credential is not `Bearer <token>`.
    #[error("invalid authorization header")]
    MalformedHeader,
    /// Token does not match the shared secret.
    #[error("invalid bearer token")]
    InvalidToken,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the token from a `Bearer <token>` header value.
fn parse_bearer_token(credential: Option<&str>) -> Result<&str, AuthError> {
    let header = credential.ok_or(AuthError::MissingCredential)?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::MalformedHeader);
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Computes the SHA-256 digest of a secret.
fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Renders a short hex fingerprint of a digest.
fn fingerprint(digest: &[u8; 32]) -> String {
    digest.iter().take(FINGERPRINT_BYTES).map(|byte| format!("{byte:02x}")).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
