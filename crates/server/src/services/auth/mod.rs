//! Bearer token verification.
//!
//! Tokens are compact JWS strings signed with a key shared with the issuer.
//! Only the HMAC family (`HS256`, `HS384`, `HS512`) is accepted; a token that
//! declares `none` or an asymmetric algorithm is rejected before any claim is
//! looked at.
//!
//! # Claims
//!
//! ```json
//! {
//!   "user_id": 7,
//!   "can_create_users": true,
//!   "can_delete_users": false,
//!   "can_update_users": false,
//!   "can_view_users": true,
//!   "iss": "auth.internal",
//!   "exp": 2000000000
//! }
//! ```
//!
//! `exp` and `nbf` are enforced when present. The issuer is compared only
//! when one is configured.

mod error;

pub use error::AuthError;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;

use users_core::{Capabilities, Principal, UserId};

use crate::config::JwtConfig;

/// Turns a bearer token into a [`Principal`].
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and extract the caller's identity and capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token cannot be trusted.
    fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Claims carried by an access token.
#[derive(Debug, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
struct AuthClaims {
    user_id: i64,
    #[serde(default)]
    can_create_users: bool,
    #[serde(default)]
    can_delete_users: bool,
    #[serde(default)]
    can_update_users: bool,
    #[serde(default)]
    can_view_users: bool,
}

impl From<AuthClaims> for Principal {
    fn from(claims: AuthClaims) -> Self {
        Self::new(
            UserId::new(claims.user_id),
            Capabilities {
                create: claims.can_create_users,
                delete: claims.can_delete_users,
                update_others: claims.can_update_users,
                view_others: claims.can_view_users,
            },
        )
    }
}

/// HMAC-signed JWT verifier.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("key", &"[REDACTED]")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtVerifier {
    /// Create a verifier from the configured secret and expected issuer.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Bounds are checked when the token declares them, never required.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
            issuer: config.issuer.clone(),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        // A header that fails to parse (including alg "none") never reaches
        // claim decoding, so a JSON error below is always about the claims.
        decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token header");
            AuthError::InvalidCredential
        })?;

        // Signature and time bounds are checked before the claims are typed,
        // so a bad token is reported as such whatever its payload holds.
        let claims = decode::<Value>(token, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                match e.kind() {
                    ErrorKind::Json(_) => AuthError::UnexpectedClaimsShape,
                    _ => AuthError::InvalidCredential,
                }
            })?
            .claims;

        if !self.issuer.is_empty() {
            let issuer = claims.get("iss").and_then(Value::as_str);
            if issuer != Some(self.issuer.as_str()) {
                tracing::debug!(issuer = ?issuer, "Rejected token issuer");
                return Err(AuthError::UnexpectedIssuer);
            }
        }

        let claims: AuthClaims = serde_json::from_value(claims).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token claims");
            AuthError::UnexpectedClaimsShape
        })?;

        Ok(claims.into())
    }
}
