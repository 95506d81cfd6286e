//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while turning a bearer credential into a principal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Malformed header or token, bad signature, disallowed algorithm,
    /// expired or not yet valid.
    #[error("invalid credential")]
    InvalidCredential,

    /// An issuer is configured and the token's `iss` is absent or different.
    #[error("unexpected token issuer")]
    UnexpectedIssuer,

    /// Signature is valid but the claims do not have the expected shape.
    #[error("unexpected claims shape")]
    UnexpectedClaimsShape,
}
