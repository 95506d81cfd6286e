//! Bearer authentication extractor.
//!
//! Every users endpoint takes [`Authenticated`] as its first extractor, so
//! the caller is identified before the path or body is looked at.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use users_core::Principal;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// A request without an `Authorization` header is rejected with
/// [`AppError::Unauthenticated`]; a header that is present but unusable with
/// [`AppError::Auth`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Authenticated(principal): Authenticated) -> impl IntoResponse {
///     format!("Hello, user {}!", principal.id())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Principal);

impl<R> FromRequestParts<AppState<R>> for Authenticated
where
    R: UserRepository,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AppError::Unauthenticated)?;

        let value = header.to_str().map_err(|_| AuthError::InvalidCredential)?;
        let token = bearer_token(value)?;
        let principal = state.verifier().verify(token)?;

        Span::current().record("user_id", principal.id().as_i64());

        Ok(Self(principal))
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly two whitespace-separated parts, the first being
/// `Bearer` (any case).
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredential`] for any other shape.
pub fn bearer_token(value: &str) -> Result<&str, AuthError> {
    let mut parts = value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::InvalidCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Ok("abc"));
        assert_eq!(bearer_token("  Bearer   abc  "), Ok("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_shapes() {
        for value in [
            "",
            "Bearer",
            "Bearer ",
            "abc.def.ghi",
            "Basic dXNlcjpwYXNz",
            "Bearer abc def",
        ] {
            assert_eq!(
                bearer_token(value),
                Err(AuthError::InvalidCredential),
                "{value:?}"
            );
        }
    }
}
