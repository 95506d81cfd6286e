//! Unified HTTP error type.
//!
//! All route handlers return `Result<T, AppError>`. Server-side failures are
//! logged with full detail and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use users_core::AccessDenied;

use crate::services::auth::AuthError;
use crate::services::users::ServiceError;

/// Application-level error type for the users API.
#[derive(Debug, Error)]
pub enum AppError {
    /// The bearer credential was rejected.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// No credential was supplied.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The caller lacks the capability for this action.
    #[error("Forbidden: {0}")]
    Forbidden(#[from] AccessDenied),

    /// Request path or body failed validation.
    #[error("{0}")]
    Validation(String),

    /// User service failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Service(ServiceError::Repository { .. }) => {
                tracing::error!(error = %self, "Request error");
            }
            Self::Auth(_) | Self::Forbidden(_) => {
                tracing::debug!(error = %self, "Request rejected");
            }
            _ => {}
        }

        let status = match &self {
            Self::Auth(_) | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::NotFound) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Repository { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Auth(_) => "Invalid credential".to_string(),
            Self::Unauthenticated => "Unauthenticated".to_string(),
            Self::Forbidden(_) => "Forbidden".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Service(ServiceError::NotFound) => "User not found".to_string(),
            Self::Service(ServiceError::Repository { .. }) => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tracing_test::traced_test;
    use users_core::{CreateUserParams, RequiredText, UserAction, UserId};

    use super::*;
    use crate::db::{InMemoryUserRepository, RepositoryError};
    use crate::services::users::UserService;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AuthError::InvalidCredential.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::UnexpectedIssuer.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::UnexpectedClaimsShape.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AppError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(
                AccessDenied {
                    subject: UserId::new(1),
                    action: UserAction::Delete(UserId::new(1)),
                }
                .into()
            ),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                ServiceError::Repository {
                    context: "get user",
                    source: RepositoryError::DataCorruption("x".into()),
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_repository_failure_logged_once() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.repository().fail_next();
        let params = CreateUserParams {
            first_name: RequiredText::parse("Jane").unwrap(),
            last_name: RequiredText::parse("Doe").unwrap(),
            phone_number: RequiredText::parse("+15550001").unwrap(),
            address: RequiredText::parse("1 Main St").unwrap(),
        };

        let err = service.create_user(params).await.unwrap_err();
        let response = AppError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains("ERROR")).count() {
                1 => Ok(()),
                n => Err(format!("expected one error line, found {n}")),
            }
        });
    }
}
