//! User CRUD handlers.
//!
//! Every handler resolves the caller, then the target id, then checks the
//! capability, and only then reads the body. A caller who may not perform an
//! action learns nothing about whether their payload would have been valid.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use users_core::{CreateUserParams, RequiredText, UpdateUserParams, User, UserAction, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::Authenticated;
use crate::state::AppState;

// =============================================================================
// Payloads
// =============================================================================

/// Body of `POST /api/v1/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
}

impl TryFrom<CreateUserRequest> for CreateUserParams {
    type Error = AppError;

    fn try_from(req: CreateUserRequest) -> Result<Self> {
        Ok(Self {
            first_name: required("first_name", &req.first_name)?,
            last_name: required("last_name", &req.last_name)?,
            phone_number: required("phone_number", &req.phone_number)?,
            address: required("address", &req.address)?,
        })
    }
}

/// Body of `PATCH /api/v1/users/{id}`. Absent and `null` fields are left
/// unchanged; any string, empty included, replaces the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUserParams {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            address: req.address,
        }
    }
}

/// User representation returned by the API.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i64(),
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            address: user.address,
            created_at: user.created_at,
        }
    }
}

fn required(field: &str, value: &str) -> Result<RequiredText> {
    RequiredText::parse(value).map_err(|e| AppError::Validation(format!("{field}: {e}")))
}

fn parse_id(raw: &str) -> Result<UserId> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid user id: {raw}")))
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("invalid body: {e}")))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/v1/users`
pub async fn create<R: UserRepository>(
    State(state): State<AppState<R>>,
    Authenticated(principal): Authenticated,
    body: Bytes,
) -> Result<(StatusCode, Json<UserResponse>)> {
    principal.authorize(UserAction::Create)?;

    let params: CreateUserParams = parse_body::<CreateUserRequest>(&body)?.try_into()?;
    let user = state.users().create_user(params).await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /api/v1/users/{id}`
pub async fn show<R: UserRepository>(
    State(state): State<AppState<R>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let id = parse_id(&id)?;
    principal.authorize(UserAction::View(id))?;

    let user = state.users().get_user(id).await?;
    Ok(Json(user.into()))
}

/// `PATCH /api/v1/users/{id}`
pub async fn update<R: UserRepository>(
    State(state): State<AppState<R>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UserResponse>> {
    let id = parse_id(&id)?;
    principal.authorize(UserAction::Update(id))?;

    let params: UpdateUserParams = parse_body::<UpdateUserRequest>(&body)?.into();
    let user = state.users().update_user(id, params).await?;

    tracing::info!(user_id = %id, "User updated");
    Ok(Json(user.into()))
}

/// `DELETE /api/v1/users/{id}`
pub async fn delete<R: UserRepository>(
    State(state): State<AppState<R>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    principal.authorize(UserAction::Delete(id))?;

    state.users().delete_user(id).await?;

    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
