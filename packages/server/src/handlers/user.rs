use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, SqlErr};
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::user::{
    CreateUserRequest, DEFAULT_ROLE, UpdateUserRequest, UserResponse, validate_create_user,
    validate_update_user,
};
use crate::state::AppState;
use crate::utils::hash;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Fetch a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id = id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let row = find_user(&state, id).await?;
    Ok(Json(UserResponse::from(row)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_user(&payload)?;

    let password_hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let new_user = user::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        password: Set(password_hash),
        role: Set(payload.role.unwrap_or_else(|| DEFAULT_ROLE.to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let row = new_user
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Validation("Email is already in use".into())
            }
            _ => AppError::from(e),
        })?;

    let response = UserResponse::from(row);
    let location = format!("/api/v1/users/{}", response.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Replace a user's fields",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = id))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_update_user(&payload)?;

    let current = find_user(&state, id).await?;

    let password_hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let mut active: user::ActiveModel = current.into();
    active.name = Set(payload.name.trim().to_string());
    active.email = Set(payload.email.trim().to_string());
    active.password = Set(password_hash);
    active.role = Set(payload.role);

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation("Email is already in use".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(Json(UserResponse::from(updated)))
}

async fn find_user(state: &AppState, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
