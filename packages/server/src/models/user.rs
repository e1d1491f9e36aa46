use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::shared::validate_name;

pub const DEFAULT_ROLE: &str = "customer";

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `customer`.
    pub role: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    /// New password; re-hashed on every update.
    pub password: String,
    pub role: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role: m.role,
            created_at: m.created_at,
        }
    }
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.len() < 3 || !email.contains('@') || email.chars().count() > 256 {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_user(req: &CreateUserRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    Ok(())
}

pub fn validate_update_user(req: &UpdateUserRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    Ok(())
}
