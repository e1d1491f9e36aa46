use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::service::CategoryInput;
use crate::entity::category;
use crate::error::AppError;
use crate::extractors::multipart::{file_field, text_field};
use crate::models::product::ProductSummary;
use crate::models::shared::{parse_bool_field, validate_name};

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Canonical store-relative image reference; fetch via `/media/{path}`.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category with its products, returned by the get-by-id route.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryDetailResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub products: Vec<ProductSummary>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryListResponse {
    pub data: Vec<CategoryResponse>,
    pub total: u64,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            image: m.image,
            created_at: m.created_at,
        }
    }
}

impl CategoryDetailResponse {
    pub fn from_parts(m: category::Model, products: Vec<ProductSummary>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            image: m.image,
            created_at: m.created_at,
            products,
        }
    }
}

/// Parse the multipart body shared by category create and update.
///
/// Fields: `name` (required), `description`, `image` (file),
/// `remove_image` (update only).
pub async fn parse_category_form(
    mut multipart: Multipart,
    max_upload_size: u64,
) -> Result<CategoryInput, AppError> {
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut image = None;
    let mut remove_image = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("name") => name = Some(text_field(field, "name").await?),
            Some("description") => description = Some(text_field(field, "description").await?),
            Some("image") => image = Some(file_field(field, "image", max_upload_size).await?),
            Some("remove_image") => {
                let raw = text_field(field, "remove_image").await?;
                remove_image = parse_bool_field("remove_image", &raw)?;
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let name = name.ok_or_else(|| AppError::Validation("Missing 'name' field".into()))?;
    validate_name(&name)?;

    Ok(CategoryInput {
        name,
        description: description.filter(|d| !d.trim().is_empty()),
        image,
        remove_image,
    })
}
