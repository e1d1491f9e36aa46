use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::{EntityTrait, QueryOrder};
use tracing::instrument;

use crate::entity::category;
use crate::error::{AppError, ErrorBody};
use crate::models::category::{
    CategoryDetailResponse, CategoryListResponse, CategoryResponse, parse_category_form,
};
use crate::models::product::ProductSummary;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List all categories",
    responses(
        (status = 200, description = "Category list", body = CategoryListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, AppError> {
    let rows = category::Entity::find()
        .order_by_asc(category::Column::Id)
        .all(&state.db)
        .await?;

    let total = rows.len() as u64;
    Ok(Json(CategoryListResponse {
        data: rows.into_iter().map(CategoryResponse::from).collect(),
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Fetch a category with its products",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category detail", body = CategoryDetailResponse),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(category_id = id))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryDetailResponse>, AppError> {
    let (row, products) = state.catalog().get_category(id).await?;
    Ok(Json(CategoryDetailResponse::from_parts(
        row,
        products.into_iter().map(ProductSummary::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "Multipart form: `name` (required), `description`, `image` (file). \
        The image is stored under the category's derived folder.",
    request_body(content_type = "multipart/form-data", description = "Category fields and optional image"),
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = parse_category_form(multipart, state.config.storage.max_upload_size).await?;
    let row = state.catalog().create_category(form).await?;

    let response = CategoryResponse::from(row);
    let location = format!("/api/v1/categorys/{}", response.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Multipart form: `name` (required), `description`, `image` (file, replaces \
        the stored image), `remove_image` (clears it without replacement). New files are \
        written under the folder derived from the incoming name.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body(content_type = "multipart/form-data", description = "Category fields and optional image"),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(category_id = id))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<CategoryResponse>, AppError> {
    let form = parse_category_form(multipart, state.config.storage.max_upload_size).await?;
    let row = state.catalog().update_category(id, form).await?;
    Ok(Json(CategoryResponse::from(row)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category and its whole media folder",
    description = "Cascades to every product and variant beneath the category; returns the \
        deleted record.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = CategoryResponse),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(category_id = id))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, AppError> {
    let row = state.catalog().delete_category(id).await?;
    Ok(Json(CategoryResponse::from(row)))
}
