use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::{EntityTrait, QueryOrder};
use tracing::instrument;

use crate::entity::product;
use crate::error::{AppError, ErrorBody};
use crate::models::product::{
    ProductListResponse, ProductResponse, ProductSummary, parse_create_form, parse_update_form,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List all products",
    responses(
        (status = 200, description = "Product list", body = ProductListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, AppError> {
    let rows = product::Entity::find()
        .order_by_asc(product::Column::Id)
        .all(&state.db)
        .await?;

    let total = rows.len() as u64;
    Ok(Json(ProductListResponse {
        data: rows.into_iter().map(ProductSummary::from).collect(),
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Fetch a product with its variants",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product detail", body = ProductResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(product_id = id))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let (row, variants) = state.catalog().get_product(id).await?;
    Ok(Json(ProductResponse::from_parts(row, variants)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Multipart form: `category_id`, `name`, `description`, `price` (required), \
        `brand`, `options` (repeatable), `discount`, `images` (repeatable files), `variants` \
        (JSON array of `{id?, name?, price}`), and `variant_image:<key>` files where `<key>` \
        is `new:<index>` for this request's new variants. Images are stored under \
        `categorys/<slug>-<id>/products/<slug>-<id>/`.",
    request_body(content_type = "multipart/form-data", description = "Product fields, images and variants"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = parse_create_form(multipart, state.config.storage.max_upload_size).await?;
    let (row, variants) = state.catalog().create_product(form).await?;

    let response = ProductResponse::from_parts(row, variants);
    let location = format!("/api/v1/products/{}", response.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Update a product, reconciling its images and variants",
    description = "Multipart form: the create fields (minus `category_id`) plus `kept_images` \
        (repeatable; stored references to retain, relative or absolute form) and `new_images` \
        (repeatable files). Stored images missing from `kept_images` are deleted. The variant \
        list replaces the stored set: rows whose id is absent are deleted with their image \
        files, matching ids are updated in place, id-less entries are inserted. \
        `variant_image:<id>` files replace that variant's image. New uploads are written \
        under the folder derived from the *incoming* name; a rename leaves earlier files in \
        the old folder.",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Product fields, kept/new images and variants"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(product_id = id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, AppError> {
    let form = parse_update_form(multipart, state.config.storage.max_upload_size).await?;
    let (row, variants) = state.catalog().update_product(id, form).await?;
    Ok(Json(ProductResponse::from_parts(row, variants)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product, its variants and its media folder",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = ProductResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(product_id = id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let (row, variants) = state.catalog().delete_product(id).await?;
    Ok(Json(ProductResponse::from_parts(row, variants)))
}
