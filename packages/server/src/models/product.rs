use std::collections::HashMap;

use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::images::Upload;
use crate::catalog::service::{ProductCreate, ProductUpdate};
use crate::catalog::variants::{VariantDraft, VariantKey};
use crate::entity::{product, variant};
use crate::error::AppError;
use crate::extractors::multipart::{file_field, text_field};
use crate::models::shared::{
    parse_decimal_field, parse_i32_field, require_non_negative, validate_name,
};

/// Multipart field-name prefix carrying a variant image correlation key,
/// e.g. `variant_image:12` or `variant_image:new:0`.
pub const VARIANT_IMAGE_PREFIX: &str = "variant_image:";

#[derive(Serialize, utoipa::ToSchema)]
pub struct VariantResponse {
    pub id: i32,
    pub product_id: i32,
    pub name: Option<String>,
    pub price: Decimal,
    /// Canonical store-relative image reference, if any.
    pub image: Option<String>,
}

/// Product without its variant list, used inside category detail responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductSummary {
    pub id: i32,
    pub category_id: i32,
    pub brand: Option<String>,
    pub name: String,
    pub description: String,
    pub options: Vec<String>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full product representation with variants.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub category_id: i32,
    pub brand: Option<String>,
    pub name: String,
    pub description: String,
    pub options: Vec<String>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    /// Ordered canonical image references (store-relative paths).
    pub images: Vec<String>,
    pub variants: Vec<VariantResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductListResponse {
    pub data: Vec<ProductSummary>,
    pub total: u64,
}

impl From<variant::Model> for VariantResponse {
    fn from(m: variant::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            name: m.name,
            price: m.price,
            image: m.image,
        }
    }
}

impl From<product::Model> for ProductSummary {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            category_id: m.category_id,
            brand: m.brand,
            name: m.name,
            description: m.description,
            options: m.options.0,
            price: m.price,
            discount: m.discount,
            images: m.images.0,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl ProductResponse {
    pub fn from_parts(m: product::Model, variants: Vec<variant::Model>) -> Self {
        Self {
            id: m.id,
            category_id: m.category_id,
            brand: m.brand,
            name: m.name,
            description: m.description,
            options: m.options.0,
            price: m.price,
            discount: m.discount,
            images: m.images.0,
            variants: variants.into_iter().map(VariantResponse::from).collect(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Accumulator for the fields shared by the create and update forms.
#[derive(Default)]
struct ProductFields {
    category_id: Option<i32>,
    brand: Option<String>,
    name: Option<String>,
    description: Option<String>,
    options: Vec<String>,
    price: Option<Decimal>,
    discount: Option<Decimal>,
    images: Vec<Upload>,
    kept_images: Vec<String>,
    new_images: Vec<Upload>,
    variants: Vec<VariantDraft>,
    variant_images: HashMap<VariantKey, Upload>,
}

async fn collect_product_fields(
    mut multipart: Multipart,
    max_upload_size: u64,
) -> Result<ProductFields, AppError> {
    let mut fields = ProductFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("category_id") => {
                let raw = text_field(field, "category_id").await?;
                fields.category_id = Some(parse_i32_field("category_id", &raw)?);
            }
            Some("brand") => fields.brand = Some(text_field(field, "brand").await?),
            Some("name") => fields.name = Some(text_field(field, "name").await?),
            Some("description") => {
                fields.description = Some(text_field(field, "description").await?)
            }
            Some("options") => fields.options.push(text_field(field, "options").await?),
            Some("price") => {
                let raw = text_field(field, "price").await?;
                fields.price = Some(parse_decimal_field("price", &raw)?);
            }
            Some("discount") => {
                let raw = text_field(field, "discount").await?;
                if !raw.trim().is_empty() {
                    fields.discount = Some(parse_decimal_field("discount", &raw)?);
                }
            }
            Some("images") => fields
                .images
                .push(file_field(field, "images", max_upload_size).await?),
            Some("kept_images") => fields.kept_images.push(text_field(field, "kept_images").await?),
            Some("new_images") => fields
                .new_images
                .push(file_field(field, "new_images", max_upload_size).await?),
            Some("variants") => {
                let raw = text_field(field, "variants").await?;
                fields.variants = parse_variants_json(&raw)?;
            }
            Some(other) if other.starts_with(VARIANT_IMAGE_PREFIX) => {
                let key = VariantKey::parse(&other[VARIANT_IMAGE_PREFIX.len()..])?;
                let upload = file_field(field, "variant_image", max_upload_size).await?;
                if fields.variant_images.insert(key, upload).is_some() {
                    return Err(AppError::Validation(format!(
                        "Duplicate variant image field '{other}'"
                    )));
                }
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(fields)
}

fn parse_variants_json(raw: &str) -> Result<Vec<VariantDraft>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let drafts: Vec<VariantDraft> = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid 'variants' JSON: {e}")))?;
    for draft in &drafts {
        require_non_negative("variants[].price", draft.price)?;
    }
    Ok(drafts)
}

fn required_common(
    fields: &ProductFields,
) -> Result<(String, String, Decimal), AppError> {
    let name = fields
        .name
        .clone()
        .ok_or_else(|| AppError::Validation("Missing 'name' field".into()))?;
    validate_name(&name)?;

    let description = fields
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'description' field".into()))?;

    let price = fields
        .price
        .ok_or_else(|| AppError::Validation("Missing 'price' field".into()))?;
    require_non_negative("price", price)?;
    if let Some(discount) = fields.discount {
        require_non_negative("discount", discount)?;
    }

    Ok((name, description, price))
}

/// Parse the `POST /products` multipart body.
pub async fn parse_create_form(
    multipart: Multipart,
    max_upload_size: u64,
) -> Result<ProductCreate, AppError> {
    let fields = collect_product_fields(multipart, max_upload_size).await?;
    let (name, description, price) = required_common(&fields)?;

    let category_id = fields
        .category_id
        .ok_or_else(|| AppError::Validation("Missing 'category_id' field".into()))?;

    Ok(ProductCreate {
        category_id,
        brand: fields.brand.filter(|b| !b.trim().is_empty()),
        name,
        description,
        options: fields.options,
        price,
        discount: fields.discount,
        images: fields.images,
        variants: fields.variants,
        variant_images: fields.variant_images,
    })
}

/// Parse the `PATCH /products/{id}` multipart body.
pub async fn parse_update_form(
    multipart: Multipart,
    max_upload_size: u64,
) -> Result<ProductUpdate, AppError> {
    let fields = collect_product_fields(multipart, max_upload_size).await?;
    let (name, description, price) = required_common(&fields)?;

    Ok(ProductUpdate {
        brand: fields.brand.filter(|b| !b.trim().is_empty()),
        name,
        description,
        options: fields.options,
        price,
        discount: fields.discount,
        kept_images: fields.kept_images,
        new_images: fields.new_images,
        variants: fields.variants,
        variant_images: fields.variant_images,
    })
}
