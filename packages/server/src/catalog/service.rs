//! Catalog orchestration.
//!
//! Each operation follows the same discipline: resolve records first,
//! compute the reconciliation plans, execute blob writes, then persist the
//! record changes in one transaction, and only after the commit delete the
//! files nothing references anymore. A commit may never reference a path
//! that was not durably written (write-before-link), and a file may never
//! be deleted while a row still references it (unlink-before-delete).

use std::collections::HashMap;

use common::storage::{BlobStore, MediaPath};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::folder;
use super::images::{ImageReconciler, PendingWrite, Upload};
use super::locks::KeyedLocks;
use super::variants::{self, StoredVariant, VariantDraft, VariantKey};
use crate::entity::product::StringList;
use crate::entity::{category, product, variant};
use crate::error::AppError;
use crate::state::AppState;

/// Category create/update payload after multipart parsing.
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<Upload>,
    /// Update only: clear the stored image without replacing it.
    pub remove_image: bool,
}

/// Product creation payload after multipart parsing.
pub struct ProductCreate {
    pub category_id: i32,
    pub brand: Option<String>,
    pub name: String,
    pub description: String,
    pub options: Vec<String>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub images: Vec<Upload>,
    pub variants: Vec<VariantDraft>,
    pub variant_images: HashMap<VariantKey, Upload>,
}

/// Product update payload after multipart parsing.
pub struct ProductUpdate {
    pub brand: Option<String>,
    pub name: String,
    pub description: String,
    pub options: Vec<String>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    /// References to retain, in relative or absolute form.
    pub kept_images: Vec<String>,
    pub new_images: Vec<Upload>,
    pub variants: Vec<VariantDraft>,
    pub variant_images: HashMap<VariantKey, Upload>,
}

pub struct CatalogService<'a> {
    db: &'a DatabaseConnection,
    blobs: &'a dyn BlobStore,
    locks: &'a KeyedLocks,
    images: ImageReconciler,
}

impl AppState {
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService {
            db: &self.db,
            blobs: self.blob_store.as_ref(),
            locks: &self.catalog_locks,
            images: ImageReconciler::new(&self.config.server.public_url),
        }
    }
}

impl CatalogService<'_> {
    pub async fn get_category(
        &self,
        id: i32,
    ) -> Result<(category::Model, Vec<product::Model>), AppError> {
        let row = self.find_category(id).await?;
        let products = product::Entity::find()
            .filter(product::Column::CategoryId.eq(id))
            .order_by_asc(product::Column::Id)
            .all(self.db)
            .await?;
        Ok((row, products))
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<category::Model, AppError> {
        let txn = self.db.begin().await?;

        let row = category::ActiveModel {
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let row = if input.image.is_some() {
            let target = MediaPath::parse(&folder::category_folder(&row.name, row.id))?;
            let plan = self
                .images
                .reconcile(&[], &[], input.image.into_iter().collect(), &target)?;
            self.apply_writes(&plan.writes).await?;

            let mut active: category::ActiveModel = row.into();
            active.image = Set(plan.final_list.into_iter().next());
            active.update(&txn).await?
        } else {
            row
        };

        txn.commit().await?;
        Ok(row)
    }

    pub async fn update_category(
        &self,
        id: i32,
        input: CategoryInput,
    ) -> Result<category::Model, AppError> {
        let _guard = self.locks.acquire("category", id).await;

        let current = self.find_category(id).await?;

        let existing: Vec<String> = current.image.clone().into_iter().collect();
        let (kept, uploads) = if let Some(upload) = input.image {
            (Vec::new(), vec![upload])
        } else if input.remove_image {
            (Vec::new(), Vec::new())
        } else {
            (existing.clone(), Vec::new())
        };

        // Folder derives from the incoming name: a rename redirects new
        // writes while previously stored files stay where they are.
        let target = MediaPath::parse(&folder::category_folder(&input.name, current.id))?;
        let plan = self.images.reconcile(&existing, &kept, uploads, &target)?;

        self.apply_writes(&plan.writes).await?;

        let mut active: category::ActiveModel = current.into();
        active.name = Set(input.name.trim().to_string());
        active.description = Set(input.description);
        active.image = Set(plan.final_list.into_iter().next());
        let updated = active.update(self.db).await?;

        self.apply_deletions(&plan.deletions).await;

        Ok(updated)
    }

    /// Delete a category, every product beneath it, their variant rows, and
    /// the whole category media folder.
    pub async fn delete_category(&self, id: i32) -> Result<category::Model, AppError> {
        let _guard = self.locks.acquire("category", id).await;

        let current = self.find_category(id).await?;
        let products = product::Entity::find()
            .filter(product::Column::CategoryId.eq(id))
            .all(self.db)
            .await?;

        let txn = self.db.begin().await?;
        for p in &products {
            variant::Entity::delete_many()
                .filter(variant::Column::ProductId.eq(p.id))
                .exec(&txn)
                .await?;
        }
        product::Entity::delete_many()
            .filter(product::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        category::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        // Rows are gone; the folder subtree (category image, all product
        // and variant images) goes last.
        let target = MediaPath::parse(&folder::category_folder(&current.name, current.id))?;
        if let Err(e) = self.blobs.delete_prefix(&target).await {
            tracing::warn!(folder = %target, error = %e, "failed to remove category media folder");
        }

        Ok(current)
    }

    pub async fn get_product(
        &self,
        id: i32,
    ) -> Result<(product::Model, Vec<variant::Model>), AppError> {
        let row = self.find_product(id).await?;
        let variant_rows = self.load_variants(id).await?;
        Ok((row, variant_rows))
    }

    pub async fn create_product(
        &self,
        input: ProductCreate,
    ) -> Result<(product::Model, Vec<variant::Model>), AppError> {
        let parent = category::Entity::find_by_id(input.category_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Category {} not found", input.category_id))
            })?;

        let now = chrono::Utc::now();
        let txn = self.db.begin().await?;

        let row = product::ActiveModel {
            category_id: Set(parent.id),
            brand: Set(input.brand),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            options: Set(StringList(input.options)),
            price: Set(input.price),
            discount: Set(input.discount),
            images: Set(StringList::default()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let target = MediaPath::parse(&folder::product_folder(
            &parent.name,
            parent.id,
            &row.name,
            row.id,
        ))?;

        let image_plan = self.images.reconcile(&[], &[], input.images, &target)?;
        let variant_plan =
            variants::reconcile(&[], &input.variants, input.variant_images, &target)?;

        self.apply_writes(&image_plan.writes).await?;
        self.apply_writes(&variant_plan.writes).await?;

        let mut active: product::ActiveModel = row.into();
        active.images = Set(StringList(image_plan.final_list));
        let row = active.update(&txn).await?;

        for insert in &variant_plan.inserts {
            variant::ActiveModel {
                product_id: Set(row.id),
                name: Set(insert.name.clone()),
                price: Set(insert.price),
                image: Set(insert.image.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        let variant_rows = self.load_variants(row.id).await?;
        Ok((row, variant_rows))
    }

    pub async fn update_product(
        &self,
        id: i32,
        input: ProductUpdate,
    ) -> Result<(product::Model, Vec<variant::Model>), AppError> {
        let _guard = self.locks.acquire("product", id).await;

        let current = self.find_product(id).await?;
        // A product must always resolve its category; a dangling foreign
        // key is a data-integrity fault, not a client error.
        let parent = category::Entity::find_by_id(current.category_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "category {} missing for product {id}",
                    current.category_id
                ))
            })?;

        let target = MediaPath::parse(&folder::product_folder(
            &parent.name,
            parent.id,
            &input.name,
            current.id,
        ))?;

        let image_plan =
            self.images
                .reconcile(&current.images.0, &input.kept_images, input.new_images, &target)?;

        let existing_rows = self.load_variants(id).await?;
        let stored: Vec<StoredVariant> = existing_rows
            .iter()
            .map(|v| StoredVariant {
                id: v.id,
                name: v.name.clone(),
                price: v.price,
                image: v.image.clone(),
            })
            .collect();
        let variant_plan =
            variants::reconcile(&stored, &input.variants, input.variant_images, &target)?;

        self.apply_writes(&image_plan.writes).await?;
        self.apply_writes(&variant_plan.writes).await?;

        let txn = self.db.begin().await?;

        let mut active: product::ActiveModel = current.into();
        active.brand = Set(input.brand);
        active.name = Set(input.name.trim().to_string());
        active.description = Set(input.description);
        active.options = Set(StringList(input.options));
        active.price = Set(input.price);
        active.discount = Set(input.discount);
        active.images = Set(StringList(image_plan.final_list));
        active.updated_at = Set(chrono::Utc::now());
        let updated = active.update(&txn).await?;

        for vid in &variant_plan.delete_ids {
            variant::Entity::delete_by_id(*vid).exec(&txn).await?;
        }
        for change in &variant_plan.updates {
            let mut row = variant::ActiveModel {
                id: Set(change.id),
                name: Set(change.name.clone()),
                price: Set(change.price),
                ..Default::default()
            };
            if let Some(ref image) = change.image {
                row.image = Set(Some(image.clone()));
            }
            row.update(&txn).await?;
        }
        for insert in &variant_plan.inserts {
            variant::ActiveModel {
                product_id: Set(id),
                name: Set(insert.name.clone()),
                price: Set(insert.price),
                image: Set(insert.image.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        self.apply_deletions(&image_plan.deletions).await;
        self.apply_deletions(&variant_plan.deletions).await;

        let variant_rows = self.load_variants(id).await?;
        Ok((updated, variant_rows))
    }

    /// Delete a product, its variant rows, and its whole media folder.
    pub async fn delete_product(
        &self,
        id: i32,
    ) -> Result<(product::Model, Vec<variant::Model>), AppError> {
        let _guard = self.locks.acquire("product", id).await;

        let current = self.find_product(id).await?;
        let parent = category::Entity::find_by_id(current.category_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "category {} missing for product {id}",
                    current.category_id
                ))
            })?;
        let variant_rows = self.load_variants(id).await?;

        let txn = self.db.begin().await?;
        variant::Entity::delete_many()
            .filter(variant::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        product::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let target = MediaPath::parse(&folder::product_folder(
            &parent.name,
            parent.id,
            &current.name,
            current.id,
        ))?;
        if let Err(e) = self.blobs.delete_prefix(&target).await {
            tracing::warn!(folder = %target, error = %e, "failed to remove product media folder");
        }

        Ok((current, variant_rows))
    }

    async fn find_category(&self, id: i32) -> Result<category::Model, AppError> {
        category::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    async fn find_product(&self, id: i32) -> Result<product::Model, AppError> {
        product::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    async fn load_variants(&self, product_id: i32) -> Result<Vec<variant::Model>, AppError> {
        Ok(variant::Entity::find()
            .filter(variant::Column::ProductId.eq(product_id))
            .order_by_asc(variant::Column::Id)
            .all(self.db)
            .await?)
    }

    /// Write every pending blob; any failure aborts before the record is
    /// touched, leaving at worst unlinked files.
    async fn apply_writes(&self, writes: &[PendingWrite]) -> Result<(), AppError> {
        for write in writes {
            self.blobs.save(&write.path, &write.bytes).await?;
        }
        Ok(())
    }

    /// Delete files whose references were just removed. Absence is already
    /// satisfied; other failures are logged and skipped, the files are
    /// unreferenced garbage at this point.
    async fn apply_deletions(&self, deletions: &[MediaPath]) {
        for path in deletions {
            if let Err(e) = self.blobs.delete(path).await {
                tracing::warn!(path = %path, error = %e, "failed to delete unlinked media file");
            }
        }
    }
}
