//! Variant reconciliation.
//!
//! A product update carries the full desired variant list. Existing
//! variants absent from it are deleted (with their image files), matching
//! ids are updated in place, and entries without an id become inserts.
//! Uploaded variant images are tied to their target variant by an explicit
//! correlation key carried in the multipart field name.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Deserialize;

use common::storage::MediaPath;

use super::images::{PendingWrite, Upload, fresh_file_name};
use crate::error::AppError;

/// Client-supplied variant descriptor (one element of the `variants` JSON
/// array).
#[derive(Clone, Debug, Deserialize)]
pub struct VariantDraft {
    /// Positive id of an existing variant; absent or 0 means a new variant.
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    pub price: Decimal,
}

impl VariantDraft {
    fn existing_id(&self) -> Option<i32> {
        self.id.filter(|&id| id > 0)
    }
}

/// Correlation key tying an uploaded image to its target variant.
///
/// Wire form is the `<key>` part of a `variant_image:<key>` multipart field
/// name: a decimal id for an existing variant, or `new:<index>` where
/// `<index>` is the zero-based position of the draft among this request's
/// new variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantKey {
    Existing(i32),
    New(usize),
}

impl VariantKey {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if let Some(index) = raw.strip_prefix("new:") {
            let index: usize = index.parse().map_err(|_| {
                AppError::Validation(format!("Invalid variant image key 'new:{index}'"))
            })?;
            return Ok(VariantKey::New(index));
        }

        match raw.parse::<i32>() {
            Ok(id) if id > 0 => Ok(VariantKey::Existing(id)),
            _ => Err(AppError::Validation(format!(
                "Invalid variant image key '{raw}'"
            ))),
        }
    }
}

/// Current state of a stored variant, as the reconciler sees it.
#[derive(Clone, Debug)]
pub struct StoredVariant {
    pub id: i32,
    pub name: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
}

/// An in-place update of an existing variant row.
pub struct VariantUpdate {
    pub id: i32,
    pub name: Option<String>,
    pub price: Decimal,
    /// `Some(path)` replaces the stored image reference; `None` leaves it.
    pub image: Option<String>,
}

/// A new variant row scoped to the product.
pub struct VariantInsert {
    pub name: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
}

/// The reconciliation outcome: row changes plus the file operations they
/// require.
#[derive(Default)]
pub struct VariantPlan {
    pub delete_ids: Vec<i32>,
    pub updates: Vec<VariantUpdate>,
    pub inserts: Vec<VariantInsert>,
    /// Files to remove once no row references them.
    pub deletions: Vec<MediaPath>,
    /// Files that must be durably written before a row references them.
    pub writes: Vec<PendingWrite>,
}

/// Compute the variant plan for one product.
pub fn reconcile(
    existing: &[StoredVariant],
    incoming: &[VariantDraft],
    mut uploads: HashMap<VariantKey, Upload>,
    target_folder: &MediaPath,
) -> Result<VariantPlan, AppError> {
    let mut incoming_ids = HashSet::new();
    for draft in incoming {
        if let Some(id) = draft.existing_id()
            && !incoming_ids.insert(id)
        {
            return Err(AppError::Validation(format!(
                "Duplicate variant id {id} in request"
            )));
        }
    }

    let new_count = incoming.iter().filter(|d| d.existing_id().is_none()).count();
    for key in uploads.keys() {
        match *key {
            VariantKey::Existing(id) if !incoming_ids.contains(&id) => {
                return Err(AppError::Validation(format!(
                    "Variant image references id {id} which is not in the request"
                )));
            }
            VariantKey::New(index) if index >= new_count => {
                return Err(AppError::Validation(format!(
                    "Variant image references new variant index {index} but the request has {new_count} new variants"
                )));
            }
            _ => {}
        }
    }

    let by_id: HashMap<i32, &StoredVariant> = existing.iter().map(|v| (v.id, v)).collect();

    let mut plan = VariantPlan::default();

    for variant in existing {
        if !incoming_ids.contains(&variant.id) {
            plan.delete_ids.push(variant.id);
            if let Some(ref image) = variant.image {
                plan.deletions.push(MediaPath::parse(image)?);
            }
        }
    }

    let mut new_index = 0usize;
    for draft in incoming {
        match draft.existing_id() {
            Some(id) => {
                let current = by_id.get(&id).ok_or_else(|| {
                    AppError::Validation(format!("Unknown variant id {id}"))
                })?;

                let mut image = None;
                if let Some(upload) = uploads.remove(&VariantKey::Existing(id)) {
                    if let Some(ref old) = current.image {
                        plan.deletions.push(MediaPath::parse(old)?);
                    }
                    let path =
                        target_folder.join(&fresh_file_name(upload.file_name.as_deref()))?;
                    image = Some(path.to_string());
                    plan.writes.push(PendingWrite {
                        path,
                        bytes: upload.bytes,
                    });
                }

                plan.updates.push(VariantUpdate {
                    id,
                    name: draft.name.clone(),
                    price: draft.price,
                    image,
                });
            }
            None => {
                let mut image = None;
                if let Some(upload) = uploads.remove(&VariantKey::New(new_index)) {
                    let path =
                        target_folder.join(&fresh_file_name(upload.file_name.as_deref()))?;
                    image = Some(path.to_string());
                    plan.writes.push(PendingWrite {
                        path,
                        bytes: upload.bytes,
                    });
                }

                plan.inserts.push(VariantInsert {
                    name: draft.name.clone(),
                    price: draft.price,
                    image,
                });
                new_index += 1;
            }
        }
    }

    Ok(plan)
}
