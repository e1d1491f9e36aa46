//! Image set reconciliation.
//!
//! Diffs the set of stored image references against the set the client
//! wants to keep, and places newly uploaded files under the target folder.
//! One reconciler serves the category single-image path and the
//! product/variant list paths alike.

use std::collections::HashSet;

use common::storage::{MediaPath, StorageError};
use uuid::Uuid;

/// An uploaded file pending placement in the media tree.
#[derive(Clone)]
pub struct Upload {
    /// Client-declared file name. Only the extension is consulted, and only
    /// when it is a short alphanumeric token; the stored name is generated.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// A blob write scheduled by reconciliation.
pub struct PendingWrite {
    pub path: MediaPath,
    pub bytes: Vec<u8>,
}

/// Outcome of diffing stored references against the client's kept list.
pub struct ImagePlan {
    /// Files to remove once the record no longer references them.
    pub deletions: Vec<MediaPath>,
    /// Files that must be durably written before the record references them.
    pub writes: Vec<PendingWrite>,
    /// Canonical reference list to persist: kept first (original relative
    /// order), new uploads appended in upload order.
    pub final_list: Vec<String>,
}

/// Normalizes references to their store-relative form and computes
/// kept/new/deleted sets.
pub struct ImageReconciler {
    /// `<public_url>/media/`, the absolute presentation prefix clients may
    /// echo back in kept lists.
    media_prefix: String,
}

impl ImageReconciler {
    pub fn new(public_url: &str) -> Self {
        Self {
            media_prefix: format!("{}/media/", public_url.trim_end_matches('/')),
        }
    }

    /// Reduce a reference to its canonical store-relative form.
    pub fn normalize<'a>(&self, reference: &'a str) -> &'a str {
        let r = reference.trim();
        if let Some(rest) = r.strip_prefix(self.media_prefix.as_str()) {
            return rest;
        }
        r.strip_prefix("/media/").unwrap_or(r)
    }

    /// Compute the reconciliation plan for one record's image list.
    ///
    /// `deletions = existing − kept` over normalized paths. Kept entries
    /// that do not match a stored reference are dropped rather than
    /// persisted blind, so a record can never gain a reference to a file
    /// this subsystem did not write.
    pub fn reconcile(
        &self,
        existing: &[String],
        kept: &[String],
        uploads: Vec<Upload>,
        target_folder: &MediaPath,
    ) -> Result<ImagePlan, StorageError> {
        let existing_set: HashSet<&str> = existing.iter().map(|r| self.normalize(r)).collect();

        let mut seen = HashSet::new();
        let kept_normalized: Vec<&str> = kept
            .iter()
            .map(|r| self.normalize(r))
            .filter(|r| existing_set.contains(r))
            .filter(|r| seen.insert(*r))
            .collect();

        let kept_set: HashSet<&str> = kept_normalized.iter().copied().collect();

        let mut deleted = HashSet::new();
        let mut deletions = Vec::new();
        for reference in existing {
            let r = self.normalize(reference);
            if !kept_set.contains(r) && deleted.insert(r) {
                deletions.push(MediaPath::parse(r)?);
            }
        }

        let mut final_list: Vec<String> =
            kept_normalized.iter().map(|r| r.to_string()).collect();

        let mut writes = Vec::new();
        for upload in uploads {
            let path = target_folder.join(&fresh_file_name(upload.file_name.as_deref()))?;
            final_list.push(path.to_string());
            writes.push(PendingWrite {
                path,
                bytes: upload.bytes,
            });
        }

        Ok(ImagePlan {
            deletions,
            writes,
            final_list,
        })
    }
}

/// Generate a collision-free stored file name.
///
/// The name is never derived from client input beyond the extension, which
/// is taken only when it is a short alphanumeric token.
pub fn fresh_file_name(declared_name: Option<&str>) -> String {
    let ext = declared_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, e)| e)
        .filter(|e| {
            !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    format!("{}.{ext}", Uuid::new_v4().simple())
}
