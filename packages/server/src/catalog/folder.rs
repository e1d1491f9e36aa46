//! Storage folder derivation.
//!
//! Folders are recomputed from (name, id) at every call site rather than
//! stored, so creation, update and deletion must all derive the same result
//! for the same inputs. An update derives the folder from the *incoming*
//! name: a rename changes where new files are written while files stored
//! earlier stay in the old folder.

/// Root segment of the category media tree.
pub const CATEGORY_ROOT: &str = "categorys";

const PRODUCTS_SEGMENT: &str = "products";

/// Fallback when a name slugs down to nothing; `-<id>` alone would be a
/// fragile segment on some filesystems.
const EMPTY_SLUG_PLACEHOLDER: &str = "item";

/// Derive the folder segment for a named entity: a lowercased, hyphenated,
/// filesystem-safe slug with the numeric id appended.
pub fn slug_folder(name: &str, id: i32) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    // A leading dot would produce a hidden segment the path rules reject.
    let cleaned = cleaned.trim_start_matches('.');

    let slug = if cleaned.is_empty() {
        EMPTY_SLUG_PLACEHOLDER
    } else {
        cleaned
    };

    format!("{slug}-{id}")
}

/// Folder holding a category's image and its `products/` subtree.
pub fn category_folder(category_name: &str, category_id: i32) -> String {
    format!(
        "{CATEGORY_ROOT}/{}",
        slug_folder(category_name, category_id)
    )
}

/// Folder holding a product's images and all of its variants' images, flat.
pub fn product_folder(
    category_name: &str,
    category_id: i32,
    product_name: &str,
    product_id: i32,
) -> String {
    format!(
        "{}/{PRODUCTS_SEGMENT}/{}",
        category_folder(category_name, category_id),
        slug_folder(product_name, product_id)
    )
}
