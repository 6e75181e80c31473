//! Product image storage on the local filesystem.
//!
//! Files land under `{root}/products/{product_id}/{timestamp}_{name}`; the
//! timestamp prefix keeps two uploads of the same filename distinct, so a
//! re-upload never clobbers an image an existing product still references.

use std::path::PathBuf;

use chrono::Utc;
use marigold_core::ProductId;

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    base_url: String,
}

/// One stored image: where it lives and the URL the catalog will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
}

impl ImageStore {
    /// Create a store rooted at the given directory.
    #[must_use]
    pub fn new(root: PathBuf, base_url: impl Into<String>) -> Self {
        Self {
            root,
            base_url: base_url.into(),
        }
    }

    /// The directory images are served from.
    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Persist one uploaded image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` if the directory cannot be created or the
    /// file cannot be written.
    pub async fn store(
        &self,
        product_id: ProductId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, std::io::Error> {
        let key = object_key(product_id, file_name);

        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        Ok(StoredImage {
            url: format!("{}/{key}", self.base_url),
        })
    }
}

/// Relative storage key for an upload.
fn object_key(product_id: ProductId, file_name: &str) -> String {
    format!(
        "products/{product_id}/{}_{}",
        Utc::now().timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// Strip anything that isn't safe in a filename or URL path segment.
///
/// Every disallowed byte becomes `_`; an empty or fully-stripped name falls
/// back to `upload`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '_') || sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_names_pass_through() {
        assert_eq!(sanitize_file_name("photo-01.jpg"), "photo-01.jpg");
        assert_eq!(sanitize_file_name("IMG_2024.PNG"), "IMG_2024.PNG");
    }

    #[test]
    fn path_separators_and_spaces_become_underscores() {
        assert_eq!(
            sanitize_file_name("../etc/pass wd.jpg"),
            ".._etc_pass_wd.jpg"
        );
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(sanitize_file_name("صورة.jpg"), "____.jpg");
    }

    #[test]
    fn degenerate_names_fall_back() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("///"), "upload");
    }

    #[test]
    fn object_keys_scope_by_product() {
        let id = ProductId::generate();
        let key = object_key(id, "a b.jpg");
        assert!(key.starts_with(&format!("products/{id}/")));
        assert!(key.ends_with("_a_b.jpg"));
    }
}
