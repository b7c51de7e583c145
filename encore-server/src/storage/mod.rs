//! Document Blob Store
//!
//! Uploaded files live on the filesystem under `<work_dir>/uploads`, outside
//! the primary database; records reference them by a stable locator
//! (`documents/<uuid>.<ext>`). The contract: store bytes and return a
//! locator; given a locator, delete the bytes. Serving bytes back is done
//! by the static `/uploads` route.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::utils::AppError;

/// Filesystem store for uploaded documents
#[derive(Clone, Debug)]
pub struct DocumentStore {
    uploads_dir: PathBuf,
}

impl DocumentStore {
    /// Create the store rooted at `<work_dir>/uploads`
    pub fn new(work_dir: &Path) -> Result<Self, AppError> {
        let uploads_dir = work_dir.join("uploads");
        std::fs::create_dir_all(uploads_dir.join("documents"))
            .map_err(|e| AppError::internal(format!("Failed to create uploads dir: {e}")))?;
        Ok(Self { uploads_dir })
    }

    /// Directory served read-only at `/uploads`
    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Store bytes and return the stable locator
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let filename = match ext {
            Some(ext) if !ext.is_empty() => format!("{}.{}", Uuid::new_v4(), ext),
            _ => Uuid::new_v4().to_string(),
        };
        let locator = format!("documents/{filename}");

        tokio::fs::write(self.uploads_dir.join(&locator), bytes)
            .await
            .map_err(|e| AppError::internal(format!("Failed to store document: {e}")))?;
        Ok(locator)
    }

    /// Delete the blob behind a locator
    pub async fn delete(&self, locator: &str) -> Result<(), AppError> {
        let path = self.resolve(locator)?;
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| AppError::internal(format!("Failed to delete document: {e}")))
    }

    /// Best-effort delete for cleanup paths: failures are logged, not surfaced
    pub async fn delete_best_effort(&self, locator: &str) {
        if let Err(e) = self.delete(locator).await {
            tracing::warn!(locator, error = %e, "Orphaned document blob left behind");
        }
    }

    /// Resolve a locator, rejecting anything that escapes the uploads dir
    fn resolve(&self, locator: &str) -> Result<PathBuf, AppError> {
        let rel = Path::new(locator);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
        {
            return Err(AppError::validation(format!("Invalid locator '{locator}'")));
        }
        Ok(self.uploads_dir.join(rel))
    }
}
