//! Design image service: upload, lookup, delete.
//!
//! DESIGN
//! ======
//! Uploaded designs are immutable blobs. A batch upload reads every file
//! first and then writes all rows inside one transaction, so a failing row
//! rolls back the whole batch. Listing is newest-first; rows sharing a
//! timestamp fall back to insertion order (later insert = newer).
//!
//! The store never hands out display URLs. Callers that derived one from a
//! record's content own it and must release it after a delete.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

use std::path::Path;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{ErrorCode, now_ms};

/// File extensions accepted by the upload picker and drop target.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("design not found: {0}")]
    NotFound(String),
    #[error("failed to read upload {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ErrorCode for ImageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_IMAGE_NOT_FOUND",
            Self::Read { .. } => "E_UPLOAD_READ",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// A stored design image. Content is immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub id: String,
    pub content: Vec<u8>,
    pub mime_type: String,
    pub created_at: i64,
}

/// A raw file handed over by the picker or a drop event.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    /// Read a file from disk in full.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the file cannot be read.
    pub async fn read(path: &Path) -> Result<Self, ImageError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ImageError::Read { name: name.clone(), source })?;
        Ok(Self { name, bytes })
    }
}

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Whether a dropped or picked file should be offered to the store.
#[must_use]
pub fn is_accepted_upload(name: &str) -> bool {
    extension(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Mime type by extension only: `.png` is PNG, everything else is served as JPEG.
#[must_use]
pub fn mime_type_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// Keep only the files the upload interface accepts.
#[must_use]
pub fn filter_accepted(files: Vec<UploadFile>) -> Vec<UploadFile> {
    files.into_iter().filter(|f| is_accepted_upload(&f.name)).collect()
}

// =============================================================================
// UPLOAD
// =============================================================================

/// Store a batch of files atomically. Returns the new records, newest first.
///
/// # Errors
///
/// Returns `Storage` if any insert fails; nothing from the batch is kept.
pub async fn upload_images(pool: &SqlitePool, files: Vec<UploadFile>) -> Result<Vec<StoredImage>, ImageError> {
    let created_at = now_ms();
    let records: Vec<StoredImage> = files
        .into_iter()
        .map(|file| StoredImage {
            id: Uuid::new_v4().to_string(),
            mime_type: mime_type_for(&file.name).to_string(),
            content: file.bytes,
            created_at,
        })
        .collect();

    let mut tx = pool.begin().await?;
    for record in &records {
        sqlx::query("INSERT INTO designs (id, content, mime_type, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&record.id)
            .bind(&record.content)
            .bind(&record.mime_type)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(count = records.len(), "stored uploaded designs");

    let mut records = records;
    records.reverse();
    Ok(records)
}

// =============================================================================
// READ
// =============================================================================

/// Point lookup. `Ok(None)` when the id does not exist.
///
/// # Errors
///
/// Returns `Storage` if the query fails.
pub async fn get_image(pool: &SqlitePool, id: &str) -> Result<Option<StoredImage>, ImageError> {
    let row = sqlx::query_as::<_, (String, Vec<u8>, String, i64)>(
        "SELECT id, content, mime_type, created_at FROM designs WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, content, mime_type, created_at)| StoredImage { id, content, mime_type, created_at }))
}

/// All designs, newest first.
///
/// # Errors
///
/// Returns `Storage` if the query fails.
pub async fn list_images(pool: &SqlitePool) -> Result<Vec<StoredImage>, ImageError> {
    let rows = sqlx::query_as::<_, (String, Vec<u8>, String, i64)>(
        "SELECT id, content, mime_type, created_at FROM designs ORDER BY created_at DESC, seq DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, content, mime_type, created_at)| StoredImage { id, content, mime_type, created_at })
        .collect())
}

// =============================================================================
// DELETE
// =============================================================================

/// Delete one design.
///
/// # Errors
///
/// Returns `NotFound` if no design has this id.
pub async fn delete_image(pool: &SqlitePool, id: &str) -> Result<(), ImageError> {
    let result = sqlx::query("DELETE FROM designs WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ImageError::NotFound(id.to_string()));
    }
    tracing::info!(%id, "deleted design");
    Ok(())
}

/// Delete every design. Returns how many were removed.
///
/// # Errors
///
/// Returns `Storage` if the delete fails.
pub async fn delete_all_images(pool: &SqlitePool) -> Result<u64, ImageError> {
    let result = sqlx::query("DELETE FROM designs").execute(pool).await?;
    tracing::info!(count = result.rows_affected(), "deleted all designs");
    Ok(result.rows_affected())
}
