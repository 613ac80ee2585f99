//! File storage for uploaded profile images.
//!
//! The [`FileStorage`] trait keeps the staff lifecycle logic free of I/O
//! concerns: services hand it bytes plus a filename and get back the stored
//! key. [`LocalFileStorage`] writes into the configured upload directory,
//! which the router serves statically.

use std::fmt;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use tokio::fs;

/// Abstract file store. Swappable behind `Arc<dyn FileStorage>` so tests or
/// alternative backends (S3, MinIO) can replace the local directory.
pub trait FileStorage: Send + Sync {
    /// Persist `content` under `filename` and return the stored key.
    fn save<'a>(
        &'a self,
        filename: &'a str,
        content: &'a [u8],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, StorageError>> + Send + 'a>>;

    /// Remove a previously stored file. Missing files are not an error.
    fn delete<'a>(
        &'a self,
        filename: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StorageError>> + Send + 'a>>;
}

#[derive(Debug)]
pub enum StorageError {
    /// File exceeds the policy's maximum size.
    FileTooLarge { max_kilobytes: usize },

    /// File extension not allowed by the policy.
    ExtensionNotAllowed {
        received: String,
        allowed: Vec<String>,
    },

    /// Filename would escape the upload directory or is empty.
    InvalidFilename(String),

    IoError(std::io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { max_kilobytes } => {
                write!(f, "The image may not be greater than {max_kilobytes} kilobytes")
            }
            Self::ExtensionNotAllowed { received, allowed } => {
                write!(
                    f,
                    "The image must be a file of type: {} (got '{}')",
                    allowed.join(", "),
                    received
                )
            }
            Self::InvalidFilename(msg) => write!(f, "Invalid filename: {msg}"),
            Self::IoError(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// An image file lifted out of a multipart request body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied original filename.
    pub filename: String,
    pub content: Bytes,
}

/// Per-endpoint upload constraints.
#[derive(Debug, Clone, Copy)]
pub struct ImagePolicy {
    pub allowed_extensions: &'static [&'static str],
    pub max_kilobytes: usize,
}

/// Policy for images attached to staff creation.
pub const STAFF_CREATE_IMAGE: ImagePolicy = ImagePolicy {
    allowed_extensions: &["jpeg", "png", "jpg", "gif", "svg"],
    max_kilobytes: 2048,
};

/// Policy for the dedicated profile-image upload endpoint.
pub const STAFF_PROFILE_IMAGE: ImagePolicy = ImagePolicy {
    allowed_extensions: &["jpg", "jpeg", "png"],
    max_kilobytes: 3048,
};

impl ImagePolicy {
    pub fn check(&self, file: &UploadedFile) -> Result<(), StorageError> {
        let extension = file_extension(&file.filename).unwrap_or_default();
        if !self
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            return Err(StorageError::ExtensionNotAllowed {
                received: extension,
                allowed: self
                    .allowed_extensions
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            });
        }

        if file.content.len() > self.max_kilobytes * 1024 {
            return Err(StorageError::FileTooLarge {
                max_kilobytes: self.max_kilobytes,
            });
        }

        Ok(())
    }
}

fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Builds the stored filename: `<unix_timestamp>_<sanitized_basename>.<ext>`.
///
/// Spaces in the original basename become underscores; any character that is
/// not alphanumeric, `-` or `_` is dropped so the result is always a safe key.
pub fn timestamped_filename(original: &str, timestamp: i64) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    let extension = file_extension(original).unwrap_or_else(|| "bin".to_string());

    let sanitized: String = stem
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect();

    format!("{timestamp}_{sanitized}.{extension}")
}

/// Local filesystem storage rooted at the configured upload directory.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Stored keys are flat filenames; anything that could traverse out of
    /// the upload directory is rejected.
    fn validate_filename(filename: &str) -> Result<(), StorageError> {
        if filename.is_empty() || filename.contains("..") || filename.contains('/') {
            return Err(StorageError::InvalidFilename(
                "filename must be non-empty and must not contain '..' or '/'".to_string(),
            ));
        }

        if !filename
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(StorageError::InvalidFilename(
                "filename contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        filename: &'a str,
        content: &'a [u8],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, StorageError>> + Send + 'a>>
    {
        Box::pin(async move {
            Self::validate_filename(filename)?;

            fs::create_dir_all(&self.base_dir).await?;
            fs::write(self.base_dir.join(filename), content).await?;

            Ok(filename.to_string())
        })
    }

    fn delete<'a>(
        &'a self,
        filename: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StorageError>> + Send + 'a>>
    {
        Box::pin(async move {
            Self::validate_filename(filename)?;

            match fs::remove_file(self.base_dir.join(filename)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}
