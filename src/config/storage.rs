use std::env;
use std::path::PathBuf;

/// Where uploaded profile images land on disk.
///
/// The directory is served statically under `/storage/images`, so stored
/// filenames double as public paths.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("storage/images")),
        }
    }
}
