use log::info;

use crate::app_response::AppResponse;

pub const DOWNLOAD_URL_BASE: &str = "https://mock-storage.com";

/// Upload stand-in: accepts any file and serves it from a fixed URL scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl FileStorage {
    pub fn reference(&self, path: impl Into<String>) -> StorageRef {
        StorageRef { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRef {
    path: String,
}

impl StorageRef {
    pub fn full_path(&self) -> &str {
        &self.path
    }

    /// Pretends to upload `bytes` and returns the stored path.
    pub fn put(&self, bytes: &[u8]) -> Result<String, AppResponse> {
        if self.path.is_empty() {
            return Err(AppResponse::BadRequest("Upload path is empty".to_string()));
        }
        info!("Upload: {} ({} bytes)", self.path, bytes.len());
        Ok(self.path.clone())
    }

    pub fn download_url(&self) -> String {
        format!("{DOWNLOAD_URL_BASE}/{}", self.path)
    }
}
