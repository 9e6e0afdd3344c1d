//! Port for storing uploaded bootcamp photos.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo storage adapters.
    pub enum PhotoStoreError {
        /// Writing the file failed.
        Io { message: String } => "photo storage failed: {message}",
    }
}

/// Write photo files under a flat namespace of file names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store `bytes` as `file_name`, replacing any previous file.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), PhotoStoreError>;
}
