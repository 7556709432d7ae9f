mod file;
mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;

pub use file::FileProfileStore;
pub use memory::MemoryProfileStore;

/// Keys the client persists between runs. The values are whatever the
/// sign-up/login flow wrote; the store itself is an opaque string map.
pub mod keys {
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const USER_EMAIL: &str = "user_email";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read profile store: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write profile store: {0}")]
    Write(#[source] std::io::Error),

    #[error("profile store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String key-value persistence scoped to this client, the analogue of the
/// browser's local storage in the original product.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Drops every key. Afterwards the derived profile reads as the guest
    /// triple.
    async fn clear(&self) -> Result<(), StoreError>;
}

pub fn create_profile_store(args: &Args) -> Result<Arc<dyn ProfileStore>, StoreError> {
    match args.profile_store.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryProfileStore::new())),
        _ => Ok(Arc::new(FileProfileStore::new(args.store_path.clone()))),
    }
}
