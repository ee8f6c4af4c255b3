//! Azure Storage operations: blob containers and blobs, queues, tables

mod auth;
mod blob;
mod connection;
mod queue;
mod table;

pub use auth::{SharedKeyScheme, SharedKeySigner, STORAGE_API_VERSION};
pub use blob::BlobServiceClient;
pub use connection::{StorageAccount, DEV_ACCOUNT_KEY, DEV_ACCOUNT_NAME};
pub use queue::QueueServiceClient;
pub use table::TableServiceClient;
