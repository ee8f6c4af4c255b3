//! Persistence seams used by the models and the seeding workflow
//!
//! [`DocumentStore`] is implemented by [`crate::cosmos::DatabaseClient`] and
//! [`BlobStore`] by [`crate::storage::BlobServiceClient`]. [`MemoryStore`]
//! implements both in process, for dry runs and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::Error;

/// A partitioned JSON document store with create-only writes
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document; an existing id in the same partition is a conflict
    async fn create_document(&self, collection: &str, partition_key: &str, document: Value) -> Result<Value, Error>;

    /// Read a document by id
    async fn read_document(&self, collection: &str, partition_key: &str, id: &str) -> Result<Option<Value>, Error>;
}

/// A container/name addressed blob store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob, replacing any previous content
    async fn put_blob(&self, container: &str, name: &str, content_type: &str, body: Vec<u8>) -> Result<(), Error>;
}

type DocumentKey = (String, String, String);

/// In-process store keeping every document and blob in memory
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<DocumentKey, Value>>,
    blobs: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents of a collection, ordered by partition key then id
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.documents
            .lock()
            .map(|docs| {
                docs.iter()
                    .filter(|((c, _, _), _)| c == collection)
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.documents(collection).len()
    }

    /// Content of a blob
    pub fn blob(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .ok()
            .and_then(|blobs| blobs.get(&(container.to_string(), name.to_string())).cloned())
    }

    /// Number of blobs in a container
    pub fn blob_count(&self, container: &str) -> usize {
        self.blobs
            .lock()
            .map(|blobs| blobs.keys().filter(|(c, _)| c == container).count())
            .unwrap_or_default()
    }
}

fn poisoned() -> Error {
    Error::Api {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "memory store lock poisoned".to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, collection: &str, partition_key: &str, document: Value) -> Result<Value, Error> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Api {
                status: StatusCode::BAD_REQUEST,
                message: "document has no id".to_string(),
            })?
            .to_string();

        let key = (collection.to_string(), partition_key.to_string(), id);
        let mut documents = self.documents.lock().map_err(|_| poisoned())?;
        if documents.contains_key(&key) {
            return Err(Error::Api {
                status: StatusCode::CONFLICT,
                message: format!("document {} already exists in {}/{}", key.2, collection, partition_key),
            });
        }
        documents.insert(key, document.clone());
        Ok(document)
    }

    async fn read_document(&self, collection: &str, partition_key: &str, id: &str) -> Result<Option<Value>, Error> {
        let documents = self.documents.lock().map_err(|_| poisoned())?;
        Ok(documents
            .get(&(collection.to_string(), partition_key.to_string(), id.to_string()))
            .cloned())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put_blob(&self, container: &str, name: &str, _content_type: &str, body: Vec<u8>) -> Result<(), Error> {
        let mut blobs = self.blobs.lock().map_err(|_| poisoned())?;
        blobs.insert((container.to_string(), name.to_string()), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_duplicate_id_is_a_conflict() {
        let store = MemoryStore::new();
        store
            .create_document("profiles", "A", json!({ "id": "A-0", "fiscalCode": "A" }))
            .await
            .unwrap();

        let err = store
            .create_document("profiles", "A", json!({ "id": "A-0", "fiscalCode": "A" }))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.count("profiles"), 1);
    }

    #[tokio::test]
    async fn test_same_id_in_another_partition_is_allowed() {
        let store = MemoryStore::new();
        store
            .create_document("profiles", "A", json!({ "id": "x-0", "fiscalCode": "A" }))
            .await
            .unwrap();
        store
            .create_document("profiles", "B", json!({ "id": "x-0", "fiscalCode": "B" }))
            .await
            .unwrap();

        assert_eq!(store.count("profiles"), 2);
        let found = store.read_document("profiles", "B", "x-0").await.unwrap();
        assert_eq!(found.unwrap()["fiscalCode"], "B");
    }

    #[tokio::test]
    async fn test_read_back_and_blobs() {
        let store = MemoryStore::new();
        store
            .create_document("messages", "FC", json!({ "id": "m1", "fiscalCode": "FC" }))
            .await
            .unwrap();
        store
            .put_blob("message-content", "m1.json", "application/json", b"{}".to_vec())
            .await
            .unwrap();

        let found = store.read_document("messages", "FC", "m1").await.unwrap();
        assert_eq!(found.unwrap()["fiscalCode"], "FC");
        assert!(store.read_document("messages", "other", "m1").await.unwrap().is_none());
        assert_eq!(store.blob("message-content", "m1.json").unwrap(), b"{}".to_vec());
        assert_eq!(store.blob_count("message-content"), 1);
    }

    #[tokio::test]
    async fn test_document_without_id_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_document("messages", "FC", json!({ "fiscalCode": "FC" }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }
}
