//! Types for Cosmos DB resource definitions

use serde::{Deserialize, Serialize};

/// Sort direction of a path inside a composite index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexOrder {
    /// Ascending order
    Ascending,

    /// Descending order
    Descending,
}

/// Indexing mode of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingMode {
    /// Index updated synchronously with every write
    Consistent,

    /// Index updated asynchronously
    Lazy,

    /// No index
    None,
}

/// A path included in or excluded from the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPath {
    pub path: String,
}

/// One field of a composite index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositePath {
    pub path: String,
    pub order: IndexOrder,
}

impl CompositePath {
    /// Composite path over a top-level field
    pub fn field(field: &str, order: IndexOrder) -> Self {
        Self {
            path: format!("/{}", field),
            order,
        }
    }
}

/// Indexing policy attached to a collection at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingPolicy {
    pub automatic: bool,
    pub indexing_mode: IndexingMode,
    pub included_paths: Vec<IndexPath>,
    pub excluded_paths: Vec<IndexPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composite_indexes: Vec<Vec<CompositePath>>,
}

impl Default for IndexingPolicy {
    fn default() -> Self {
        Self {
            automatic: true,
            indexing_mode: IndexingMode::Consistent,
            included_paths: vec![IndexPath { path: "/*".to_string() }],
            excluded_paths: Vec::new(),
            composite_indexes: Vec::new(),
        }
    }
}

impl IndexingPolicy {
    /// Add a composite index over the given ordered fields
    pub fn with_composite_index(mut self, paths: Vec<CompositePath>) -> Self {
        self.composite_indexes.push(paths);
        self
    }

    /// Exclude a path from indexing
    pub fn with_excluded_path(mut self, path: &str) -> Self {
        self.excluded_paths.push(IndexPath { path: path.to_string() });
        self
    }
}

/// Partition key definition of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyDefinition {
    pub paths: Vec<String>,
    pub kind: String,
}

/// Body of a create collection request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDefinition {
    pub id: String,
    pub partition_key: PartitionKeyDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexing_policy: Option<IndexingPolicy>,
}

impl CollectionDefinition {
    /// Collection hash-partitioned on a top-level field
    pub fn new(id: &str, partition_key_field: &str) -> Self {
        Self {
            id: id.to_string(),
            partition_key: PartitionKeyDefinition {
                paths: vec![format!("/{}", partition_key_field)],
                kind: "Hash".to_string(),
            },
            indexing_policy: None,
        }
    }

    /// Attach an indexing policy
    pub fn with_indexing_policy(mut self, policy: IndexingPolicy) -> Self {
        self.indexing_policy = Some(policy);
        self
    }

    /// The partition key field name, without the leading slash
    pub fn partition_key_field(&self) -> Option<&str> {
        match self.partition_key.paths.as_slice() {
            [path] => path.strip_prefix('/'),
            _ => None,
        }
    }

    /// Check the constraints the service enforces on creation
    ///
    /// The partition key must name exactly one top-level field.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("collection id must not be empty".to_string());
        }
        match self.partition_key_field() {
            Some(field)
                if !field.is_empty()
                    && !field.contains('/')
                    && !field.chars().any(char::is_whitespace) =>
            {
                Ok(())
            }
            _ => Err(format!(
                "partition key of collection {} must be a single top-level field, got {:?}",
                self.id, self.partition_key.paths
            )),
        }
    }
}

/// Body of a create database request
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DatabaseDefinition<'a> {
    pub id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_definition_wire_format() {
        let policy = IndexingPolicy::default()
            .with_composite_index(vec![
                CompositePath::field("fiscalCode", IndexOrder::Ascending),
                CompositePath::field("id", IndexOrder::Descending),
            ])
            .with_excluded_path("/\"_etag\"/?");
        let definition = CollectionDefinition::new("messages", "fiscalCode").with_indexing_policy(policy);

        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({
                "id": "messages",
                "partitionKey": { "paths": ["/fiscalCode"], "kind": "Hash" },
                "indexingPolicy": {
                    "automatic": true,
                    "indexingMode": "consistent",
                    "includedPaths": [{ "path": "/*" }],
                    "excludedPaths": [{ "path": "/\"_etag\"/?" }],
                    "compositeIndexes": [[
                        { "path": "/fiscalCode", "order": "ascending" },
                        { "path": "/id", "order": "descending" }
                    ]]
                }
            })
        );
    }

    #[test]
    fn test_partition_key_must_be_top_level() {
        assert!(CollectionDefinition::new("profiles", "fiscalCode").validate().is_ok());
        assert!(CollectionDefinition::new("profiles", "address/city").validate().is_err());
        assert!(CollectionDefinition::new("profiles", "").validate().is_err());
        assert!(CollectionDefinition::new("", "id").validate().is_err());
    }
}
