mod common;

use common::{Emulators, DATABASE};
use devseed::config::SeedOptions;
use devseed::cosmos::CollectionDefinition;
use devseed::error::Error;
use devseed::storage::STORAGE_API_VERSION;
use devseed::topology::Topology;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, path_regex, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_provisioning_twice_succeeds_both_times() {
    let emulators = Emulators::start().await;
    let topology = Topology::default();

    Mock::given(method("POST"))
        .and(path("/dbs"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(1)
        .mount(&emulators.cosmos)
        .await;
    Mock::given(method("POST"))
        .and(path("/dbs"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "code": "Conflict" })))
        .mount(&emulators.cosmos)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/dbs/{}/colls", DATABASE)))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(topology.collections.len() as u64)
        .mount(&emulators.cosmos)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/dbs/{}/colls", DATABASE)))
        .respond_with(ResponseTemplate::new(409))
        .mount(&emulators.cosmos)
        .await;
    Mock::given(method("PUT"))
        .and(query_param("restype", "container"))
        .and(header("x-ms-version", STORAGE_API_VERSION))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(topology.containers.len() as u64)
        .mount(&emulators.blob)
        .await;
    Mock::given(method("PUT"))
        .and(query_param("restype", "container"))
        .respond_with(ResponseTemplate::new(409).set_body_string("ContainerAlreadyExists"))
        .mount(&emulators.blob)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/devstoreaccount1/[^/]+$"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(topology.queues.len() as u64)
        .mount(&emulators.queue)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/devstoreaccount1/[^/]+$"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&emulators.queue)
        .await;
    Mock::given(method("POST"))
        .and(path("/devstoreaccount1/Tables"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(topology.tables.len() as u64)
        .mount(&emulators.table)
        .await;
    Mock::given(method("POST"))
        .and(path("/devstoreaccount1/Tables"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&emulators.table)
        .await;

    let env = emulators.connect(&SeedOptions::default());
    let provisioner = env.provisioner();

    assert!(provisioner.ensure_database().await.unwrap());
    assert_eq!(provisioner.ensure_collections(&topology.collections).await.unwrap(), 16);
    assert_eq!(provisioner.ensure_containers(&topology.containers).await.unwrap(), 7);
    assert_eq!(provisioner.ensure_queues(&topology.queues).await.unwrap(), 5);
    assert_eq!(provisioner.ensure_tables(&topology.tables).await.unwrap(), 12);

    assert!(!provisioner.ensure_database().await.unwrap());
    assert_eq!(provisioner.ensure_collections(&topology.collections).await.unwrap(), 0);
    assert_eq!(provisioner.ensure_containers(&topology.containers).await.unwrap(), 0);
    assert_eq!(provisioner.ensure_queues(&topology.queues).await.unwrap(), 0);
    assert_eq!(provisioner.ensure_tables(&topology.tables).await.unwrap(), 0);
}

#[tokio::test]
async fn test_messages_collection_carries_composite_index() {
    let emulators = Emulators::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/dbs/{}/colls", DATABASE)))
        .and(body_json(json!({
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
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&emulators.cosmos)
        .await;

    let env = emulators.connect(&SeedOptions::default());
    let messages = Topology::default()
        .collections
        .into_iter()
        .find(|c| c.id == "messages")
        .unwrap();

    assert!(env.provisioner().ensure_collection(&messages).await.unwrap());
}

#[tokio::test]
async fn test_failure_names_the_resource() {
    let emulators = Emulators::start().await;

    Mock::given(method("PUT"))
        .and(query_param("restype", "container"))
        .respond_with(ResponseTemplate::new(403).set_body_string("AuthenticationFailed"))
        .mount(&emulators.blob)
        .await;

    let env = emulators.connect(&SeedOptions::default());
    let err = env.provisioner().ensure_container("message-content").await.unwrap_err();

    match &err {
        Error::Provision { resource, .. } => assert_eq!(resource, "container message-content"),
        other => panic!("Expected Provision error, got {:?}", other),
    }
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(
        err.to_string(),
        "Cannot create container message-content: Request failed with status 403 Forbidden: AuthenticationFailed"
    );
}

#[tokio::test]
async fn test_group_fails_fast_on_one_rejection() {
    let emulators = Emulators::start().await;

    Mock::given(method("POST"))
        .and(path("/devstoreaccount1/Tables"))
        .and(body_json(json!({ "TableName": "adelogs" })))
        .respond_with(ResponseTemplate::new(400).set_body_string("InvalidInput"))
        .mount(&emulators.table)
        .await;
    Mock::given(method("POST"))
        .and(path("/devstoreaccount1/Tables"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&emulators.table)
        .await;

    let env = emulators.connect(&SeedOptions::default());
    let tables = Topology::default().tables;
    let err = env.provisioner().ensure_tables(&tables).await.unwrap_err();

    assert!(err.to_string().starts_with("Cannot create table adelogs"));
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_invalid_partition_key_is_rejected_locally() {
    let emulators = Emulators::start().await;
    let env = emulators.connect(&SeedOptions::default());

    let err = env
        .provisioner()
        .ensure_collection(&CollectionDefinition::new("profiles", "nested/fiscalCode"))
        .await
        .unwrap_err();

    match err {
        Error::Provision { resource, source } => {
            assert_eq!(resource, "collection profiles");
            assert!(matches!(*source, Error::InvalidDefinition(_)));
        }
        other => panic!("Expected Provision error, got {:?}", other),
    }
    assert!(emulators.cosmos.received_requests().await.unwrap().is_empty());
}
