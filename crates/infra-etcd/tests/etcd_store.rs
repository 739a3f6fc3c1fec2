//! etcd adapter tests against a mock HTTP server

use std::time::Duration;

use envetcd_core::domain::{RawEntry, StoreConfig};
use envetcd_core::port::{KeyValueStore, StoreError};
use envetcd_infra_etcd::{EtcdKeyValueStore, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_store(peers: Vec<String>, attempts: u32) -> EtcdKeyValueStore {
    EtcdKeyValueStore::new(
        peers,
        Duration::from_millis(500),
        RetryPolicy::new(attempts, Duration::from_millis(1)),
    )
    .unwrap()
}

fn global_tree() -> serde_json::Value {
    json!({
        "action": "get",
        "node": {
            "key": "/config/global",
            "dir": true,
            "nodes": [
                {"key": "/config/global/testKey", "value": "testGlobalVal2"},
                {
                    "key": "/config/global/systemtest",
                    "dir": true,
                    "nodes": [
                        {"key": "/config/global/systemtest/testKey", "value": "globaltestVal"}
                    ]
                }
            ]
        }
    })
}

#[tokio::test]
async fn test_fetch_recursive_flattens_tree() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/keys/config/global"))
        .and(query_param("recursive", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(global_tree()))
        .expect(1)
        .mount(&server)
        .await;

    let store = fast_store(vec![server.uri()], 1);
    let entries = store.fetch_recursive("/config/global").await.unwrap();

    assert_eq!(
        entries,
        vec![
            RawEntry::directory("/config/global"),
            RawEntry::value("/config/global/testKey", "testGlobalVal2"),
            RawEntry::directory("/config/global/systemtest"),
            RawEntry::value("/config/global/systemtest/testKey", "globaltestVal"),
        ]
    );
}

#[tokio::test]
async fn test_missing_key_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/keys/config/service/none"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errorCode": 100,
            "message": "Key not found",
            "cause": "/config/service/none",
            "index": 3
        })))
        .mount(&server)
        .await;

    let store = fast_store(vec![server.uri()], 3);
    let entries = store.fetch_recursive("/config/service/none").await.unwrap();

    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/keys/config/global"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/keys/config/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(global_tree()))
        .mount(&server)
        .await;

    let store = fast_store(vec![server.uri()], 3);
    let entries = store.fetch_recursive("/config/global").await.unwrap();

    assert_eq!(entries.len(), 4);
}

#[tokio::test]
async fn test_falls_over_to_next_peer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/keys/config/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(global_tree()))
        .mount(&server)
        .await;

    // Port 1 refuses connections
    let store = fast_store(vec!["http://127.0.0.1:1".to_string(), server.uri()], 2);
    let entries = store.fetch_recursive("/config/global").await.unwrap();

    assert_eq!(entries.len(), 4);
}

#[tokio::test]
async fn test_unavailable_after_budget_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let store = fast_store(vec![server.uri()], 2);
    let err = store.fetch_recursive("/config/global").await.unwrap_err();

    match err {
        StoreError::Unavailable { attempts, reason } => {
            assert_eq!(attempts, 2);
            assert!(reason.contains("500"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let store = fast_store(vec![server.uri()], 3);
    let err = store.fetch_recursive("/config/global").await.unwrap_err();

    assert!(matches!(err, StoreError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_connect_with_sync_replaces_peers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [
                {"id": "a", "name": "infra0", "peerURLs": [], "clientURLs": ["http://10.0.0.1:2379/"]},
                {"id": "b", "name": "infra1", "peerURLs": [], "clientURLs": ["http://10.0.0.2:2379"]}
            ]
        })))
        .mount(&server)
        .await;

    let config = StoreConfig {
        sync: true,
        ..StoreConfig::new(vec![server.uri()])
    };
    let store = EtcdKeyValueStore::connect(&config, vec![server.uri()])
        .await
        .unwrap();

    assert_eq!(
        store.peers(),
        &["http://10.0.0.1:2379".to_string(), "http://10.0.0.2:2379".to_string()]
    );
}

#[tokio::test]
async fn test_connect_without_sync_keeps_peers() {
    let config = StoreConfig::new(vec!["http://127.0.0.1:4001".to_string()]);
    let store = EtcdKeyValueStore::connect(&config, config.peers.clone())
        .await
        .unwrap();

    assert_eq!(store.peers(), &["http://127.0.0.1:4001".to_string()]);
}
