use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repoexport::{export, Config, RetryConfig, Storage, SyncPipeline};

fn test_config(server: &MockServer) -> Config {
    Config {
        api_base_url: server.uri(),
        retry: RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn fetch_normalize_store_export() {
    let server = MockServer::start().await;

    // The same repo twice from the API; dedup keeps one row.
    let repo = json!({
        "id": 1,
        "name": "a",
        "private": false,
        "stargazers_count": 5,
        "owner": {"id": 10, "login": "u", "email": "u@x.com"},
    });
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo.clone(), repo])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let storage = Arc::new(Mutex::new(Storage::in_memory().unwrap()));
    let pipeline = SyncPipeline::new(storage.clone(), Arc::new(test_config(&server)));

    let report = pipeline.run("test-token").await.unwrap();
    assert_eq!(report.fetched, 2);
    assert_eq!(report.unique_repos, 1);
    assert_eq!(report.owners, 1);

    let rows = storage.lock().await.export_rows().unwrap();
    let csv = export::render(&rows);
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Owner ID,Owner Name,Owner Email,Repo ID,Repo Name,Status,Stars Count"
    );
    assert_eq!(lines.next().unwrap(), "10,u,u@x.com,1,a,Public,5");
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn repeated_sync_is_idempotent_and_picks_up_changes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "name": "a",
            "private": false,
            "stargazers_count": 5,
            "owner": {"id": 10, "login": "u", "email": "u@x.com"},
        }])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // Second sync sees the repo gone private with more stars.
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "name": "a",
            "private": true,
            "stargazers_count": 8,
            "owner": {"id": 10, "login": "u", "email": "u@x.com"},
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let storage = Arc::new(Mutex::new(Storage::in_memory().unwrap()));
    let pipeline = SyncPipeline::new(storage.clone(), Arc::new(test_config(&server)));

    pipeline.run("test-token").await.unwrap();
    pipeline.run("test-token").await.unwrap();

    let rows = storage.lock().await.export_rows().unwrap();
    assert_eq!(rows.len(), 1, "second sight updates, never duplicates");
    let csv = export::render(&rows);
    assert!(csv.contains("10,u,u@x.com,1,a,Private,8"));
}

#[tokio::test]
async fn malformed_records_are_skipped_not_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "ok", "private": false, "stargazers_count": 0,
             "owner": {"id": 10, "login": "u"}},
            {"id": 2, "name": "no-owner", "private": false, "stargazers_count": 0},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let storage = Arc::new(Mutex::new(Storage::in_memory().unwrap()));
    let pipeline = SyncPipeline::new(storage.clone(), Arc::new(test_config(&server)));

    let report = pipeline.run("test-token").await.unwrap();
    assert_eq!(report.fetched, 2);
    assert_eq!(report.unique_repos, 1);

    let rows = storage.lock().await.export_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].repo_name, "ok");
}
