use std::collections::BTreeMap;

use docs_bucket_core::config::{SinkConfig, SourceConfig};
use docs_bucket_core::rate_limit::RateLimitedClient;
use docs_bucket_core::sink::{KnowledgeApi, SinkClient};
use docs_bucket_core::source::{Document, SourceApi, SourceClient};
use docs_bucket_core::SyncError;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_client(server: &MockServer, token: Option<&str>) -> SourceClient {
    let config = SourceConfig {
        api_base_url: format!("{}/api/", server.uri()),
        docs_base_url: "https://view.example.com".into(),
        page_limit: 25,
        api_token: token.map(String::from),
    };
    SourceClient::new(RateLimitedClient::new(reqwest::Client::new()), &config)
}

fn sink_client(server: &MockServer) -> SinkClient {
    let config = SinkConfig {
        api_url: format!("{}/api/v1", server.uri()),
        knowledge_collection_id: "kc-default".into(),
        mappings: BTreeMap::new(),
        api_token: Some("sink-token".into()),
    };
    SinkClient::new(RateLimitedClient::new(reqwest::Client::new()), &config)
}

#[tokio::test]
async fn list_documents_sends_paging_payload_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.list"))
        .and(header("authorization", "Bearer source-token"))
        .and(body_json(json!({
            "offset": 50,
            "limit": 25,
            "sort": "updatedAt",
            "direction": "DESC"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "abc", "title": "My Doc!", "urlId": "xyz", "collectionId": "col-1"},
                {"id": "def", "title": "Loose", "urlId": "uvw", "collectionId": null},
                {"id": "ghi", "title": "Blank", "urlId": "rst", "collectionId": ""}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let documents = source_client(&server, Some("source-token"))
        .list_documents(50, 25)
        .await
        .expect("listing should succeed");

    assert_eq!(documents.len(), 3);
    assert_eq!(
        documents[0],
        Document {
            id: "abc".into(),
            title: "My Doc!".into(),
            url_slug_id: "xyz".into(),
            collection_id: Some("col-1".into()),
        }
    );
    assert_eq!(documents[0].collection(), Some("col-1"));
    assert_eq!(documents[1].collection(), None);
    assert_eq!(documents[2].collection(), None);
}

#[tokio::test]
async fn export_and_collection_info_unwrap_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.export"))
        .and(body_json(json!({"id": "abc"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": "# Title\n\nBody"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/collections.info"))
        .and(body_json(json!({"id": "col-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "col-1", "name": "HR Team", "color": "#fff"}
        })))
        .mount(&server)
        .await;

    let client = source_client(&server, None);
    assert_eq!(client.export_document("abc").await.unwrap(), "# Title\n\nBody");
    assert_eq!(client.collection_info("col-1").await.unwrap().name, "HR Team");
}

#[tokio::test]
async fn collection_info_needs_only_a_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/collections.info"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "HR Team"}})),
        )
        .mount(&server)
        .await;

    let collection = source_client(&server, None)
        .collection_info("col-1")
        .await
        .expect("a name-only reply should decode");
    assert_eq!(collection.name, "HR Team");
    assert_eq!(collection.id, "");
}

#[tokio::test]
async fn unexpected_status_and_bad_json_are_distinct_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents.export"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents.list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = source_client(&server, None);

    match client.export_document("missing").await {
        Err(SyncError::Status { operation, status, body }) => {
            assert_eq!(operation, "documents.export");
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    match client.list_documents(0, 10).await {
        Err(SyncError::Decode { operation, .. }) => assert_eq!(operation, "documents.list"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn source_calls_ride_out_rate_limiting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/collections.info"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/collections.info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "col-1", "name": "Engineering"}
        })))
        .mount(&server)
        .await;

    let collection = source_client(&server, None)
        .collection_info("col-1")
        .await
        .unwrap();
    assert_eq!(collection.name, "Engineering");
}

#[tokio::test]
async fn list_files_reads_knowledge_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/knowledge/kc-1"))
        .and(header("authorization", "Bearer sink-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "kc-1",
            "name": "Docs",
            "files": [{"id": "f1", "meta": {}}, {"id": "f2"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/knowledge/kc-empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "kc-empty", "files": null})))
        .mount(&server)
        .await;

    let client = sink_client(&server);
    let ids: Vec<String> = client
        .list_files("kc-1")
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec!["f1", "f2"]);
    assert!(client.list_files("kc-empty").await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_and_add_post_file_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/knowledge/kc-1/file/remove"))
        .and(body_json(json!({"file_id": "f1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/knowledge/kc-1/file/add"))
        .and(body_json(json!({"file_id": "f9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/knowledge/kc-1/file/add"))
        .and(body_json(json!({"file_id": "dup"})))
        .respond_with(ResponseTemplate::new(400).set_body_string("duplicate content"))
        .mount(&server)
        .await;

    let client = sink_client(&server);
    client.remove_file("kc-1", "f1").await.unwrap();
    client.add_file("kc-1", "f9").await.unwrap();

    let err = client.add_file("kc-1", "dup").await.unwrap_err();
    assert!(matches!(err, SyncError::Status { operation: "knowledge.file.add", .. }));
}

#[tokio::test]
async fn upload_sends_multipart_file_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/files/"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"My_Doc.md\""))
        .and(body_string_contains("Document URL: https://view.example.com/my-doc-xyz"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "file-123", "filename": "My_Doc.md"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let file = dir.path().join("My_Doc.md");
    std::fs::write(&file, "Document URL: https://view.example.com/my-doc-xyz\n\nhello").unwrap();

    let uploaded = sink_client(&server).upload_file(&file).await.unwrap();
    assert_eq!(uploaded.id, "file-123");
}

#[tokio::test]
async fn upload_without_id_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": ""})))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let file = dir.path().join("Doc.md");
    std::fs::write(&file, "x").unwrap();

    let err = sink_client(&server).upload_file(&file).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingFileId { .. }));
}

#[tokio::test]
async fn upload_of_missing_file_is_an_io_error() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    let err = sink_client(&server)
        .upload_file(&dir.path().join("gone.md"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Io { .. }));
}
