//! Multipart encoding checked against what a wiremock server receives.

mod support;

use serde_json::json;
use treaty::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn upload_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stored": true})))
        .mount(&server)
        .await;
    server
}

async fn received_body(server: &MockServer) -> (String, String) {
    let requests = server.received_requests().await.expect("request recording enabled");
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    let content_type = req
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (content_type, String::from_utf8_lossy(&req.body).into_owned())
}

#[tokio::test]
async fn bodies_with_files_are_sent_as_multipart() {
    let server = upload_server().await;
    let client = support::client_for(&server.uri());

    let body = Body::object()
        .field("title", "report")
        .field("meta", json!({"pages": 2}))
        .field("file", FileLike::new("report.txt", "hello world"));
    let resp = client.at("upload").post(Some(body), None).send().await.unwrap();
    assert_eq!(support::data_value(resp), json!({"stored": true}));

    let (content_type, payload) = received_body(&server).await;
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert!(payload.contains("name=\"title\""));
    assert!(payload.contains("report"));
    assert!(payload.contains(r#"{"pages":2}"#));
    assert!(payload.contains("filename=\"report.txt\""));
    assert!(payload.contains("hello world"));
}

#[tokio::test]
async fn file_lists_repeat_the_field_name() {
    let server = upload_server().await;
    let client = support::client_for(&server.uri());

    let body = Body::object().field(
        "files",
        vec![FileLike::new("a.txt", "first"), FileLike::new("b.txt", "second")],
    );
    client.at("upload").post(Some(body), None).send().await.unwrap();

    let (_, payload) = received_body(&server).await;
    assert_eq!(payload.matches("name=\"files\"").count(), 2);
    assert!(payload.contains("filename=\"a.txt\""));
    assert!(payload.contains("filename=\"b.txt\""));
}

#[tokio::test]
async fn files_read_from_disk_upload_their_contents() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.txt");
    std::fs::write(&file_path, "from disk").unwrap();

    let server = upload_server().await;
    let client = support::client_for(&server.uri());

    let file = FileLike::from_path(&file_path).await.unwrap();
    let body = Body::object().field("doc", file);
    client.at("upload").post(Some(body), None).send().await.unwrap();

    let (content_type, payload) = received_body(&server).await;
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(payload.contains("filename=\"notes.txt\""));
    assert!(payload.contains("from disk"));
}

#[tokio::test]
async fn explicit_multipart_header_keeps_the_boundary() {
    let server = upload_server().await;
    let client = support::client_for(&server.uri());

    let body = Body::object().field("file", FileLike::new("a.bin", vec![0u8, 1, 2]));
    client
        .at("upload")
        .post(
            Some(body),
            Some(RequestOptions::new().with_header("Content-Type", "multipart/form-data")),
        )
        .send()
        .await
        .unwrap();

    let (content_type, _) = received_body(&server).await;
    assert!(content_type.contains("boundary="));
}
