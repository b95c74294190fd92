//! In-process API tests: the full router driven through `tower::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use fhub::domain::config::ApiConfig;
use fhub_server::Server;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn test_app() -> (tempfile::TempDir, Router) {
    let temp = tempfile::tempdir().unwrap();
    let mut cfg = ApiConfig::default();
    cfg.storage.root = temp.path().to_path_buf();

    let app = Server::builder().config(cfg).build().await.unwrap().into_router();
    (temp, app)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "fhub-test-boundary";

fn multipart_chunk(
    path: &str,
    file_name: &str,
    file_id: &str,
    index: u32,
    total: u32,
    bytes: &[u8],
    replace: bool,
) -> Request<Body> {
    let mut body = Vec::new();
    let mut text_field = |name: &str, value: &str| {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    };
    text_field("path", path);
    text_field("fileName", file_name);
    text_field("fileId", file_id);
    text_field("chunkIndex", &index.to_string());
    text_field("totalChunks", &total.to_string());
    if replace {
        text_field("replace", "true");
    }

    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"chunk\"; filename=\"blob\"\r\n\
          Content-Type: application/octet-stream\r\n\r\n",
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/fs/upload-chunk")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_is_up() {
    let (_temp, app) = test_app().await;
    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "filehub");
    assert!(json["uptimeSecs"].is_u64());
}

#[tokio::test]
async fn traversal_is_rejected_with_no_side_effects() {
    let (temp, app) = test_app().await;

    for uri in ["/api/fs/list?path=/../etc", "/api/fs/read?path=/../etc/passwd"] {
        let (status, json) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["ok"], false);
    }

    let (status, json) =
        send(&app, post_json("/api/fs/mkdir", serde_json::json!({ "path": "/../outside" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["ok"], false);
    assert!(!temp.path().parent().unwrap().join("outside").exists());
}

#[tokio::test]
async fn crud_flow_over_http() {
    let (_temp, app) = test_app().await;

    let (status, json) =
        send(&app, post_json("/api/fs/mkdir", serde_json::json!({ "path": "/docs" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);

    // mkdir onto an existing directory conflicts
    let (status, _) =
        send(&app, post_json("/api/fs/mkdir", serde_json::json!({ "path": "/docs" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(
        &app,
        post_json(
            "/api/fs/create",
            serde_json::json!({ "path": "/docs/note.txt", "content": "x" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["size"], 1);

    let (status, json) = send(&app, get("/api/fs/read?path=/docs/note.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["content"], "x");

    // Reading a directory is a 400
    let (status, _) = send(&app, get("/api/fs/read?path=/docs")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json(
            "/api/fs/move",
            serde_json::json!({ "source": "/docs/note.txt", "destination": "/docs/renamed.txt" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        post_json(
            "/api/fs/copy",
            serde_json::json!({ "source": "/docs", "destination": "/docs-copy" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, get("/api/fs/read?path=/docs-copy/renamed.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["content"], "x");

    let (status, _) =
        send(&app, post_json("/api/fs/delete", serde_json::json!({ "path": "/docs-copy" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/fs/read?path=/docs-copy/renamed.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_sorts_and_decorates_urls() {
    let (_temp, app) = test_app().await;

    send(&app, post_json("/api/fs/mkdir", serde_json::json!({ "path": "/d/sub" }))).await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/d/b 2.txt" }))).await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/d/b 10.txt" }))).await;

    let (status, json) = send(&app, get("/api/fs/list?path=/d")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["path"], "/d");

    let items = json["items"].as_array().unwrap();
    let names: Vec<&str> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["sub", "b 2.txt", "b 10.txt"]);

    assert_eq!(items[0]["kind"], "dir");
    assert!(items[0]["url"].is_null());
    assert_eq!(items[1]["url"], "/files/d/b%202.txt");
}

#[tokio::test]
async fn pagination_bounds_are_enforced() {
    let (_temp, app) = test_app().await;
    send(&app, post_json("/api/fs/mkdir", serde_json::json!({ "path": "/p" }))).await;
    for i in 0..5 {
        send(
            &app,
            post_json("/api/fs/create", serde_json::json!({ "path": format!("/p/f{i}.txt") })),
        )
        .await;
    }

    for uri in ["/api/fs/list?path=/p&pageSize=1", "/api/fs/list?path=/p&limit=1000"] {
        let (status, _) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
    for uri in [
        "/api/fs/list?path=/p&pageSize=0",
        "/api/fs/list?path=/p&pageSize=1001",
        "/api/fs/list?path=/p&limit=0",
        "/api/fs/list?path=/p&limit=1001",
        "/api/fs/list?path=/p&page=0",
    ] {
        let (status, json) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["ok"], false);
    }

    let (_, json) = send(&app, get("/api/fs/list?path=/p&page=2&pageSize=2")).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["totalPages"], 3);

    let (_, json) = send(&app, get("/api/fs/list?path=/p&offset=4&limit=10")).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn chunked_upload_happy_path_out_of_order() {
    let (temp, app) = test_app().await;

    let (status, json) =
        send(&app, multipart_chunk("/up", "f.txt", "abc", 0, 3, b"AAA", false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complete"], false);
    assert_eq!(json["received"], 1);
    assert_eq!(json["total"], 3);

    let (_, json) = send(&app, multipart_chunk("/up", "f.txt", "abc", 2, 3, b"CCC", false)).await;
    assert_eq!(json["received"], 2);

    let (status, json) =
        send(&app, multipart_chunk("/up", "f.txt", "abc", 1, 3, b"BBB", false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complete"], true);
    assert_eq!(json["fileName"], "f.txt");

    let (_, json) = send(&app, get("/api/fs/read?path=/up/f.txt")).await;
    assert_eq!(json["content"], "AAABBBCCC");

    // Scratch directory is gone after assembly.
    assert!(!temp.path().join("up/.upload-temp").exists());
}

#[tokio::test]
async fn upload_status_and_cancel_round_trip() {
    let (temp, app) = test_app().await;

    send(&app, multipart_chunk("/up", "s.bin", "fp1", 1, 3, b"b", false)).await;

    let (status, json) = send(
        &app,
        post_json(
            "/api/fs/upload-status",
            serde_json::json!({ "fileId": "fp1", "fileName": "s.bin", "pathParam": "/up" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["uploadedChunks"], serde_json::json!([1]));
    assert_eq!(json["canResume"], true);

    let (status, _) = send(
        &app,
        post_json(
            "/api/fs/upload-cancel",
            serde_json::json!({ "fileId": "fp1", "fileName": "s.bin", "path": "/up" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!temp.path().join("up/.upload-temp").exists());
}

#[tokio::test]
async fn upload_conflict_and_replace_semantics() {
    let (_temp, app) = test_app().await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/x/hello.txt", "content": "OLD" })))
        .await;

    // Without replace: second chunk trips a 409 and the file is untouched.
    let (_, json) = send(&app, multipart_chunk("/x", "hello.txt", "c1", 0, 2, b"NE", false)).await;
    assert_eq!(json["received"], 1);
    let (status, json) =
        send(&app, multipart_chunk("/x", "hello.txt", "c1", 1, 2, b"W", false)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["ok"], false);

    let (_, json) = send(&app, get("/api/fs/read?path=/x/hello.txt")).await;
    assert_eq!(json["content"], "OLD");

    // With replace: assembly overwrites.
    send(&app, multipart_chunk("/x", "hello.txt", "c2", 0, 2, b"NE", true)).await;
    let (status, json) =
        send(&app, multipart_chunk("/x", "hello.txt", "c2", 1, 2, b"W", true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["complete"], true);

    let (_, json) = send(&app, get("/api/fs/read?path=/x/hello.txt")).await;
    assert_eq!(json["content"], "NEW");
}

#[tokio::test]
async fn upload_validation_failures_are_400() {
    let (_temp, app) = test_app().await;

    let (status, _) = send(&app, multipart_chunk("/up", "f", "ok", 0, 0, b"x", false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, multipart_chunk("/up", "f", "ok", 5, 3, b"x", false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        send(&app, multipart_chunk("/up", "f", "bad id!", 0, 1, b"x", false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, multipart_chunk("/up", "a/b", "ok", 0, 1, b"x", false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_headers_for_files_and_directories() {
    let (_temp, app) = test_app().await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/folder/a.txt", "content": "hi" })))
        .await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/folder/sub/b.txt", "content": "yo" })))
        .await;

    let response = app.clone().oneshot(get("/api/fs/download?path=/folder/a.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "2");
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("attachment; filename=\"a.txt\"")
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"hi");

    let response = app.clone().oneshot(get("/api/fs/download?path=/folder")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("folder.zip")
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..4], b"PK\x03\x04", "response must be a ZIP stream");

    let (status, _) = send(&app, get("/api/fs/download?path=/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_multiple_streams_a_zip() {
    let (_temp, app) = test_app().await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/m/a.txt", "content": "1" })))
        .await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/m/b.txt", "content": "2" })))
        .await;

    let request = post_json(
        "/api/fs/download-multiple",
        serde_json::json!({
            "basePath": "/m",
            "items": [ { "name": "a.txt", "path": "a.txt" }, { "name": "b.txt", "path": "b.txt" } ]
        }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");

    let (status, _) = send(
        &app,
        post_json("/api/fs/download-multiple", serde_json::json!({ "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn share_lifecycle_over_http() {
    let (_temp, app) = test_app().await;
    send(&app, post_json("/api/fs/create", serde_json::json!({ "path": "/docs/a.txt", "content": "hi" })))
        .await;

    let (status, json) = send(
        &app,
        post_json(
            "/api/fs/share/create",
            serde_json::json!({ "path": "/docs", "password": "pw", "title": "Drop" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = json["shareId"].as_str().unwrap().to_owned();
    assert_eq!(json["share"]["hasPassword"], true);
    assert_eq!(json["shareUrl"], format!("/share/{id}"));

    // Listing and metadata work without the password.
    let (_, json) = send(&app, get("/api/fs/share")).await;
    assert_eq!(json["shares"].as_array().unwrap().len(), 1);
    let (status, json) = send(&app, get(&format!("/api/fs/share/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["share"]["title"], "Drop");

    // Access without/with wrong password is a 401.
    let (status, _) =
        send(&app, post_json(&format!("/api/fs/share/{id}/access"), serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        post_json(&format!("/api/fs/share/{id}/access"), serde_json::json!({ "password": "no" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct password returns the directory listing with scoped URLs.
    let (status, json) = send(
        &app,
        post_json(&format!("/api/fs/share/{id}/access"), serde_json::json!({ "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["kind"], "dir");
    let items = json["items"].as_array().unwrap();
    assert_eq!(items[0]["name"], "a.txt");
    assert_eq!(items[0]["url"], format!("/share/{id}/download?path=a.txt"));

    // The scoped download endpoint streams the file.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/fs/share/{id}/download?path=a.txt&password=pw")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"hi");

    // Escaping the shared tree is rejected.
    let (status, _) = send(
        &app,
        get(&format!("/api/fs/share/{id}/download?path=../secret&password=pw")),
    )
    .await;
    assert_ne!(status, StatusCode::OK);

    // Update clears the password; delete removes the share.
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/fs/share/{id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "password": "" }).to_string()))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["share"]["hasPassword"], false);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/fs/share/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get(&format!("/api/fs/share/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Accessing a vanished share is 410 Gone.
    let (status, _) =
        send(&app, post_json(&format!("/api/fs/share/{id}/access"), serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::GONE);
}
