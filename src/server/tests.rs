use super::{ServerConfig, SizeRequest, parse_size, router};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

fn small_config() -> ServerConfig {
    ServerConfig {
        default_size: 4096,
        max_size: 200_000,
        ..ServerConfig::default()
    }
}

async fn get(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router(&small_config())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let length = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, length, body.to_vec())
}

#[test]
fn size_parsing() {
    assert_eq!(parse_size(None), SizeRequest::Default);
    assert_eq!(parse_size(Some("abc")), SizeRequest::Default);
    assert_eq!(parse_size(Some("")), SizeRequest::Default);
    assert_eq!(parse_size(Some("1.5")), SizeRequest::Default);
    assert_eq!(parse_size(Some("1024")), SizeRequest::Bytes(1024));
    assert_eq!(parse_size(Some(" 64 ")), SizeRequest::Bytes(64));
    assert!(matches!(parse_size(Some("0")), SizeRequest::Invalid(_)));
    assert!(matches!(parse_size(Some("-5")), SizeRequest::Invalid(_)));
    assert_eq!(
        parse_size(Some("99999999999999999999999")),
        SizeRequest::Bytes(u64::MAX)
    );
}

#[tokio::test]
async fn ping_answers_pong() {
    let (status, _, body) = get("/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"pong");
}

#[tokio::test]
async fn data_returns_exact_size() {
    let (status, length, body) = get("/data?size=1024").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(length.as_deref(), Some("1024"));
    assert_eq!(body.len(), 1024);
}

#[tokio::test]
async fn data_spans_multiple_blocks() {
    let (status, length, body) = get("/data?size=150000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(length.as_deref(), Some("150000"));
    assert_eq!(body.len(), 150_000);
}

#[tokio::test]
async fn data_defaults_and_clamps() {
    let (_, _, body) = get("/data").await;
    assert_eq!(body.len(), 4096);

    let (_, _, body) = get("/data?size=lots").await;
    assert_eq!(body.len(), 4096);

    let (status, length, body) = get("/data?size=5000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(length.as_deref(), Some("200000"));
    assert_eq!(body.len(), 200_000);
}

#[tokio::test]
async fn non_positive_size_is_rejected() {
    let (status, _, body) = get("/data?size=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("positive"));

    let (status, _, _) = get("/data?size=-10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_and_unknown_paths() {
    let (status, _, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("/ping"));

    let (status, _, body) = get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Not Found");
}
