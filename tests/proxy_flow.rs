//! End-to-end tests: real listener, real mock backends.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use forward_proxy::config::ProxyConfig;
use forward_proxy::error::PROXY_ERROR_BODY;
use forward_proxy::http::HttpServer;
use forward_proxy::observability::MemorySink;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_encoded_target_is_forwarded_and_logged() {
    let (backend, mut captured) =
        common::start_capturing_backend("Vary: Origin\r\nX-Backend: yes\r\n", "pong").await;
    let (proxy, sink, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let url = format!(
        "http://{}/target=http%3A%2F%2F127.0.0.1%3A{}%2Fping",
        proxy,
        backend.port()
    );
    let res = common::client()
        .get(&url)
        .header("postman-token", "5c1f")
        .header("user-agent", "PostmanRuntime/7.36")
        .header("x-trace", "abc")
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-backend"], "yes");
    assert!(res.headers().get("vary").is_none());
    assert_eq!(res.text().await.unwrap(), "pong");

    let seen = captured.recv().await.unwrap();
    assert_eq!(seen.request_line(), "GET /ping HTTP/1.1");
    assert_eq!(seen.header("host"), Some(format!("127.0.0.1:{}", backend.port())));
    assert_eq!(seen.header("x-trace").as_deref(), Some("abc"));
    assert!(seen.header("postman-token").is_none());
    assert!(seen.header("user-agent").is_none());

    let blocks = sink.blocks();
    assert_eq!(blocks.len(), 1, "exactly one log block per logged request");
    assert!(blocks[0].contains(&format!("Proxying to: http://127.0.0.1:{}/ping", backend.port())));
    assert!(blocks[0].contains("Body: null"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_default_backend_streams_without_logging() {
    let (backend, mut captured) = common::start_capturing_backend("", "stored").await;
    let mut config = ProxyConfig::default();
    config.rewrite.default_backend = format!("http://{}", backend);
    let (proxy, sink, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .post(format!("http://{}/upload?name=a.txt", proxy))
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "stored");

    let seen = captured.recv().await.unwrap();
    assert_eq!(seen.request_line(), "POST /upload?name=a.txt HTTP/1.1");
    assert_eq!(seen.header("content-length").as_deref(), Some("7"));
    assert_eq!(seen.body_text(), "payload");
    assert!(sink.blocks().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_logged_body_is_cleaned_before_forwarding() {
    let (backend, mut captured) = common::start_capturing_backend("", "{}").await;
    let mut config = ProxyConfig::default();
    config.rewrite.default_backend = format!("http://{}", backend);
    let (proxy, sink, shutdown) = common::start_proxy(config).await;

    let body = r#"{"callback":"http://localhost:8080/?target=http://hooks.test/done","note":"O'Brien"}"#;
    let res = common::client()
        .post(format!("http://{}/api/jobs", proxy))
        .header("content-type", "application/json")
        .header("referer", "http://localhost:8080?target=http://app.test/jobs")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = captured.recv().await.unwrap();
    let expected = r#"{"callback":"http://hooks.test/done","note":"O'Brien"}"#;
    assert_eq!(seen.body_text(), expected);
    assert_eq!(seen.header("content-length"), Some(expected.len().to_string()));
    assert_eq!(seen.header("referer").as_deref(), Some("http://app.test/jobs"));

    let blocks = sink.blocks();
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].contains("Method: POST"));
    assert!(blocks[0].contains(r#""note":"O\'Brien""#));
    assert!(blocks[0].contains("-H 'referer: http://app.test/jobs'"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_target_is_plain_500() {
    let (proxy, sink, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(format!("http://{}/?target=http://127.0.0.1:1/nothing", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), PROXY_ERROR_BODY);
    // Logging happens before dispatch, so the failed request is still logged.
    assert_eq!(sink.blocks().len(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_target_is_plain_500() {
    let sink = Arc::new(MemorySink::new());
    let server = HttpServer::with_sink(ProxyConfig::default(), sink.clone()).unwrap();

    let response = server
        .router()
        .oneshot(Request::builder().uri("/?target=::::").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], PROXY_ERROR_BODY.as_bytes());
    assert!(sink.blocks().is_empty());
}

#[tokio::test]
async fn test_absolute_form_request_goes_to_its_own_host() {
    let (backend, mut captured) = common::start_capturing_backend("", "direct").await;
    let sink = Arc::new(MemorySink::new());
    let server = HttpServer::with_sink(ProxyConfig::default(), sink.clone()).unwrap();

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .uri(format!("http://{}/status", backend))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"direct");

    let seen = captured.recv().await.unwrap();
    assert_eq!(seen.request_line(), "GET /status HTTP/1.1");
    assert!(sink.blocks().is_empty());
}

#[tokio::test]
async fn test_shutdown_trigger_stops_server() {
    let server = HttpServer::new(ProxyConfig::default()).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = forward_proxy::Shutdown::new();
    let rx = shutdown.subscribe();

    let handle = tokio::spawn(server.run(listener, rx));
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop");
    assert!(result.unwrap().is_ok());
}
