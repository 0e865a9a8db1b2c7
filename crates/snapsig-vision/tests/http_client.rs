//! `OpenRouterClient` against a local HTTP listener serving canned answers.

use std::net::SocketAddr;
use std::time::Duration;

use snapsig_models::ApiConfig;
use snapsig_vision::{OpenRouterClient, VisionError, VisionModel};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn config_for(addr: SocketAddr) -> ApiConfig {
    ApiConfig {
        key: "sk-test".to_string(),
        endpoint: format!("http://{addr}/api/v1/chat/completions"),
        models_endpoint: format!("http://{addr}/api/v1/models"),
        request_timeout_seconds: 1,
        check_timeout_seconds: 1,
        ..ApiConfig::default()
    }
}

/// Reads one request (headers plus `content-length` bytes of body).
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let body_len = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answers a single request with `status` and `body`; yields the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });
    (addr, handle)
}

#[tokio::test]
async fn analyze_sends_credentials_and_returns_trimmed_reply() {
    let (addr, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"content":" up 2 min "}}]}"#,
    )
    .await;
    let client = OpenRouterClient::new(config_for(addr)).unwrap();

    let reply = client.analyze(PNG).await.unwrap();
    assert_eq!(reply, "up 2 min");

    let request = server.await.unwrap().to_lowercase();
    assert!(request.starts_with("post /api/v1/chat/completions"), "{request}");
    assert!(request.contains("authorization: bearer sk-test"));
    assert!(request.contains("http-referer: https://openrouter.ai"));
    assert!(request.contains("x-title: screenshot trading bot"));
    assert!(request.contains("data:image/png;base64,"));
}

#[tokio::test]
async fn analyze_reports_non_success_status() {
    let (addr, server) = serve_once("502 Bad Gateway", r#"{"error":"upstream"}"#).await;
    let client = OpenRouterClient::new(config_for(addr)).unwrap();

    let err = client.analyze(PNG).await.unwrap_err();
    match err {
        VisionError::Status { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("upstream"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn analyze_times_out_on_stalled_endpoint() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        // Hold the connection open without answering
        tokio::time::sleep(Duration::from_secs(5)).await;
    });
    let client = OpenRouterClient::new(config_for(addr)).unwrap();

    let err = client.analyze(PNG).await.unwrap_err();
    assert!(matches!(err, VisionError::Timeout(1)), "{err:?}");
    server.abort();
}

#[tokio::test]
async fn check_connection_rejects_non_ok_status() {
    let (addr, server) = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#).await;
    let client = OpenRouterClient::new(config_for(addr)).unwrap();

    let err = client.check_connection().await.unwrap_err();
    assert!(matches!(err, VisionError::Unreachable(_)), "{err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn check_connection_accepts_ok() {
    let (addr, server) = serve_once("200 OK", r#"{"data":[]}"#).await;
    let client = OpenRouterClient::new(config_for(addr)).unwrap();

    client.check_connection().await.unwrap();

    let request = server.await.unwrap().to_lowercase();
    assert!(request.starts_with("get /api/v1/models"), "{request}");
    assert!(request.contains("authorization: bearer sk-test"));
}
