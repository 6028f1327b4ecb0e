use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

/// Serve exactly one HTTP response and hand back the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).into_owned()
    });
    (format!("http://{addr}"), handle)
}

fn client_for(base_url: &str) -> GeminiClient {
    GeminiClient::new(
        GeminiSettings::new("test-key")
            .with_model("test-model")
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap()
}

#[tokio::test]
async fn test_generate_returns_first_candidate_text() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"parts":[{"text":"{\"ok\":true}"}]},"finishReason":"STOP"}]}"#,
    )
    .await;
    let client = client_for(&url);
    let text = client.generate("analyze me").await.unwrap();
    assert_eq!(text, r#"{"ok":true}"#);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /models/test-model:generateContent?key=test-key"));
    assert!(request.to_lowercase().contains("content-type: application/json"));
    assert!(request.contains(r#"{"contents":[{"parts":[{"text":"analyze me"}]}]}"#));
}

#[tokio::test]
async fn test_non_success_status_is_error_and_falls_back() {
    let (url, _server) = serve_once("429 Too Many Requests", r#"{"error":"quota"}"#).await;
    let client = client_for(&url);
    let err = client.generate("x").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Status { status: 429, .. }));
    assert!(err.is_transport());

    let (url, _server) = serve_once("500 Internal Server Error", "boom").await;
    let client = client_for(&url);
    assert_eq!(client.complete("x").await.unwrap(), fallback_payload());
}

#[tokio::test]
async fn test_malformed_envelope_is_error() {
    let (url, _server) = serve_once("200 OK", r#"{"candidates":[]}"#).await;
    let err = client_for(&url).generate("x").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Envelope(ref m) if m.contains("empty candidates")));

    let (url, _server) = serve_once("200 OK", "not json at all").await;
    let err = client_for(&url).generate("x").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Envelope(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_falls_back() {
    // Bind then drop to get a local port nobody is listening on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client_for(&format!("http://127.0.0.1:{port}"));
    assert!(client.generate("x").await.unwrap_err().is_transport());

    let text = client.complete("x").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["totalVideosAnalyzed"], 0);
    assert_eq!(value["categories"], serde_json::json!([]));
    assert_eq!(
        value["keyInsights"]["categoryInsight"],
        "Failed to analyze categories due to API error."
    );
}

#[test]
fn test_preview_truncates_on_char_boundary() {
    let long = "é".repeat(ERROR_BODY_PREVIEW + 10);
    assert_eq!(preview(&long).chars().count(), ERROR_BODY_PREVIEW);
    assert_eq!(preview("short"), "short");
}
