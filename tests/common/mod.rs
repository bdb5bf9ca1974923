//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use build_gateway::config::schema::TokenEntry;
use build_gateway::{GatewayConfig, HttpServer, Shutdown};

/// Start a mock upstream that returns a fixed JSON response and counts
/// the requests it receives.
pub async fn start_mock_upstream(response: &'static str) -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 64 * 1024];
                        let _ = socket.read(&mut buf).await;
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, calls)
}

/// Start a mock upstream that captures the raw request head it receives.
#[allow(dead_code)]
pub async fn start_capturing_upstream() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let sink = sink.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 64 * 1024];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        sink.lock()
                            .unwrap()
                            .push(String::from_utf8_lossy(&buf[..n]).to_string());
                        let body = "{}";
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, captured)
}

/// Token table shared by the integration tests.
pub fn test_tokens() -> Vec<TokenEntry> {
    vec![
        TokenEntry {
            token: "tok-viewer".into(),
            principal: "viewer-svc".into(),
            role: "viewer".into(),
            namespace: "ns-a".into(),
        },
        TokenEntry {
            token: "tok-editor".into(),
            principal: "editor-svc".into(),
            role: "editor".into(),
            namespace: "ns-a".into(),
        },
        TokenEntry {
            token: "tok-admin".into(),
            principal: "admin-svc".into(),
            role: "admin".into(),
            namespace: "ns-a".into(),
        },
    ]
}

/// Spawn the gateway on an ephemeral port in front of the given upstream.
/// Returns the gateway base URL and the shutdown handle.
pub async fn spawn_gateway(mut config: GatewayConfig, upstream: SocketAddr) -> (String, Shutdown) {
    config.upstream.address = upstream.to_string();
    if config.auth.tokens.is_empty() {
        config.auth.tokens = test_tokens();
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::from_config(config);

    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    (format!("http://{addr}"), shutdown)
}

/// A reqwest client that never pools connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
