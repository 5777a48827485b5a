//! Shared utilities for integration tests.

use std::net::SocketAddr;

use review_gateway::config::{GatewayConfig, MountConfig};
use review_gateway::groups::build_table;
use review_gateway::{HttpServer, Shutdown};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Start a mock upstream that answers every request with
/// `"<name> <path> <x-forwarded-prefix>"`.
pub async fn start_mock_upstream(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut lines = BufReader::new(read).lines();

                let request_line = lines.next_line().await.ok().flatten().unwrap_or_default();
                let path = request_line.split(' ').nth(1).unwrap_or("?").to_string();

                let mut forwarded_prefix = String::from("-");
                let mut content_length = 0usize;
                while let Ok(Some(line)) = lines.next_line().await {
                    if line.is_empty() {
                        break;
                    }
                    if let Some((key, value)) = line.split_once(':') {
                        if key.eq_ignore_ascii_case("x-forwarded-prefix") {
                            forwarded_prefix = value.trim().to_string();
                        } else if key.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                }

                let mut body = vec![0u8; content_length];
                let _ = lines.into_inner().read_exact(&mut body).await;

                let body = format!("{name} {path} {forwarded_prefix}");
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = write.write_all(response.as_bytes()).await;
                let _ = write.shutdown().await;
            });
        }
    });

    addr
}

pub fn upstream_mount(prefix: &str, addr: SocketAddr) -> MountConfig {
    MountConfig {
        name: None,
        prefix: prefix.to_string(),
        upstream: Some(addr.to_string()),
        static_dir: None,
    }
}

/// A running gateway on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_gateway(mounts: Vec<MountConfig>) -> TestGateway {
    let config = GatewayConfig {
        mounts,
        ..GatewayConfig::default()
    };
    let table = build_table(&config).unwrap();
    let server = HttpServer::new(table, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    TestGateway {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
