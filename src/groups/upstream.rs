//! Handler group backed by an upstream HTTP service.
//!
//! # Responsibilities
//! - Forward the stripped request to the upstream address
//! - Tell the upstream which prefix was removed (`x-forwarded-prefix`)
//! - Map connection failures to 502
//!
//! # Design Decisions
//! - One pooled client shared by every upstream mount
//! - Requests go out as HTTP/1.1 regardless of the inbound version
//! - Hop-by-hop headers are dropped in both directions, including any
//!   header the `Connection` header names

use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderMap, HeaderName, HeaderValue, Request, Uri, Version,
    },
    response::Response,
};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::request::request_id;
use crate::http::response::bad_gateway;
use crate::routing::{HandlerGroup, MatchedBinding};

pub type UpstreamClient = Client<HttpConnector, Body>;

pub const X_FORWARDED_PREFIX: &str = "x-forwarded-prefix";

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, plus whatever `Connection` lists.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Build the shared upstream client.
pub fn client(connect_timeout: Duration) -> UpstreamClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    connector.set_nodelay(true);
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Forwards every request to one upstream service.
#[derive(Clone)]
pub struct UpstreamGroup {
    authority: Authority,
    client: UpstreamClient,
}

impl UpstreamGroup {
    /// `address` is a `host:port` pair.
    pub fn new(address: &str, client: UpstreamClient) -> Result<Self, axum::http::uri::InvalidUri> {
        Ok(Self {
            authority: address.parse()?,
            client,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl HandlerGroup for UpstreamGroup {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        let group = self.clone();
        Box::pin(async move { group.forward(request).await })
    }
}

impl UpstreamGroup {
    async fn forward(self, request: Request<Body>) -> Response {
        let request_id = request_id(&request).unwrap_or("unknown").to_string();
        let (mut parts, body) = request.into_parts();
        let path = parts.uri.path().to_string();

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = match Uri::from_parts(uri_parts) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Invalid upstream URI");
                return bad_gateway(&path);
            }
        };
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);
        if let Some(matched) = parts.extensions.get::<MatchedBinding>() {
            if let Ok(value) = HeaderValue::from_str(matched.prefix.as_str()) {
                parts.headers.insert(X_FORWARDED_PREFIX, value);
            }
        }

        tracing::debug!(
            request_id = %request_id,
            upstream = %self.authority,
            uri = %parts.uri,
            "Forwarding to upstream"
        );

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => {
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    upstream = %self.authority,
                    error = %e,
                    "Upstream error"
                );
                bad_gateway(&path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_new_parses_authority() {
        let group = UpstreamGroup::new("127.0.0.1:3002", client(Duration::from_secs(1))).unwrap();
        assert_eq!(group.authority().as_str(), "127.0.0.1:3002");
        assert_eq!(group.authority().port_u16(), Some(3002));

        assert!(UpstreamGroup::new("not a host", client(Duration::from_secs(1))).is_err());
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close, X-Session-Hint"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("proxy-connection", HeaderValue::from_static("keep-alive"));
        headers.insert("x-session-hint", HeaderValue::from_static("abc"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert("x-request-id", HeaderValue::from_static("req-1"));

        strip_hop_by_hop(&mut headers);

        let mut left: Vec<_> = headers.keys().map(|k| k.as_str()).collect();
        left.sort_unstable();
        assert_eq!(left, vec!["content-type", "x-request-id"]);
    }

    #[tokio::test]
    async fn test_hop_by_hop_dropped_both_ways() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // One-shot upstream that reports which hop-by-hop headers reached it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            let head = String::from_utf8_lossy(&buf[..read]).to_ascii_lowercase();
            let seen = ["keep-alive:", "proxy-connection:", "x-session-hint:"]
                .iter()
                .filter(|h| head.contains(*h))
                .count();
            let body = seen.to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nKeep-Alive: timeout=5\r\nConnection: X-Upstream-Hint\r\nX-Upstream-Hint: 1\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let group = UpstreamGroup::new(&addr.to_string(), client(Duration::from_secs(1))).unwrap();
        let request = Request::builder()
            .uri("/pulls")
            .header(header::CONNECTION, "x-session-hint")
            .header("keep-alive", "timeout=5")
            .header("proxy-connection", "keep-alive")
            .header("x-session-hint", "abc")
            .body(Body::empty())
            .unwrap();
        let response = group.call(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key("keep-alive"));
        assert!(!response.headers().contains_key("x-upstream-hint"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"0");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let group = UpstreamGroup::new(&addr.to_string(), client(Duration::from_secs(1))).unwrap();
        let request = Request::builder().uri("/42").body(Body::empty()).unwrap();
        let response = group.call(request).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
