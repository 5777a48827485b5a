//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Look up the binding for an incoming request path
//! - Rewrite the request URI to the path remainder
//! - Forward to the selected handler group or answer 404
//!
//! # Design Decisions
//! - Holds the frozen table behind `Arc`; `dispatch` takes `&self` and never locks
//! - Explicit NoMatch rather than silent default
//! - Query strings survive prefix stripping

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::OriginalUri,
    http::{uri::PathAndQuery, Request, Uri},
    response::Response,
};

use crate::http::response::not_found;
use crate::observability::metrics;
use crate::routing::{Binding, BindingTable, Prefix};

/// Request extension identifying the binding that accepted a request.
#[derive(Debug, Clone)]
pub struct MatchedBinding {
    pub name: String,
    pub prefix: Prefix,
}

/// Result of a pure lookup.
#[derive(Debug)]
pub struct Resolved<'t, 'p> {
    pub binding: &'t Binding,
    /// Path the handler group sees, always starting with `/`.
    pub remainder: &'p str,
}

/// Prefix dispatcher over a frozen binding table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<BindingTable>,
}

impl Dispatcher {
    pub fn new(table: BindingTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Find the binding that owns `path` without invoking it.
    pub fn resolve<'t, 'p>(&'t self, path: &'p str) -> Option<Resolved<'t, 'p>> {
        self.table
            .lookup(path)
            .map(|(binding, remainder)| Resolved { binding, remainder })
    }

    /// Forward `request` to the handler group owning its path.
    pub async fn dispatch(&self, mut request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let original = request.uri().clone();

        let Some(resolved) = self.resolve(original.path()) else {
            tracing::debug!(method = %method, path = %original.path(), "No mount matched");
            metrics::record_request("none", method.as_str(), 404, start);
            return not_found(original.path());
        };

        let binding = resolved.binding;
        let Some(rewritten) = rewrite_uri(&original, resolved.remainder) else {
            tracing::error!(path = %original.path(), "Failed to rewrite request URI");
            return not_found(original.path());
        };

        tracing::debug!(
            mount = %binding.name(),
            prefix = %binding.prefix(),
            method = %method,
            path = %original.path(),
            forwarded_path = %rewritten.path(),
            "Dispatching request"
        );

        let extensions = request.extensions_mut();
        if extensions.get::<OriginalUri>().is_none() {
            extensions.insert(OriginalUri(original.clone()));
        }
        extensions.insert(MatchedBinding {
            name: binding.name().to_string(),
            prefix: binding.prefix().clone(),
        });
        *request.uri_mut() = rewritten;

        let response = binding.group().call(request).await;
        metrics::record_request(binding.name(), method.as_str(), response.status().as_u16(), start);
        response
    }
}

/// Replace the path of `original` with `remainder`, keeping the query.
///
/// Scheme and authority are dropped; handler groups address the path only.
fn rewrite_uri(original: &Uri, remainder: &str) -> Option<Uri> {
    let path_and_query = match original.query() {
        Some(query) => format!("{remainder}?{query}"),
        None => remainder.to_string(),
    };
    let path_and_query = PathAndQuery::try_from(path_and_query).ok()?;
    Uri::from_parts({
        let mut parts = axum::http::uri::Parts::default();
        parts.path_and_query = Some(path_and_query);
        parts
    })
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::to_bytes,
        http::StatusCode,
        routing::{any, get},
        Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A group that echoes its name, the path it saw and the original URI.
    fn echo(name: &'static str) -> Router {
        let handler = move |OriginalUri(original): OriginalUri, request: Request<Body>| async move {
            let seen = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_default();
            format!("{name} {seen} {original}")
        };
        Router::new()
            .route("/", any(handler))
            .route("/{*rest}", any(handler))
    }

    fn api_table() -> BindingTable {
        BindingTable::builder()
            .register("/api/auth", echo("A"))
            .unwrap()
            .register("/api/repos", echo("R"))
            .unwrap()
            .register("/api/reviews", echo("Rv"))
            .unwrap()
            .register("/api/users", echo("U"))
            .unwrap()
            .build()
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_strips_prefix() {
        let dispatcher = Dispatcher::new(api_table());

        let response = dispatcher.dispatch(request("/api/repos/42")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "R /42 /api/repos/42");
    }

    #[tokio::test]
    async fn test_dispatch_bare_prefix_sees_root() {
        let dispatcher = Dispatcher::new(api_table());

        let response = dispatcher.dispatch(request("/api/auth")).await;
        assert_eq!(body_text(response).await, "A / /api/auth");
    }

    #[tokio::test]
    async fn test_dispatch_keeps_query() {
        let dispatcher = Dispatcher::new(api_table());

        let response = dispatcher.dispatch(request("/api/users/7?fields=name")).await;
        assert_eq!(body_text(response).await, "U /7?fields=name /api/users/7?fields=name");

        let response = dispatcher.dispatch(request("/api/users?page=2")).await;
        assert_eq!(body_text(response).await, "U /?page=2 /api/users?page=2");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found_and_invokes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let counting = Router::new().fallback(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "hit"
            }
        });

        let dispatcher = Dispatcher::new(
            BindingTable::builder()
                .register("/api/auth", counting)
                .unwrap()
                .build(),
        );

        for path in ["/api/unknown", "/api/authx", "/", "/api"] {
            let response = dispatcher.dispatch(request(path)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_matched_binding_extension() {
        let group = Router::new().route(
            "/me",
            get(|request: Request<Body>| async move {
                let matched = request.extensions().get::<MatchedBinding>().cloned().unwrap();
                format!("{}:{}", matched.name, matched.prefix)
            }),
        );
        let dispatcher = Dispatcher::new(
            BindingTable::builder()
                .register("/api/users", group)
                .unwrap()
                .build(),
        );

        let response = dispatcher.dispatch(request("/api/users/me")).await;
        assert_eq!(body_text(response).await, "users:/api/users");
    }

    #[test]
    fn test_resolve_is_order_independent_for_disjoint_prefixes() {
        let prefixes = ["/api/auth", "/api/repos", "/api/reviews", "/api/users"];
        let paths = [
            "/api/auth/login",
            "/api/repos/42",
            "/api/reviews",
            "/api/users/7/settings",
            "/api/unknown",
            "/api/repository",
        ];

        let forward = Dispatcher::new(
            prefixes
                .iter()
                .try_fold(BindingTable::builder(), |b, p| b.register(p, Router::new()))
                .unwrap()
                .build(),
        );
        let reverse = Dispatcher::new(
            prefixes
                .iter()
                .rev()
                .try_fold(BindingTable::builder(), |b, p| b.register(p, Router::new()))
                .unwrap()
                .build(),
        );

        for path in paths {
            let a = forward.resolve(path).map(|r| (r.binding.name().to_string(), r.remainder));
            let b = reverse.resolve(path).map(|r| (r.binding.name().to_string(), r.remainder));
            assert_eq!(a, b, "path {path}");
        }
    }

    #[test]
    fn test_rewrite_uri_drops_authority() {
        let original: Uri = "http://example.com/api/repos/1?x=y".parse().unwrap();
        let rewritten = rewrite_uri(&original, "/1").unwrap();
        assert_eq!(rewritten.to_string(), "/1?x=y");
        assert!(rewritten.authority().is_none());
    }
}
