//! The capability every mounted handler group must provide.

use std::convert::Infallible;

use axum::{body::Body, http::Request, response::Response, Router};
use futures_util::future::BoxFuture;
use tower::ServiceExt;

/// A request handler owning everything below one mount prefix.
///
/// The request it receives has already had the mount prefix stripped from
/// its URI path. The original URI is available as an
/// [`axum::extract::OriginalUri`] extension.
pub trait HandlerGroup: Send + Sync + 'static {
    /// Handle a request and produce a response.
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response>;
}

impl HandlerGroup for Router {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        let router = self.clone();
        Box::pin(async move {
            let result: Result<Response, Infallible> = router.oneshot(request).await;
            match result {
                Ok(response) => response,
                Err(never) => match never {},
            }
        })
    }
}
