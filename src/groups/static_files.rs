//! Handler group serving files from a directory.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::routing::HandlerGroup;

/// Serves the files below `root`; the stripped path is resolved against it.
#[derive(Clone)]
pub struct StaticGroup {
    root: PathBuf,
    serve_dir: ServeDir,
}

impl StaticGroup {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "Static directory does not exist");
        }
        Self {
            serve_dir: ServeDir::new(&root),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl HandlerGroup for StaticGroup {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        let serve_dir = self.serve_dir.clone();
        Box::pin(async move {
            let result: Result<_, Infallible> = serve_dir.oneshot(request).await;
            match result {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            }
        })
    }
}
