//! Prefix-based request dispatcher for the code review API.
//!
//! Independently owned handler groups are registered under path prefixes
//! (`/api/auth`, `/api/repos`, `/api/reviews`, `/api/users`) and composed
//! into one HTTP surface:
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use review_gateway::{BindingTable, GatewayConfig, HttpServer};
//!
//! # fn main() -> Result<(), review_gateway::routing::RoutingError> {
//! let repos = Router::new().route("/{id}", get(|| async { "repo" }));
//! let table = BindingTable::builder()
//!     .register("/api/repos", repos)?
//!     .build();
//! let server = HttpServer::new(table, &GatewayConfig::default());
//! # let _ = server;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod groups;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{BindingTable, Dispatcher, HandlerGroup, RoutingError};
