//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (add or keep request ID)
//!     → routing::Dispatcher (select mount, strip prefix)
//!     → handler group response, or response.rs 404
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
