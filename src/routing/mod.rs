//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     register(prefix, group)*
//!     → matcher.rs (validate prefix)
//!     → table.rs (reject duplicates, keep order)
//!     → build() freezes an immutable BindingTable
//!
//! Incoming Request (path)
//!     → router.rs (first binding whose prefix matches)
//!     → strip prefix, keep query
//!     → handler.rs (HandlerGroup::call) or 404
//! ```
//!
//! # Design Decisions
//! - Bindings registered at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: first match wins, in registration order

use thiserror::Error;

pub mod handler;
pub mod matcher;
pub mod router;
pub mod table;

pub use handler::HandlerGroup;
pub use matcher::Prefix;
pub use router::{Dispatcher, MatchedBinding, Resolved};
pub use table::{Binding, BindingTable, BindingTableBuilder};

/// Registration-time configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("invalid prefix {prefix:?}: {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    #[error("prefix {prefix:?} is already registered")]
    DuplicatePrefix { prefix: String },
}
