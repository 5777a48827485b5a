//! Binding table construction.
//!
//! # Responsibilities
//! - Register handler groups under validated prefixes
//! - Reject duplicate prefixes at registration time
//! - Freeze bindings into an immutable, ordered table
//!
//! # Design Decisions
//! - Registration and serving are separate types: a `BindingTable` cannot be
//!   mutated once built
//! - Order is preserved; lookups are first-match-wins
//! - Shadowed bindings are legal but logged

use std::fmt;
use std::sync::Arc;

use crate::routing::{HandlerGroup, Prefix, RoutingError};

/// One prefix bound to one handler group.
pub struct Binding {
    name: String,
    prefix: Prefix,
    group: Arc<dyn HandlerGroup>,
}

impl Binding {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn group(&self) -> &Arc<dyn HandlerGroup> {
        &self.group
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Collects bindings during startup.
#[derive(Debug, Default)]
pub struct BindingTableBuilder {
    bindings: Vec<Binding>,
}

impl BindingTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `group` under `prefix`, named after the prefix's last segment.
    pub fn register<G>(self, prefix: &str, group: G) -> Result<Self, RoutingError>
    where
        G: HandlerGroup,
    {
        let prefix = Prefix::parse(prefix)?;
        let name = prefix.last_segment().to_string();
        self.push(name, prefix, Arc::new(group))
    }

    /// Register `group` under `prefix` with an explicit name.
    pub fn register_named<G>(
        self,
        name: impl Into<String>,
        prefix: &str,
        group: G,
    ) -> Result<Self, RoutingError>
    where
        G: HandlerGroup,
    {
        let prefix = Prefix::parse(prefix)?;
        self.push(name.into(), prefix, Arc::new(group))
    }

    /// Register an already shared handler group.
    pub fn register_shared(
        self,
        name: impl Into<String>,
        prefix: &str,
        group: Arc<dyn HandlerGroup>,
    ) -> Result<Self, RoutingError> {
        let prefix = Prefix::parse(prefix)?;
        self.push(name.into(), prefix, group)
    }

    fn push(
        mut self,
        name: String,
        prefix: Prefix,
        group: Arc<dyn HandlerGroup>,
    ) -> Result<Self, RoutingError> {
        if self.bindings.iter().any(|b| b.prefix == prefix) {
            return Err(RoutingError::DuplicatePrefix {
                prefix: prefix.to_string(),
            });
        }

        tracing::debug!(name = %name, prefix = %prefix, "Handler group registered");
        self.bindings.push(Binding { name, prefix, group });
        Ok(self)
    }

    /// Freeze the registered bindings.
    pub fn build(self) -> BindingTable {
        let table = BindingTable {
            bindings: self.bindings,
        };

        for (shadowed, by) in table.shadowed() {
            tracing::warn!(
                shadowed = %shadowed.prefix,
                by = %by.prefix,
                "Mount is unreachable: an earlier prefix matches all of its paths"
            );
        }

        table
    }
}

/// Immutable, ordered set of bindings shared by all request handlers.
#[derive(Debug)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn builder() -> BindingTableBuilder {
        BindingTableBuilder::new()
    }

    /// Bindings in registration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings no path can reach, each paired with the earlier binding that
    /// matches every path it would.
    pub fn shadowed(&self) -> Vec<(&Binding, &Binding)> {
        self.bindings
            .iter()
            .enumerate()
            .filter_map(|(i, later)| {
                self.bindings[..i]
                    .iter()
                    .find(|earlier| later.prefix.is_covered_by(&earlier.prefix))
                    .map(|earlier| (later, earlier))
            })
            .collect()
    }

    /// First binding whose prefix matches `path`, with the stripped remainder.
    pub fn lookup<'t, 'p>(&'t self, path: &'p str) -> Option<(&'t Binding, &'p str)> {
        self.bindings
            .iter()
            .find_map(|binding| binding.prefix.strip(path).map(|rest| (binding, rest)))
    }
}
