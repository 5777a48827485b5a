//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate prefixes and reject duplicates
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, MountConfig};
use crate::routing::{Prefix, RoutingError};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.max_in_flight must be greater than 0")]
    MaxInFlight,

    #[error("timeouts.request_secs must be greater than 0")]
    RequestTimeout,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("mount {prefix:?}: {source}")]
    Prefix {
        prefix: String,
        #[source]
        source: RoutingError,
    },

    #[error("mount {prefix:?}: exactly one of `upstream` or `static_dir` must be set")]
    Target { prefix: String },

    #[error("mount {prefix:?}: upstream {upstream:?} is not a host:port address")]
    Upstream { prefix: String, upstream: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_in_flight == 0 {
        errors.push(ValidationError::MaxInFlight);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for mount in &config.mounts {
        validate_mount(mount, &mut seen, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_mount(
    mount: &MountConfig,
    seen: &mut HashSet<Prefix>,
    errors: &mut Vec<ValidationError>,
) {
    match Prefix::parse(mount.prefix.as_str()) {
        Ok(prefix) => {
            if !seen.insert(prefix.clone()) {
                errors.push(ValidationError::Prefix {
                    prefix: mount.prefix.clone(),
                    source: RoutingError::DuplicatePrefix {
                        prefix: prefix.to_string(),
                    },
                });
            }
        }
        Err(source) => errors.push(ValidationError::Prefix {
            prefix: mount.prefix.clone(),
            source,
        }),
    }

    if mount.target().is_none() {
        errors.push(ValidationError::Target {
            prefix: mount.prefix.clone(),
        });
    }

    if let Some(upstream) = &mount.upstream {
        if !is_host_port(upstream) {
            errors.push(ValidationError::Upstream {
                prefix: mount.prefix.clone(),
                upstream: upstream.clone(),
            });
        }
    }
}

/// Accepts `ip:port` and `hostname:port` without resolving names.
fn is_host_port(addr: &str) -> bool {
    if addr.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(['/', ' ', '[', ']'])
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}
