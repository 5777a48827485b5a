//! Handler groups that can be mounted from configuration.
//!
//! # Data Flow
//! ```text
//! GatewayConfig.mounts
//!     → upstream = "host:port"  → UpstreamGroup (pooled HTTP client)
//!     → static_dir = "path"     → StaticGroup (ServeDir)
//!     → BindingTable (registration order = config order)
//! ```
//!
//! Library users can mount any `axum::Router` directly instead.

pub mod static_files;
pub mod upstream;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, GatewayConfig, MountTarget, ValidationError};
use crate::routing::{BindingTable, HandlerGroup, Prefix};

pub use static_files::StaticGroup;
pub use upstream::{UpstreamClient, UpstreamGroup, X_FORWARDED_PREFIX};

/// Build the binding table for every configured mount.
pub fn build_table(config: &GatewayConfig) -> Result<BindingTable, ConfigError> {
    let client = upstream::client(Duration::from_secs(config.timeouts.connect_secs));
    let mut builder = BindingTable::builder();

    for mount in &config.mounts {
        let group: Arc<dyn HandlerGroup> = match mount.target() {
            Some(MountTarget::Upstream(address)) => {
                let group = UpstreamGroup::new(address, client.clone()).map_err(|_| {
                    ConfigError::Validation(vec![ValidationError::Upstream {
                        prefix: mount.prefix.clone(),
                        upstream: address.to_string(),
                    }])
                })?;
                Arc::new(group)
            }
            Some(MountTarget::StaticDir(dir)) => Arc::new(StaticGroup::new(dir)),
            None => {
                return Err(ConfigError::Validation(vec![ValidationError::Target {
                    prefix: mount.prefix.clone(),
                }]))
            }
        };

        let name = match &mount.name {
            Some(name) => name.clone(),
            None => Prefix::parse(mount.prefix.as_str())?.last_segment().to_string(),
        };
        builder = builder.register_shared(name, &mount.prefix, group)?;
    }

    Ok(builder.build())
}
