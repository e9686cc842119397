//! NSX Route Controller
//!
//! Reconciles Kubernetes per-node pod CIDRs against NSX-T static routes so
//! pod traffic between nodes on the overlay network is forwarded correctly.
//!
//! The controller watches nodes to keep a local directory of node
//! addresses, and periodically converges the static routes under a
//! configured logical router: one route per node pod CIDR, tagged with the
//! owning cluster and node, created with a deterministic route ID and
//! driven to the REALIZED state before a create is considered done.

mod controller;
mod error;
mod nodes;
mod provider;
mod reconciler;
#[cfg(test)]
mod test_utils;
mod translate;
mod watcher;

use crate::controller::{Config, Controller};
use crate::error::RouteError;
use crate::provider::RealizationConfig;
use std::env;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), RouteError> {
    tracing_subscriber::fmt::init();

    info!("Starting NSX Route Controller");

    // Load configuration from environment variables
    let nsx_url =
        env::var("NSX_MANAGER_URL").unwrap_or_else(|_| "https://nsx-manager".to_string());
    let nsx_username = env::var("NSX_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let nsx_password = env::var("NSX_PASSWORD").map_err(|_| {
        RouteError::InvalidConfig("NSX_PASSWORD environment variable is required".to_string())
    })?;
    let router_path = env::var("NSX_ROUTER_PATH").map_err(|_| {
        RouteError::InvalidConfig("NSX_ROUTER_PATH environment variable is required".to_string())
    })?;
    let cluster_name = env::var("CLUSTER_NAME").unwrap_or_else(|_| "kubernetes".to_string());
    let nsx_insecure_skip_verify = env::var("NSX_INSECURE_SKIP_VERIFY")
        .map(|v| v == "true")
        .unwrap_or(false);

    let realization = RealizationConfig {
        interval: Duration::from_secs(parse_env("REALIZATION_INTERVAL_SECS", 2)?),
        max_attempts: parse_env("REALIZATION_MAX_ATTEMPTS", 15)?,
    };
    let sync_period = Duration::from_secs(parse_env("ROUTE_SYNC_PERIOD_SECS", 60)?);

    info!("Configuration:");
    info!("  NSX manager URL: {}", nsx_url);
    info!("  Router path: {}", router_path);
    info!("  Cluster name: {}", cluster_name);
    info!(
        "  Realization polling: every {:?}, up to {} attempts",
        realization.interval, realization.max_attempts
    );

    // Initialize and run controller
    let controller = Controller::new(Config {
        nsx_url,
        nsx_username,
        nsx_password,
        nsx_insecure_skip_verify,
        router_path,
        cluster_name,
        realization,
        sync_period,
    })
    .await?;
    controller.run().await?;

    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, RouteError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => value.parse().map_err(|_| {
            RouteError::InvalidConfig(format!("{} must be a number, got '{}'", name, value))
        }),
    }
}
