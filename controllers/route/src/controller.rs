//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the NSX client and the route provider together, and supervises
//! the node watcher and route sync tasks.

use crate::error::RouteError;
use crate::provider::{RealizationConfig, RouteProvider};
use crate::reconciler::RouteReconciler;
use crate::watcher::watch_nodes;
use k8s_openapi::api::core::v1::Node;
use kube::{Api, Client};
use nsx_client::NsxClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Controller configuration, resolved from the environment in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    /// NSX manager base URL
    pub nsx_url: String,
    /// NSX API username
    pub nsx_username: String,
    /// NSX API password
    pub nsx_password: String,
    /// Accept self-signed manager certificates
    pub nsx_insecure_skip_verify: bool,
    /// Logical router the static routes live under
    pub router_path: String,
    /// Cluster name used for ownership tagging
    pub cluster_name: String,
    /// Realization polling budget
    pub realization: RealizationConfig,
    /// Interval between desired-vs-actual sync passes
    pub sync_period: Duration,
}

/// Main controller for NSX static-route management.
pub struct Controller {
    node_watcher: JoinHandle<Result<(), RouteError>>,
    route_syncer: JoinHandle<Result<(), RouteError>>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: Config) -> Result<Self, RouteError> {
        info!("Initializing route controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        // Create NSX client
        let nsx_client = NsxClient::new(
            config.nsx_url.clone(),
            config.nsx_username,
            config.nsx_password,
            config.nsx_insecure_skip_verify,
        )?;

        // Validate credentials and connectivity before proceeding
        info!("Validating NSX credentials and connectivity...");
        nsx_client.validate_credentials().await.map_err(|e| {
            error!("Failed to validate NSX credentials: {}", e);
            error!("Please ensure:");
            error!("  1. NSX_USERNAME and NSX_PASSWORD are set correctly");
            error!("  2. The NSX manager is reachable at {}", config.nsx_url);
            RouteError::Nsx(e)
        })?;
        info!("NSX credentials validated and connectivity established");

        let provider = Arc::new(RouteProvider::new(
            Arc::new(nsx_client),
            config.router_path,
            config.realization,
        ));

        let node_api: Api<Node> = Api::all(kube_client);

        let node_watcher = tokio::spawn(watch_nodes(node_api.clone(), Arc::clone(&provider)));
        let reconciler = RouteReconciler::new(
            provider,
            node_api,
            config.cluster_name,
            config.sync_period,
        );
        let route_syncer = tokio::spawn(reconciler.run());

        Ok(Self {
            node_watcher,
            route_syncer,
        })
    }

    /// Run until one of the controller tasks exits.
    pub async fn run(self) -> Result<(), RouteError> {
        let (watch, sync) = tokio::try_join!(self.node_watcher, self.route_syncer)
            .map_err(|e| RouteError::Watch(format!("Controller task aborted: {}", e)))?;
        watch?;
        sync?;
        Ok(())
    }
}
