//! Route provider: reconciles pod-CIDR routes against NSX-T static routes.
//!
//! The provider owns the node directory and the realization-polling
//! protocol. It never retries failed broker calls; the surrounding sync
//! loop re-invokes list/create/delete on its own cadence.

use crate::error::RouteError;
use crate::nodes::{AddressFamily, NodeDirectory};
use crate::translate::{self, Realization, Route, CLUSTER_NAME_TAG_SCOPE};
use k8s_openapi::api::core::v1::Node;
use nsx_client::NsxBroker;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Polling budget for static-route realization.
#[derive(Debug, Clone, Copy)]
pub struct RealizationConfig {
    /// Delay between realized-state polls
    pub interval: Duration,
    /// Maximum number of polls before giving up
    pub max_attempts: u32,
}

impl Default for RealizationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 15,
        }
    }
}

/// Reconciles Kubernetes routes against static routes under one logical
/// router.
pub struct RouteProvider {
    broker: Arc<dyn NsxBroker>,
    router_path: String,
    nodes: NodeDirectory,
    realization: RealizationConfig,
}

impl RouteProvider {
    /// Create a provider scoped to a router path
    pub fn new(
        broker: Arc<dyn NsxBroker>,
        router_path: impl Into<String>,
        realization: RealizationConfig,
    ) -> Self {
        Self {
            broker,
            router_path: router_path.into(),
            nodes: NodeDirectory::new(),
            realization,
        }
    }

    /// Router path this provider is scoped to
    pub fn router_path(&self) -> &str {
        &self.router_path
    }

    /// List the routes owned by a cluster, in remote listing order.
    ///
    /// Routes tagged for other clusters are filtered by the search query and
    /// never surfaced.
    pub async fn list_routes(&self, cluster_name: &str) -> Result<Vec<Route>, RouteError> {
        let query = format!(
            "resource_type:StaticRoutes AND tags.scope:{} AND tags.tag:{}",
            CLUSTER_NAME_TAG_SCOPE, cluster_name
        );
        debug!("Listing static routes for cluster {}", cluster_name);

        let response =
            self.broker
                .query_entities(&query)
                .await
                .map_err(|source| RouteError::Query {
                    cluster: cluster_name.to_string(),
                    source,
                })?;

        Ok(translate::routes_from_search(&response))
    }

    /// Create a static route for a node's pod CIDR and wait for realization.
    ///
    /// Address resolution happens before any remote call, so an unknown node
    /// or missing address family fails fast without partial remote state. If
    /// the create itself is rejected, realization checking is skipped.
    pub async fn create_route(
        &self,
        cluster_name: &str,
        name_hint: &str,
        route: &Route,
    ) -> Result<(), RouteError> {
        let family = AddressFamily::from_cidr(&route.destination_cidr)?;
        let node_ip = self.nodes.ip_address(&route.target_node, family)?;

        let (route_id, resource) = translate::static_route(
            cluster_name,
            name_hint,
            &route.target_node,
            &route.destination_cidr,
            &node_ip,
        );

        info!(
            "Creating static route {} for node {} ({} via {})",
            route_id, route.target_node, route.destination_cidr, node_ip
        );
        self.broker
            .create_static_route(&self.router_path, &route_id, &resource)
            .await
            .map_err(|source| RouteError::CreateFailed {
                route_id: route_id.clone(),
                router_path: self.router_path.clone(),
                source,
            })?;

        self.await_realization(&route_id).await
    }

    /// Delete a static route by its name as produced by `list_routes`.
    ///
    /// Idempotence is the broker's contract: a delete the broker reports as
    /// success is success here, whether or not the resource still existed.
    pub async fn delete_route(&self, cluster_name: &str, route: &Route) -> Result<(), RouteError> {
        info!(
            "Deleting static route {} for cluster {}",
            route.name, cluster_name
        );
        self.broker
            .delete_static_route(&self.router_path, &route.name)
            .await
            .map_err(|source| RouteError::DeleteFailed {
                route_id: route.name.clone(),
                router_path: self.router_path.clone(),
                source,
            })
    }

    /// Record a node from an add notification
    pub fn add_node(&self, node: Node) {
        self.nodes.add(node);
    }

    /// Drop a node on a delete notification
    pub fn delete_node(&self, node: &Node) {
        self.nodes.remove(node);
    }

    /// Look up a node previously recorded by `add_node`
    pub fn get_node(&self, name: &str) -> Result<Node, RouteError> {
        self.nodes.get(name)
    }

    // Bounded poll of the realized-entities listing for a created route.
    // Pending -> Polling until REALIZED, a terminal ERROR, or the attempt
    // budget runs out. Every suspension point is a cancellation point;
    // dropping the future abandons the poll.
    async fn await_realization(&self, route_id: &str) -> Result<(), RouteError> {
        let path = format!("{}/static-routes/{}", self.router_path, route_id);

        for attempt in 1..=self.realization.max_attempts {
            let entities = self.broker.list_realized_entities(&path).await?;
            match translate::classify_realization(&entities) {
                Realization::Realized => {
                    debug!("Static route {} realized after {} polls", path, attempt);
                    return Ok(());
                }
                Realization::Failed(state) => {
                    return Err(RouteError::RealizationFailed {
                        path,
                        state: state.to_string(),
                    });
                }
                Realization::InProgress => {
                    debug!(
                        "Static route {} not realized yet (attempt {}/{})",
                        path, attempt, self.realization.max_attempts
                    );
                }
            }
            if attempt < self.realization.max_attempts {
                tokio::time::sleep(self.realization.interval).await;
            }
        }

        Err(RouteError::RealizationTimeout {
            path,
            attempts: self.realization.max_attempts,
        })
    }
}
