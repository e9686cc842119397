//! Periodic route sync loop.
//!
//! Converges the cluster's static routes toward the pod CIDRs currently
//! assigned to nodes: stale routes are deleted, missing ones are created
//! with a fresh name hint. Individual create/delete failures are logged and
//! retried on the next tick; the provider itself never retries.

use crate::error::RouteError;
use crate::provider::RouteProvider;
use crate::translate::Route;
use k8s_openapi::api::core::v1::Node;
use kube::api::ListParams;
use kube::Api;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Reconciliation loop driving the route provider.
pub struct RouteReconciler {
    provider: Arc<RouteProvider>,
    node_api: Api<Node>,
    cluster_name: String,
    sync_period: Duration,
}

impl RouteReconciler {
    /// Create a reconciler for one cluster
    pub fn new(
        provider: Arc<RouteProvider>,
        node_api: Api<Node>,
        cluster_name: String,
        sync_period: Duration,
    ) -> Self {
        Self {
            provider,
            node_api,
            cluster_name,
            sync_period,
        }
    }

    /// Run the sync loop until the task is aborted
    pub async fn run(self) -> Result<(), RouteError> {
        info!(
            "Starting route sync loop for cluster {} (period {:?})",
            self.cluster_name, self.sync_period
        );
        let mut ticker = tokio::time::interval(self.sync_period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.sync().await {
                error!("Route sync for cluster {} failed: {}", self.cluster_name, e);
            }
        }
    }

    /// One desired-vs-actual pass over nodes and static routes
    async fn sync(&self) -> Result<(), RouteError> {
        let nodes = self.node_api.list(&ListParams::default()).await?;

        let mut desired: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for node in nodes.items {
            let Some(name) = node.metadata.name.clone() else {
                continue;
            };
            let cidrs = pod_cidrs(&node);
            if cidrs.is_empty() {
                debug!("Node {} has no pod CIDR assigned yet", name);
                continue;
            }
            desired.insert(name, cidrs);
        }

        let actual = self.provider.list_routes(&self.cluster_name).await?;

        for route in &actual {
            let keep = desired
                .get(&route.target_node)
                .is_some_and(|cidrs| cidrs.contains(&route.destination_cidr));
            if keep {
                continue;
            }
            if let Err(e) = self.provider.delete_route(&self.cluster_name, route).await {
                error!("Failed to delete stale route {}: {}", route.name, e);
            }
        }

        let existing: HashSet<(&str, &str)> = actual
            .iter()
            .map(|r| (r.target_node.as_str(), r.destination_cidr.as_str()))
            .collect();

        for (node_name, cidrs) in &desired {
            for cidr in cidrs {
                if existing.contains(&(node_name.as_str(), cidr.as_str())) {
                    continue;
                }
                let name_hint = Uuid::new_v4().to_string();
                let route = Route {
                    name: String::new(),
                    target_node: node_name.clone(),
                    destination_cidr: cidr.clone(),
                };
                match self
                    .provider
                    .create_route(&self.cluster_name, &name_hint, &route)
                    .await
                {
                    Ok(()) => info!("Created route for node {} ({})", node_name, cidr),
                    Err(e) => {
                        error!("Failed to create route for node {} ({}): {}", node_name, cidr, e);
                    }
                }
            }
        }

        Ok(())
    }
}

// Dual-stack nodes report pod_cidrs; older single-stack nodes only pod_cidr.
fn pod_cidrs(node: &Node) -> Vec<String> {
    let Some(spec) = node.spec.as_ref() else {
        return Vec::new();
    };
    if let Some(cidrs) = spec.pod_cidrs.as_ref() {
        if !cidrs.is_empty() {
            return cidrs.clone();
        }
    }
    spec.pod_cidr.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_fake_node;

    #[test]
    fn pod_cidrs_prefers_the_plural_field() {
        let mut node = build_fake_node("node1");
        if let Some(spec) = node.spec.as_mut() {
            spec.pod_cidrs = Some(vec![
                "100.96.0.0/24".to_string(),
                "21DA:00D3:0000:2F3B::/64".to_string(),
            ]);
        }
        assert_eq!(
            pod_cidrs(&node),
            vec!["100.96.0.0/24", "21DA:00D3:0000:2F3B::/64"]
        );
    }

    #[test]
    fn pod_cidrs_falls_back_to_singular() {
        let node = build_fake_node("node1");
        assert_eq!(pod_cidrs(&node), vec!["100.96.0.0/24"]);
    }

    #[test]
    fn node_without_spec_has_no_cidrs() {
        let mut node = build_fake_node("node1");
        node.spec = None;
        assert!(pod_cidrs(&node).is_empty());
    }
}
