//! Translation between Kubernetes routes and NSX-T static-route resources.
//!
//! Everything in this module is a pure function of its inputs so the naming
//! and tagging scheme can be unit-tested without a broker.

use nsx_client::{
    RealizationState, RealizedEntities, RouterNextHop, SearchResponse, StaticRoute, Tag,
    DEFAULT_ADMIN_DISTANCE,
};

/// Tag scope carrying the owning cluster name on a static route.
pub const CLUSTER_NAME_TAG_SCOPE: &str = "vsphere.k8s.io/cluster-name";

/// Tag scope carrying the target node name on a static route.
pub const NODE_NAME_TAG_SCOPE: &str = "vsphere.k8s.io/node-name";

/// A per-node pod-CIDR route as the controller framework sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Identifier of the remote resource; for listed routes this is the
    /// resource display name and doubles as the route ID for delete
    pub name: String,
    /// Node whose pod CIDR this route covers
    pub target_node: String,
    /// Destination network in CIDR notation
    pub destination_cidr: String,
}

/// Route ID derived from a name hint and CIDR.
///
/// The CIDR's `/` is replaced with `_` so the ID forms a single policy path
/// segment. `route_display_name` keeps the `/`; the two separator
/// conventions differ on purpose and the remote naming scheme depends on
/// both staying as they are.
pub fn route_id(name_hint: &str, cidr: &str) -> String {
    format!("{}_{}", name_hint, cidr.replace('/', "_"))
}

/// Display name of a generated static route: `<cluster>_<node>_<cidr>`.
pub fn route_display_name(cluster_name: &str, node_name: &str, cidr: &str) -> String {
    format!("{}_{}_{}", cluster_name, node_name, cidr)
}

/// Build the static-route resource for a route, returning its route ID.
///
/// Tags are ordered cluster scope first, node scope second; listing relies
/// on that order staying fixed. The single next hop carries the default
/// administrative distance.
pub fn static_route(
    cluster_name: &str,
    name_hint: &str,
    node_name: &str,
    cidr: &str,
    node_ip: &str,
) -> (String, StaticRoute) {
    let id = route_id(name_hint, cidr);
    let resource = StaticRoute {
        display_name: route_display_name(cluster_name, node_name, cidr),
        network: cidr.to_string(),
        next_hops: vec![RouterNextHop {
            ip_address: node_ip.to_string(),
            admin_distance: DEFAULT_ADMIN_DISTANCE,
        }],
        tags: vec![
            Tag {
                scope: CLUSTER_NAME_TAG_SCOPE.to_string(),
                tag: cluster_name.to_string(),
            },
            Tag {
                scope: NODE_NAME_TAG_SCOPE.to_string(),
                tag: node_name.to_string(),
            },
        ],
        id: None,
        path: None,
    };
    (id, resource)
}

/// Translate search results into routes, preserving the remote ordering.
///
/// The route name is the resource display name verbatim; the target node is
/// read from the node-name tag. Results without a node-name tag are not
/// routes this controller owns and are skipped.
pub fn routes_from_search(response: &SearchResponse) -> Vec<Route> {
    response
        .results
        .iter()
        .filter_map(|resource| {
            let target_node = resource
                .tags
                .iter()
                .find(|tag| tag.scope == NODE_NAME_TAG_SCOPE)
                .map(|tag| tag.tag.clone())?;
            Some(Route {
                name: resource.display_name.clone(),
                target_node,
                destination_cidr: resource.network.clone(),
            })
        })
        .collect()
}

/// Outcome of one realized-state poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Realization {
    /// All realized entities reached REALIZED
    Realized,
    /// Still converging, poll again
    InProgress,
    /// A terminal failure state was observed
    Failed(RealizationState),
}

/// Classify a realized-entities listing into pass/fail/pending.
///
/// An empty listing means the intent has not produced realized entities yet
/// and counts as in progress.
pub fn classify_realization(entities: &RealizedEntities) -> Realization {
    if entities.results.is_empty() {
        return Realization::InProgress;
    }
    for entity in &entities.results {
        match entity.state {
            RealizationState::Error => return Realization::Failed(entity.state),
            RealizationState::Realized => {}
            _ => return Realization::InProgress,
        }
    }
    Realization::Realized
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsx_client::RealizedEntity;

    #[test]
    fn route_id_replaces_cidr_separator() {
        assert_eq!(
            route_id("nameHint", "100.96.0.0/24"),
            "nameHint_100.96.0.0_24"
        );
    }

    #[test]
    fn route_id_handles_ipv6() {
        assert_eq!(
            route_id("nameHint", "21DA:00D3:0000:2F3B::/64"),
            "nameHint_21DA:00D3:0000:2F3B::_64"
        );
    }

    #[test]
    fn display_name_keeps_cidr_separator() {
        assert_eq!(
            route_display_name("cluster1", "node1", "100.96.0.0/24"),
            "cluster1_node1_100.96.0.0/24"
        );
    }

    #[test]
    fn generate_ipv4_static_route() {
        let (id, resource) =
            static_route("cluster1", "nameHint", "node1", "100.96.0.0/24", "172.50.0.13");

        assert_eq!(id, "nameHint_100.96.0.0_24");
        assert_eq!(resource.display_name, "cluster1_node1_100.96.0.0/24");
        assert_eq!(resource.network, "100.96.0.0/24");
        assert_eq!(resource.next_hops.len(), 1);
        assert_eq!(resource.next_hops[0].ip_address, "172.50.0.13");
        assert_eq!(resource.next_hops[0].admin_distance, 1);
        assert_eq!(resource.tags[0].scope, "vsphere.k8s.io/cluster-name");
        assert_eq!(resource.tags[0].tag, "cluster1");
        assert_eq!(resource.tags[1].scope, "vsphere.k8s.io/node-name");
        assert_eq!(resource.tags[1].tag, "node1");
    }

    #[test]
    fn generate_ipv6_static_route() {
        let (id, resource) = static_route(
            "cluster1",
            "nameHint",
            "node1",
            "21DA:00D3:0000:2F3B::/64",
            "21DA:00D3:0000:2F3B:02AC:00FF:FE28:9C5A",
        );

        assert_eq!(id, "nameHint_21DA:00D3:0000:2F3B::_64");
        assert_eq!(
            resource.display_name,
            "cluster1_node1_21DA:00D3:0000:2F3B::/64"
        );
        assert_eq!(resource.network, "21DA:00D3:0000:2F3B::/64");
        assert_eq!(
            resource.next_hops[0].ip_address,
            "21DA:00D3:0000:2F3B:02AC:00FF:FE28:9C5A"
        );
        assert_eq!(resource.tags[0].tag, "cluster1");
        assert_eq!(resource.tags[1].tag, "node1");
    }

    #[test]
    fn tag_order_is_cluster_then_node() {
        let (_, resource) =
            static_route("kubernetes", "hint", "node2", "100.96.1.0/24", "172.50.0.137");
        let scopes: Vec<&str> = resource.tags.iter().map(|t| t.scope.as_str()).collect();
        assert_eq!(
            scopes,
            vec!["vsphere.k8s.io/cluster-name", "vsphere.k8s.io/node-name"]
        );
    }

    #[test]
    fn created_resource_round_trips_through_list_translation() {
        let (_, resource) =
            static_route("kubernetes", "hint", "node1", "100.96.0.0/24", "172.50.0.13");
        let response = SearchResponse {
            results: vec![resource],
            result_count: Some(1),
        };

        let routes = routes_from_search(&response);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].target_node, "node1");
        assert_eq!(routes[0].destination_cidr, "100.96.0.0/24");
    }

    #[test]
    fn list_translation_preserves_order_and_names() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
              "results": [
                {
                  "display_name": "62d347a4-1b70-435e-b92a-9a61453843ee_100.96.0.0_24",
                  "network": "100.96.0.0/24",
                  "tags": [
                    { "scope": "vsphere.k8s.io/cluster-name", "tag": "kubernetes" },
                    { "scope": "vsphere.k8s.io/node-name", "tag": "node1" }
                  ],
                  "next_hops": [ { "ip_address": "172.50.0.13", "admin_distance": 1 } ]
                },
                {
                  "display_name": "a4775ec4-8b68-42ea-86fc-d17390e4c373_100.96.1.0_24",
                  "network": "100.96.1.0/24",
                  "tags": [
                    { "scope": "vsphere.k8s.io/cluster-name", "tag": "kubernetes" },
                    { "scope": "vsphere.k8s.io/node-name", "tag": "node2" }
                  ],
                  "next_hops": [ { "ip_address": "172.50.0.137", "admin_distance": 1 } ]
                }
              ],
              "result_count": 2
            }"#,
        )
        .unwrap();

        let routes = routes_from_search(&response);
        assert_eq!(routes.len(), 2);
        assert_eq!(
            routes[0].name,
            "62d347a4-1b70-435e-b92a-9a61453843ee_100.96.0.0_24"
        );
        assert_eq!(routes[0].target_node, "node1");
        assert_eq!(routes[0].destination_cidr, "100.96.0.0/24");
        assert_eq!(
            routes[1].name,
            "a4775ec4-8b68-42ea-86fc-d17390e4c373_100.96.1.0_24"
        );
        assert_eq!(routes[1].target_node, "node2");
        assert_eq!(routes[1].destination_cidr, "100.96.1.0/24");
    }

    #[test]
    fn list_translation_skips_untagged_results() {
        let response = SearchResponse {
            results: vec![StaticRoute {
                display_name: "manual-route".to_string(),
                network: "10.0.0.0/8".to_string(),
                next_hops: vec![],
                tags: vec![],
                id: None,
                path: None,
            }],
            result_count: Some(1),
        };
        assert!(routes_from_search(&response).is_empty());
    }

    fn entity(state: RealizationState) -> RealizedEntity {
        RealizedEntity {
            state,
            intent_paths: vec!["/infra/tier-1s/t1/static-routes/r1".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn realization_classification() {
        let realized = RealizedEntities {
            results: vec![entity(RealizationState::Realized)],
            result_count: Some(1),
        };
        assert_eq!(classify_realization(&realized), Realization::Realized);

        let pending = RealizedEntities {
            results: vec![
                entity(RealizationState::Realized),
                entity(RealizationState::InProgress),
            ],
            result_count: Some(2),
        };
        assert_eq!(classify_realization(&pending), Realization::InProgress);

        let failed = RealizedEntities {
            results: vec![entity(RealizationState::Error)],
            result_count: Some(1),
        };
        assert_eq!(
            classify_realization(&failed),
            Realization::Failed(RealizationState::Error)
        );

        let empty = RealizedEntities::default();
        assert_eq!(classify_realization(&empty), Realization::InProgress);
    }
}
