//! Wire models for the NSX-T policy API
//!
//! Field names follow the NSX-T JSON representation (snake_case) so these
//! types serialize byte-compatibly with what the manager expects.

use serde::{Deserialize, Serialize};

/// Scope/tag pair attached to a policy resource.
///
/// The route controller uses two tags per static route: one carrying the
/// cluster name and one carrying the node name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag scope (e.g. "vsphere.k8s.io/cluster-name")
    pub scope: String,
    /// Tag value
    pub tag: String,
}

/// Next hop of a static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterNextHop {
    /// Next-hop IP address (v4 or v6 literal)
    pub ip_address: String,
    /// Administrative distance, defaults to 1
    #[serde(default = "default_admin_distance")]
    pub admin_distance: u32,
}

fn default_admin_distance() -> u32 {
    1
}

/// Default administrative distance for generated next hops.
pub const DEFAULT_ADMIN_DISTANCE: u32 = 1;

/// A StaticRoutes policy resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    /// Human-readable name; the route controller encodes
    /// cluster, node and CIDR here
    pub display_name: String,
    /// Destination network in CIDR notation
    pub network: String,
    /// Next hops, a single entry for generated routes
    #[serde(default)]
    pub next_hops: Vec<RouterNextHop>,
    /// Ownership tags
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Resource ID, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Full policy path, set by the manager
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Response of the policy search API, restricted to StaticRoutes results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matched resources, in the order the manager returned them
    #[serde(default)]
    pub results: Vec<StaticRoute>,
    /// Total result count reported by the manager
    #[serde(default)]
    pub result_count: Option<i64>,
}

/// Realization state of a policy intent.
///
/// `REALIZED` is the terminal success state; `ERROR` is terminal failure.
/// Everything else means the manager is still converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealizationState {
    /// Intent applied to the data plane
    Realized,
    /// Realization still in progress
    InProgress,
    /// Intent not yet realized
    Unrealized,
    /// Terminal realization failure
    Error,
    /// State could not be determined
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RealizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RealizationState::Realized => "REALIZED",
            RealizationState::InProgress => "IN_PROGRESS",
            RealizationState::Unrealized => "UNREALIZED",
            RealizationState::Error => "ERROR",
            RealizationState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A realized-state entity for one policy intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealizedEntity {
    /// Realization state of this entity
    #[serde(default)]
    pub state: RealizationState,
    /// Intent paths this entity realizes
    #[serde(default)]
    pub intent_paths: Vec<String>,
    /// Older managers report the intent under this key instead
    #[serde(default)]
    pub intent_reference: Vec<String>,
    /// Entity ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Realized-state path of this entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Response of the realized-entities listing for an intent path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealizedEntities {
    /// Realized entities for the queried intent
    #[serde(default)]
    pub results: Vec<RealizedEntity>,
    /// Total result count reported by the manager
    #[serde(default)]
    pub result_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_route_deserializes_nsx_payload() {
        let payload = r#"
        {
          "display_name": "62d347a4-1b70-435e-b92a-9a61453843ee_100.96.0.0_24",
          "network": "100.96.0.0/24",
          "tags": [
            { "scope": "vsphere.k8s.io/cluster-name", "tag": "kubernetes" },
            { "scope": "vsphere.k8s.io/node-name", "tag": "node1" }
          ],
          "path": "/infra/tier-1s/test-t1/static-routes/62d347a4-1b70-435e-b92a-9a61453843ee_100.96.0.0_24",
          "id": "62d347a4-1b70-435e-b92a-9a61453843ee_100.96.0.0_24",
          "next_hops": [ { "ip_address": "172.50.0.13", "admin_distance": 1 } ]
        }"#;

        let route: StaticRoute = serde_json::from_str(payload).unwrap();
        assert_eq!(route.network, "100.96.0.0/24");
        assert_eq!(route.next_hops[0].ip_address, "172.50.0.13");
        assert_eq!(route.next_hops[0].admin_distance, 1);
        assert_eq!(route.tags[0].scope, "vsphere.k8s.io/cluster-name");
        assert_eq!(route.tags[1].tag, "node1");
    }

    #[test]
    fn admin_distance_defaults_to_one() {
        let hop: RouterNextHop =
            serde_json::from_str(r#"{ "ip_address": "172.50.0.13" }"#).unwrap();
        assert_eq!(hop.admin_distance, 1);
    }

    #[test]
    fn realization_state_parses_known_and_unknown() {
        let entity: RealizedEntity = serde_json::from_str(
            r#"{ "state": "REALIZED", "intent_paths": ["/infra/tier-1s/t1/static-routes/r1"] }"#,
        )
        .unwrap();
        assert_eq!(entity.state, RealizationState::Realized);

        let entity: RealizedEntity =
            serde_json::from_str(r#"{ "state": "SOMETHING_NEW" }"#).unwrap();
        assert_eq!(entity.state, RealizationState::Unknown);
    }
}
