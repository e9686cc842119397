//! Node directory: local cache of node identity and addressing.
//!
//! Refreshed by node-lifecycle events from the watcher, never polled. The
//! map is behind an RwLock because address resolution during route creation
//! runs concurrently with add/delete notifications.

use crate::error::RouteError;
use k8s_openapi::api::core::v1::Node;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::RwLock;
use tracing::warn;

/// Address family of a node address or destination CIDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl AddressFamily {
    /// Decide the address family from a destination CIDR.
    pub fn from_cidr(cidr: &str) -> Result<Self, RouteError> {
        let address = cidr.split('/').next().unwrap_or(cidr);
        match address.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => Ok(AddressFamily::V4),
            Ok(IpAddr::V6(_)) => Ok(AddressFamily::V6),
            Err(_) => Err(RouteError::InvalidCidr(cidr.to_string())),
        }
    }

    fn matches(self, address: &IpAddr) -> bool {
        match self {
            AddressFamily::V4 => address.is_ipv4(),
            AddressFamily::V6 => address.is_ipv6(),
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("IPv4"),
            AddressFamily::V6 => f.write_str("IPv6"),
        }
    }
}

/// Concurrency-safe map from node name to the node object.
#[derive(Debug, Default)]
pub struct NodeDirectory {
    nodes: RwLock<HashMap<String, Node>>,
}

impl NodeDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a node; last write wins on duplicate adds
    pub fn add(&self, node: Node) {
        let Some(name) = node.metadata.name.clone() else {
            warn!("Ignoring node add notification without a node name");
            return;
        };
        self.nodes.write().unwrap().insert(name, node);
    }

    /// Remove a node on a delete notification
    pub fn remove(&self, node: &Node) {
        let Some(name) = node.metadata.name.as_deref() else {
            warn!("Ignoring node delete notification without a node name");
            return;
        };
        self.nodes.write().unwrap().remove(name);
    }

    /// Look up a node by name
    pub fn get(&self, name: &str) -> Result<Node, RouteError> {
        self.nodes
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| RouteError::UnknownNode(name.to_string()))
    }

    /// Resolve a node's IP address for the requested family.
    ///
    /// Returns the first address in the node's reported address list that
    /// parses as the requested family. Hostname entries do not parse as IP
    /// literals and are passed over.
    pub fn ip_address(&self, name: &str, family: AddressFamily) -> Result<String, RouteError> {
        let nodes = self.nodes.read().unwrap();
        let node = nodes
            .get(name)
            .ok_or_else(|| RouteError::UnknownNode(name.to_string()))?;

        node.status
            .as_ref()
            .and_then(|status| status.addresses.as_ref())
            .into_iter()
            .flatten()
            .find(|address| {
                address
                    .address
                    .parse::<IpAddr>()
                    .is_ok_and(|ip| family.matches(&ip))
            })
            .map(|address| address.address.clone())
            .ok_or_else(|| RouteError::NoAddress {
                node: name.to_string(),
                family,
            })
    }
}
