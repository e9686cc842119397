//! Controller-specific error types.
//!
//! This module defines the error taxonomy of the route controller. Broker
//! failures are wrapped with the operation and target so callers see what
//! was being reconciled when the remote call failed.

use crate::nodes::AddressFamily;
use kube::Error as KubeError;
use nsx_client::NsxError;
use thiserror::Error;

/// Errors that can occur in the route controller.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// NSX API error
    #[error("NSX error: {0}")]
    Nsx(#[from] NsxError),

    /// Listing static routes for a cluster failed
    #[error("Failed to query static routes for cluster {cluster}: {source}")]
    Query {
        /// Cluster whose routes were being listed
        cluster: String,
        /// Underlying broker failure
        #[source]
        source: NsxError,
    },

    /// Node is absent from the node directory
    #[error("Node {0} is not registered")]
    UnknownNode(String),

    /// Node has no address of the required family
    #[error("Node {node} has no {family} address")]
    NoAddress {
        /// Node whose addresses were inspected
        node: String,
        /// Address family required by the destination CIDR
        family: AddressFamily,
    },

    /// Destination CIDR could not be parsed
    #[error("Invalid destination CIDR: {0}")]
    InvalidCidr(String),

    /// Remote create was rejected
    #[error("Failed to create static route {route_id} under {router_path}: {source}")]
    CreateFailed {
        /// Route that was being created
        route_id: String,
        /// Router the route was scoped to
        router_path: String,
        /// Underlying broker failure
        #[source]
        source: NsxError,
    },

    /// The manager signaled a terminal realization failure
    #[error("Static route {path} reached realization state {state}")]
    RealizationFailed {
        /// Intent path of the route
        path: String,
        /// Terminal state observed
        state: String,
    },

    /// Realization was not observed within the polling budget
    #[error("Static route {path} not realized after {attempts} attempts")]
    RealizationTimeout {
        /// Intent path of the route
        path: String,
        /// Polling attempts spent
        attempts: u32,
    },

    /// Remote delete was rejected
    #[error("Failed to delete static route {route_id} under {router_path}: {source}")]
    DeleteFailed {
        /// Route that was being deleted
        route_id: String,
        /// Router the route was scoped to
        router_path: String,
        /// Underlying broker failure
        #[source]
        source: NsxError,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
