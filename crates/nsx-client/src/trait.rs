//! NsxBroker trait for mocking
//!
//! This trait abstracts the policy API operations the route controller
//! needs. The concrete NsxClient implements it against a live NSX manager,
//! and tests substitute MockNsxBroker without touching reconciliation logic.

use crate::error::NsxError;
use crate::models::{RealizedEntities, SearchResponse, StaticRoute};

/// Trait for the NSX-T policy API operations used by route reconciliation
///
/// Every call is fallible and potentially slow; callers must not assume any
/// of these return quickly. All async methods must be `Send` to work with
/// Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait NsxBroker: Send + Sync {
    /// Run a policy search query and return the matched static routes
    async fn query_entities(&self, query: &str) -> Result<SearchResponse, NsxError>;

    /// Create (or overwrite) a static route under the given router path
    async fn create_static_route(
        &self,
        router_path: &str,
        route_id: &str,
        route: &StaticRoute,
    ) -> Result<(), NsxError>;

    /// Delete a static route under the given router path
    ///
    /// Deleting a route that no longer exists is success; the manager treats
    /// policy deletes as idempotent and implementations preserve that
    /// contract.
    async fn delete_static_route(&self, router_path: &str, route_id: &str)
    -> Result<(), NsxError>;

    /// List realized-state entities for an intent path
    async fn list_realized_entities(
        &self,
        intent_path: &str,
    ) -> Result<RealizedEntities, NsxError>;
}
