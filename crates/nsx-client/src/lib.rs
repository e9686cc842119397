//! NSX-T Policy API Client
//!
//! A Rust client library for the subset of the NSX-T policy REST API needed
//! to manage per-node static routes: the search API, static-route
//! create/delete under a logical router, and realized-state listing.
//!
//! # Example
//!
//! ```no_run
//! use nsx_client::{NsxBroker, NsxClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let client = NsxClient::new(
//!     "https://nsx-manager".to_string(),
//!     "admin".to_string(),
//!     "password".to_string(),
//!     false,
//! )?;
//!
//! // Find static routes tagged for a cluster
//! let query = "resource_type:StaticRoutes AND tags.scope:vsphere.k8s.io/cluster-name AND tags.tag:kubernetes";
//! let routes = client.query_entities(query).await?;
//!
//! // Check realization of a created route
//! let realized = client
//!     .list_realized_entities("/infra/tier-1s/t1/static-routes/route-id")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Search**: Query static routes by ownership tags
//! - **Static Routes**: Idempotent create/delete under a router path
//! - **Realization**: Inspect realized state for an intent path
//! - **Mocking**: `test-util` feature provides an in-memory broker

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod nsx_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::NsxClient;
pub use error::NsxError;
pub use models::*;
pub use nsx_trait::NsxBroker;
#[cfg(feature = "test-util")]
pub use mock::MockNsxBroker;
