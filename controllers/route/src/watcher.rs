//! Kubernetes node watcher.
//!
//! Feeds node-lifecycle events into the route provider's node directory so
//! address resolution always works against the current node inventory. The
//! watcher reconnects with backoff on stream errors.

use crate::error::RouteError;
use crate::provider::RouteProvider;
use futures::TryStreamExt;
use k8s_openapi::api::core::v1::Node;
use kube::Api;
use kube_runtime::{watcher, WatchStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Watch nodes and mirror add/delete notifications into the provider.
pub async fn watch_nodes(api: Api<Node>, provider: Arc<RouteProvider>) -> Result<(), RouteError> {
    info!("Starting node watcher");

    let stream = watcher(api, watcher::Config::default()).default_backoff();
    futures::pin_mut!(stream);

    while let Some(event) = stream
        .try_next()
        .await
        .map_err(|e| RouteError::Watch(e.to_string()))?
    {
        match event {
            watcher::Event::Apply(node) | watcher::Event::InitApply(node) => {
                debug!(
                    "Node {} added or updated",
                    node.metadata.name.as_deref().unwrap_or("<unnamed>")
                );
                provider.add_node(node);
            }
            watcher::Event::Delete(node) => {
                debug!(
                    "Node {} deleted",
                    node.metadata.name.as_deref().unwrap_or("<unnamed>")
                );
                provider.delete_node(&node);
            }
            watcher::Event::Init | watcher::Event::InitDone => {}
        }
    }

    Ok(())
}
