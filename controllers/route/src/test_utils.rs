//! Test utilities for unit testing the route provider
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::provider::{RealizationConfig, RouteProvider};
use k8s_openapi::api::core::v1::{Node, NodeAddress, NodeSpec, NodeStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use nsx_client::MockNsxBroker;
use std::sync::Arc;
use std::time::Duration;

/// Build a node with a hostname, an IPv4 internal IP and an IPv6 internal IP
pub fn build_fake_node(name: &str) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(NodeSpec {
            pod_cidr: Some("100.96.0.0/24".to_string()),
            ..Default::default()
        }),
        status: Some(NodeStatus {
            addresses: Some(vec![
                NodeAddress {
                    type_: "Hostname".to_string(),
                    address: name.to_string(),
                },
                NodeAddress {
                    type_: "InternalIP".to_string(),
                    address: "172.50.0.13".to_string(),
                },
                NodeAddress {
                    type_: "InternalIP".to_string(),
                    address: "fe80::20c:29ff:fe0b:b407".to_string(),
                },
            ]),
            ..Default::default()
        }),
    }
}

/// Provider over a mock broker with a millisecond polling budget so
/// realization tests run fast
pub fn build_test_provider(broker: &MockNsxBroker, max_attempts: u32) -> RouteProvider {
    RouteProvider::new(
        Arc::new(broker.clone()),
        "/infra/tier-1s/test-t1",
        RealizationConfig {
            interval: Duration::from_millis(5),
            max_attempts,
        },
    )
}
