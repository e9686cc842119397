//! Mock NsxBroker for unit testing
//!
//! This module provides an in-memory implementation of NsxBroker that can be
//! used in unit tests without a running NSX manager. Routes are stored in
//! insertion order so listing reflects remote creation order, and realization
//! behavior is configurable per scenario (number of polls before the terminal
//! state, and which terminal state is reached).

use crate::error::NsxError;
use crate::models::{
    RealizationState, RealizedEntities, RealizedEntity, SearchResponse, StaticRoute,
};
use crate::nsx_trait::NsxBroker;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock NsxBroker for testing
///
/// Stores static routes in memory and can be configured to fail specific
/// operations or delay realization for a number of polls.
#[derive(Clone)]
pub struct MockNsxBroker {
    pub(crate) routes: Arc<Mutex<Vec<(String, StaticRoute)>>>,
    // Number of realized-entities polls before the terminal state is reported
    pub(crate) realize_after: Arc<Mutex<u32>>,
    pub(crate) terminal_state: Arc<Mutex<RealizationState>>,
    // Poll counts per intent path
    pub(crate) poll_counts: Arc<Mutex<HashMap<String, u32>>>,
    pub(crate) fail_query: Arc<Mutex<Option<String>>>,
    pub(crate) fail_create: Arc<Mutex<Option<String>>>,
    pub(crate) fail_delete: Arc<Mutex<Option<String>>>,
}

impl Default for MockNsxBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNsxBroker {
    /// Create a new mock broker that realizes every route on the first poll
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(Vec::new())),
            realize_after: Arc::new(Mutex::new(1)),
            terminal_state: Arc::new(Mutex::new(RealizationState::Realized)),
            poll_counts: Arc::new(Mutex::new(HashMap::new())),
            fail_query: Arc::new(Mutex::new(None)),
            fail_create: Arc::new(Mutex::new(None)),
            fail_delete: Arc::new(Mutex::new(None)),
        }
    }

    /// Seed a static route under a router path (for test setup)
    pub fn add_static_route(&self, router_path: &str, route_id: &str, mut route: StaticRoute) {
        let path = format!("{}/static-routes/{}", router_path, route_id);
        route.id = Some(route_id.to_string());
        route.path = Some(path.clone());
        self.routes.lock().unwrap().push((path, route));
    }

    /// Require `polls` realized-entities calls before the terminal state
    pub fn set_realized_after(&self, polls: u32) {
        *self.realize_after.lock().unwrap() = polls;
    }

    /// Set the terminal realization state (default REALIZED)
    pub fn set_terminal_state(&self, state: RealizationState) {
        *self.terminal_state.lock().unwrap() = state;
    }

    /// Make query_entities fail with the given message
    pub fn fail_query(&self, message: &str) {
        *self.fail_query.lock().unwrap() = Some(message.to_string());
    }

    /// Make create_static_route fail with the given message
    pub fn fail_create(&self, message: &str) {
        *self.fail_create.lock().unwrap() = Some(message.to_string());
    }

    /// Make delete_static_route fail with the given message
    pub fn fail_delete(&self, message: &str) {
        *self.fail_delete.lock().unwrap() = Some(message.to_string());
    }

    /// Number of stored routes
    pub fn route_count(&self) -> usize {
        self.routes.lock().unwrap().len()
    }

    /// Stored route at a full policy path, if any
    pub fn route_at(&self, path: &str) -> Option<StaticRoute> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, r)| r.clone())
    }

    /// Number of realized-entities polls observed for an intent path
    pub fn realization_polls(&self, intent_path: &str) -> u32 {
        self.poll_counts
            .lock()
            .unwrap()
            .get(intent_path)
            .copied()
            .unwrap_or(0)
    }
}

// Pulls "tags.scope:<scope>" and "tags.tag:<value>" out of a search query so
// the mock filters the way the manager would.
fn parse_tag_filter(query: &str) -> (Option<String>, Option<String>) {
    let mut scope = None;
    let mut tag = None;
    for clause in query.split(" AND ") {
        if let Some(value) = clause.strip_prefix("tags.scope:") {
            scope = Some(value.to_string());
        } else if let Some(value) = clause.strip_prefix("tags.tag:") {
            tag = Some(value.to_string());
        }
    }
    (scope, tag)
}

#[async_trait::async_trait]
impl NsxBroker for MockNsxBroker {
    async fn query_entities(&self, query: &str) -> Result<SearchResponse, NsxError> {
        if let Some(message) = self.fail_query.lock().unwrap().clone() {
            return Err(NsxError::Api(message));
        }

        let (scope, tag) = parse_tag_filter(query);
        let results: Vec<StaticRoute> = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, route)| match (&scope, &tag) {
                (Some(scope), Some(tag)) => route
                    .tags
                    .iter()
                    .any(|t| &t.scope == scope && &t.tag == tag),
                _ => true,
            })
            .map(|(_, route)| route.clone())
            .collect();

        let count = results.len() as i64;
        Ok(SearchResponse {
            results,
            result_count: Some(count),
        })
    }

    async fn create_static_route(
        &self,
        router_path: &str,
        route_id: &str,
        route: &StaticRoute,
    ) -> Result<(), NsxError> {
        if let Some(message) = self.fail_create.lock().unwrap().clone() {
            return Err(NsxError::Api(message));
        }

        let path = format!("{}/static-routes/{}", router_path, route_id);
        let mut stored = route.clone();
        stored.id = Some(route_id.to_string());
        stored.path = Some(path.clone());

        let mut routes = self.routes.lock().unwrap();
        // PATCH semantics: overwrite in place, otherwise append
        if let Some(entry) = routes.iter_mut().find(|(p, _)| p == &path) {
            entry.1 = stored;
        } else {
            routes.push((path, stored));
        }
        Ok(())
    }

    async fn delete_static_route(
        &self,
        router_path: &str,
        route_id: &str,
    ) -> Result<(), NsxError> {
        if let Some(message) = self.fail_delete.lock().unwrap().clone() {
            return Err(NsxError::Api(message));
        }

        let path = format!("{}/static-routes/{}", router_path, route_id);
        // Deleting an absent route is success, matching the manager's contract
        self.routes.lock().unwrap().retain(|(p, _)| p != &path);
        Ok(())
    }

    async fn list_realized_entities(
        &self,
        intent_path: &str,
    ) -> Result<RealizedEntities, NsxError> {
        let polls = {
            let mut counts = self.poll_counts.lock().unwrap();
            let entry = counts.entry(intent_path.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        let state = if polls >= *self.realize_after.lock().unwrap() {
            *self.terminal_state.lock().unwrap()
        } else {
            RealizationState::InProgress
        };

        Ok(RealizedEntities {
            results: vec![RealizedEntity {
                state,
                intent_paths: vec![intent_path.to_string()],
                intent_reference: vec![intent_path.to_string()],
                id: None,
                path: None,
            }],
            result_count: Some(1),
        })
    }
}
