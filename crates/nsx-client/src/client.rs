//! NSX-T policy API client
//!
//! Implements the subset of the NSX-T policy REST API the route controller
//! needs: the search API, static-route create/delete under a logical router,
//! and the realized-state listing for an intent path.

use crate::error::NsxError;
use crate::models::{RealizedEntities, SearchResponse, StaticRoute};
use crate::nsx_trait::NsxBroker;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// NSX-T policy API client
pub struct NsxClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl NsxClient {
    /// Create a new NSX client
    ///
    /// # Arguments
    /// * `base_url` - NSX manager base URL (e.g., "https://nsx-manager")
    /// * `username` - API username
    /// * `password` - API password
    /// * `insecure_skip_verify` - Accept self-signed manager certificates
    pub fn new(
        base_url: String,
        username: String,
        password: String,
        insecure_skip_verify: bool,
    ) -> Result<Self, NsxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(insecure_skip_verify)
            .build()
            .map_err(NsxError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate credentials and connectivity with a lightweight search.
    ///
    /// # Returns
    /// * `Ok(())` - Credentials are valid and the manager is reachable
    /// * `Err(NsxError)` - Credentials are invalid or the manager is unreachable
    pub async fn validate_credentials(&self) -> Result<(), NsxError> {
        let url = format!(
            "{}/policy/api/v1/search/query?query={}",
            self.base_url,
            urlencoding::encode("resource_type:Tier1 AND id:*")
        );
        debug!("Validating NSX credentials and connectivity");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NsxError::Http)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == 401 || status == 403 {
            return Err(NsxError::Authentication(format!(
                "Invalid credentials: {} - {}",
                status, body
            )));
        }

        if !status.is_success() {
            return Err(NsxError::Api(format!(
                "Failed to validate credentials: {} - {}",
                status, body
            )));
        }

        debug!("NSX credentials validated successfully");
        Ok(())
    }
}

#[async_trait::async_trait]
impl NsxBroker for NsxClient {
    async fn query_entities(&self, query: &str) -> Result<SearchResponse, NsxError> {
        let url = format!(
            "{}/policy/api/v1/search/query?query={}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!("Searching policy entities: {}", query);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NsxError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NsxError::Api(format!(
                "Failed to search entities with query '{}': {} - {}",
                query, status, body
            )));
        }

        // Capture the response body for better error messages on decode failure
        let response_text = response.text().await?;
        let result: SearchResponse = serde_json::from_str(&response_text).map_err(|e| {
            NsxError::Api(format!(
                "error decoding search response: {} - Response (first 500 chars): {}",
                e,
                response_text.chars().take(500).collect::<String>()
            ))
        })?;
        Ok(result)
    }

    async fn create_static_route(
        &self,
        router_path: &str,
        route_id: &str,
        route: &StaticRoute,
    ) -> Result<(), NsxError> {
        let url = format!(
            "{}/policy/api/v1{}/static-routes/{}",
            self.base_url, router_path, route_id
        );
        debug!("Creating static route {} under {}", route_id, router_path);

        let response = self
            .client
            .patch(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(route)
            .send()
            .await
            .map_err(NsxError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NsxError::Api(format!(
                "Failed to create static route {} under {}: {} - {}",
                route_id, router_path, status, body
            )));
        }

        Ok(())
    }

    async fn delete_static_route(
        &self,
        router_path: &str,
        route_id: &str,
    ) -> Result<(), NsxError> {
        let url = format!(
            "{}/policy/api/v1{}/static-routes/{}",
            self.base_url, router_path, route_id
        );
        debug!("Deleting static route {} under {}", route_id, router_path);

        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NsxError::Http)?;

        // Policy deletes are idempotent; a route that is already gone is success
        if response.status() == 404 {
            debug!(
                "Static route {} under {} already absent, treating delete as success",
                route_id, router_path
            );
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NsxError::Api(format!(
                "Failed to delete static route {} under {}: {} - {}",
                route_id, router_path, status, body
            )));
        }

        Ok(())
    }

    async fn list_realized_entities(
        &self,
        intent_path: &str,
    ) -> Result<RealizedEntities, NsxError> {
        let url = format!(
            "{}/policy/api/v1/infra/realized-state/realized-entities?intent_path={}",
            self.base_url,
            urlencoding::encode(intent_path)
        );
        debug!("Listing realized entities for {}", intent_path);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NsxError::Http)?;

        if response.status() == 404 {
            return Err(NsxError::NotFound(format!(
                "No realized entities for {}",
                intent_path
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NsxError::Api(format!(
                "Failed to list realized entities for {}: {} - {}",
                intent_path, status, body
            )));
        }

        let result: RealizedEntities = response.json().await.map_err(NsxError::Http)?;
        Ok(result)
    }
}
