//! HTTP client for the PulseCheck backend API.
//!
//! Every method issues one GET request and decodes the JSON body. A
//! non-success status or a body that fails to decode is reported as an
//! [`ApiError`]; the client itself never retries.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    ClusterOverview, Health, MetricsSnapshot, NodeList, PodDetail, PodList, PodLogs,
};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the PulseCheck backend's snapshot endpoints.
///
/// Cloning is cheap; all clones share the same connection pool, so the
/// same client can back any number of pollers.
///
/// # Example
///
/// ```rust,no_run
/// use pulsecheck::ApiClient;
///
/// # tokio_test::block_on(async {
/// let client = ApiClient::builder()
///     .endpoint("http://localhost:8000")
///     .build();
///
/// let overview = client.cluster().await?;
/// println!("{} pods total", overview.pods.total);
/// # Ok::<(), pulsecheck::ApiError>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Returns the base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check backend liveness and whether its cluster client is connected.
    pub async fn health(&self) -> Result<Health, ApiError> {
        self.get_json("/health").await
    }

    /// Fetch the cluster summary (node/pod/namespace counts by status).
    pub async fn cluster(&self) -> Result<ClusterOverview, ApiError> {
        self.get_json("/api/cluster").await
    }

    /// Fetch the pod list for the monitored namespace.
    pub async fn pods(&self) -> Result<PodList, ApiError> {
        self.get_json("/api/pods").await
    }

    /// Fetch detailed information about a single pod.
    pub async fn pod(&self, name: &str) -> Result<PodDetail, ApiError> {
        self.get_json(&format!("/api/pods/{}", name)).await
    }

    /// Fetch the last `tail` log lines of a pod.
    pub async fn logs(&self, name: &str, tail: u32) -> Result<PodLogs, ApiError> {
        self.get_json(&format!("/api/pods/{}/logs?tail={}", name, tail)).await
    }

    /// Fetch CPU/memory usage for all pods.
    pub async fn metrics(&self) -> Result<MetricsSnapshot, ApiError> {
        self.get_json("/api/metrics").await
    }

    /// Fetch the node list.
    pub async fn nodes(&self) -> Result<NodeList, ApiError> {
        self.get_json("/api/nodes").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            // The backend puts its failure reason in the body; keep it if present.
            let message = status_message(response.text().await.unwrap_or_default());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Extract the human-readable reason from an error body.
///
/// The backend wraps its reason as `{"detail": "..."}`; anything else is
/// surfaced verbatim.
fn status_message(body: String) -> String {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: String,
    }
    match serde_json::from_str::<Detail>(&body) {
        Ok(wrapped) => wrapped.detail,
        Err(_) => body,
    }
}

/// Builder for [`ApiClient`].
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set the backend base URL (e.g. "http://localhost:8000").
    ///
    /// A trailing slash is stripped so paths can be appended verbatim.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiClient {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        let mut base_url = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        while base_url.ends_with('/') {
            base_url.pop();
        }

        ApiClient { client, base_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let client = ApiClient::builder().build();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn builder_strips_trailing_slash() {
        let client = ApiClient::builder().endpoint("http://api.local:8000/").build();
        assert_eq!(client.base_url(), "http://api.local:8000");
    }

    #[test]
    fn builder_custom_endpoint() {
        let client = ApiClient::builder()
            .endpoint("https://pulsecheck.example.com")
            .timeout(Duration::from_secs(3))
            .build();
        assert_eq!(client.base_url(), "https://pulsecheck.example.com");
    }

    #[test]
    fn status_message_unwraps_detail_body() {
        let body = r#"{"detail": "Kubernetes client not initialized"}"#.to_string();
        assert_eq!(status_message(body), "Kubernetes client not initialized");
    }

    #[test]
    fn status_message_keeps_non_detail_bodies_verbatim() {
        assert_eq!(status_message("bad gateway".to_string()), "bad gateway");
        assert_eq!(status_message(r#"{"error": "x"}"#.to_string()), r#"{"error": "x"}"#);
        assert_eq!(status_message(String::new()), "");
    }
}
