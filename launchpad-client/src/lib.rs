//! Launchpad HTTP Client
//!
//! A small, typed client for the Launchpad server API.
//!
//! # Example
//!
//! ```no_run
//! use launchpad_client::LaunchpadClient;
//! use launchpad_core::dto::build_run::BuildRunRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LaunchpadClient::new("http://localhost:8000");
//!
//!     let result = client
//!         .build_run(&BuildRunRequest::new("python", "print('hello')", "hello"))
//!         .await?;
//!
//!     println!("{}", result.logs);
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ClientError, Result};

use launchpad_core::dto::build_run::{BuildRunRequest, BuildRunResult};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Launchpad server API
#[derive(Debug, Clone)]
pub struct LaunchpadClient {
    /// Base URL of the server (e.g., "http://localhost:8000")
    base_url: String,
    client: Client,
}

impl LaunchpadClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:8000")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// A run can take minutes; any timeout configured on `client` must
    /// allow for the server's job wait.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build, publish and run code on the cluster, returning its output
    pub async fn build_run(&self, request: &BuildRunRequest) -> Result<BuildRunResult> {
        let url = format!("{}/k8s/build_run", self.base_url);
        tracing::debug!("POST {} (deployment {})", url, request.deployment_name);

        let response = self.client.post(&url).json(request).send().await?;
        self.handle_response(response).await
    }

    /// Check that the server is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), body));
        }
        Ok(())
    }

    /// Check the status code and deserialize a JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
