//! Storage API client for component configurations.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use cfgmig_core::defaults::{BRANCH_ID, REQUEST_TIMEOUT_SECS, TOKEN_HEADER};
use cfgmig_core::{
    ComponentDirectory, ComponentInfo, ConfigurationRecord, ConfigurationStore,
    CreateConfigurationRequest, Error, Result, UpdateConfigurationRequest,
};

/// Connection settings for the Storage API.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Stack URL, e.g. `https://connection.keboola.com`.
    pub base_url: String,
    /// Storage API token.
    pub token: String,
    /// Development branch; `default` targets the main branch.
    pub branch_id: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl StorageConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            branch_id: BRANCH_ID.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = branch_id.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("Storage API URL cannot be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Storage API URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.token.is_empty() {
            return Err(Error::Config("Storage API token cannot be empty".to_string()));
        }
        if self.branch_id.is_empty() {
            return Err(Error::Config("Branch ID cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Error body returned by the Storage API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Storage API client implementing the configuration store and component
/// directory contracts.
#[derive(Debug, Clone)]
pub struct StorageClient {
    client: Client,
    components_url: String,
    token: String,
}

impl StorageClient {
    /// Create a client from validated settings.
    pub fn new(config: StorageConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let components_url = format!(
            "{}/v2/storage/branch/{}/components",
            config.base_url.trim_end_matches('/'),
            config.branch_id
        );
        debug!(url = %components_url, "Initialized Storage API client");

        Ok(Self {
            client,
            components_url,
            token: config.token,
        })
    }

    /// Base URL of the components endpoint.
    pub fn components_url(&self) -> &str {
        &self.components_url
    }

    fn configs_url(&self, component_id: &str) -> Result<String> {
        Ok(format!(
            "{}/{}/configs",
            self.components_url,
            require("component_id", component_id)?
        ))
    }

    async fn send<T: DeserializeOwned>(&self, op: &str, request: RequestBuilder) -> Result<T> {
        let start = Instant::now();
        let response = request
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| Error::Request(format!("{} request failed: {}", op, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.or(b.message))
                .unwrap_or(body);
            warn!(
                op,
                http_status = status.as_u16(),
                error = %message,
                "Storage API request failed"
            );
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse {} response: {}", op, e)))?;
        debug!(
            op,
            http_status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Storage API request complete"
        );
        Ok(parsed)
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("Invalid {} '{}'.", field, value)));
    }
    Ok(value)
}

#[async_trait]
impl ConfigurationStore for StorageClient {
    #[instrument(skip(self), fields(subsystem = "client"))]
    async fn list(&self, component_id: &str) -> Result<Vec<ConfigurationRecord>> {
        let url = self.configs_url(component_id)?;
        self.send("list", self.client.get(url)).await
    }

    #[instrument(skip(self, req), fields(subsystem = "client", config_name = %req.name))]
    async fn create(
        &self,
        component_id: &str,
        req: CreateConfigurationRequest,
    ) -> Result<ConfigurationRecord> {
        let url = self.configs_url(component_id)?;
        self.send("create", self.client.post(url).json(&req)).await
    }

    #[instrument(skip(self, req), fields(subsystem = "client"))]
    async fn update(
        &self,
        component_id: &str,
        configuration_id: &str,
        req: UpdateConfigurationRequest,
    ) -> Result<ConfigurationRecord> {
        let url = format!(
            "{}/{}",
            self.configs_url(component_id)?,
            require("configuration_id", configuration_id)?
        );
        self.send("update", self.client.put(url).json(&req)).await
    }
}

#[async_trait]
impl ComponentDirectory for StorageClient {
    #[instrument(skip(self), fields(subsystem = "client"))]
    async fn get_component(&self, component_id: &str) -> Result<ComponentInfo> {
        let url = format!(
            "{}/{}",
            self.components_url,
            require("component_id", component_id)?
        );
        self.send("get_component", self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::new("https://connection.keboola.com", "token");
        assert_eq!(config.branch_id, "default");
        assert_eq!(config.timeout_secs, REQUEST_TIMEOUT_SECS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = StorageConfig::new("connection.keboola.com", "token");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        let config = StorageConfig::new("", "token");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_token_and_branch() {
        assert!(StorageConfig::new("https://x", "").validate().is_err());
        assert!(StorageConfig::new("https://x", "t")
            .with_branch("")
            .validate()
            .is_err());
    }

    #[test]
    fn test_components_url_trims_slash() {
        let client = StorageClient::new(
            StorageConfig::new("https://connection.keboola.com/", "token").with_branch("123"),
        )
        .unwrap();
        assert_eq!(
            client.components_url(),
            "https://connection.keboola.com/v2/storage/branch/123/components"
        );
    }

    #[test]
    fn test_require_rejects_empty() {
        match require("component_id", "") {
            Err(Error::InvalidInput(msg)) => assert_eq!(msg, "Invalid component_id ''."),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert_eq!(require("component_id", "a").unwrap(), "a");
    }

    #[test]
    fn test_api_error_body_parsing() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":"Configuration not found","code":404,"status":"error"}"#)
                .unwrap();
        assert_eq!(body.error.as_deref(), Some("Configuration not found"));
        assert_eq!(body.message, None);
    }
}
