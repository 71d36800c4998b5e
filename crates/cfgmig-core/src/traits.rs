//! Store contracts consumed by the migration engine.
//!
//! The engine only ever talks to these traits; the Storage API client and
//! the in-memory mock store implement them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ComponentInfo, ConfigurationRecord, Payload};

/// Request for creating a configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConfigurationRequest {
    pub name: String,
    pub description: String,
    pub configuration: Payload,
}

/// Full-replace update of a configuration record.
///
/// `configuration` always carries the complete payload; stores must not
/// merge it with the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConfigurationRequest {
    pub name: String,
    pub description: String,
    pub configuration: Payload,
}

/// Access to configuration records of a component.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// List every configuration of a component in one bulk read.
    async fn list(&self, component_id: &str) -> Result<Vec<ConfigurationRecord>>;

    /// Create a configuration; returns at least the new id and name.
    async fn create(
        &self,
        component_id: &str,
        req: CreateConfigurationRequest,
    ) -> Result<ConfigurationRecord>;

    /// Replace name, description and payload of an existing configuration.
    async fn update(
        &self,
        component_id: &str,
        configuration_id: &str,
        req: UpdateConfigurationRequest,
    ) -> Result<ConfigurationRecord>;
}

/// Lookup of component metadata.
#[async_trait]
pub trait ComponentDirectory: Send + Sync {
    /// Fetch metadata of a component.
    async fn get_component(&self, component_id: &str) -> Result<ComponentInfo>;
}
