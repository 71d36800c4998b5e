//! In-memory store and component directory for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cfgmig_engine::mock::MockConfigurationStore;
//!
//! let store = MockConfigurationStore::new()
//!     .with_records("keboola.ex-facebook", vec![record]);
//! let engine = MigrationEngine::new(Arc::new(store.clone()), registry, config);
//! engine.execute("keboola.ex-facebook", "keboola.ex-facebook-pages").await?;
//! assert_eq!(store.create_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cfgmig_core::{
    ComponentDirectory, ComponentInfo, ConfigurationRecord, ConfigurationStore,
    CreateConfigurationRequest, Error, Result, UpdateConfigurationRequest,
};

/// A call recorded by [`MockConfigurationStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List {
        component_id: String,
    },
    Create {
        component_id: String,
        request: CreateConfigurationRequest,
    },
    Update {
        component_id: String,
        configuration_id: String,
        request: UpdateConfigurationRequest,
    },
}

/// Error the mock returns for a scripted failure.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Api { status: u16, message: String },
    Request(String),
    User(String),
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self {
            Self::Api { status, message } => Error::Api {
                status: *status,
                message: message.clone(),
            },
            Self::Request(message) => Error::Request(message.clone()),
            Self::User(message) => Error::User(message.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    components: HashMap<String, Vec<ConfigurationRecord>>,
    calls: Vec<StoreCall>,
    create_failures: HashMap<String, MockFailure>,
    update_failure: Option<MockFailure>,
    list_failure: Option<MockFailure>,
    next_id: u64,
}

/// In-memory [`ConfigurationStore`] with call recording and scripted
/// failures. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockConfigurationStore {
    state: Arc<Mutex<MockState>>,
}

impl MockConfigurationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the records of a component.
    pub fn with_records(self, component_id: &str, records: Vec<ConfigurationRecord>) -> Self {
        self.state
            .lock()
            .unwrap()
            .components
            .insert(component_id.to_string(), records);
        self
    }

    /// Fail every `create` whose name equals `name`.
    pub fn fail_create_named(self, name: &str, failure: MockFailure) -> Self {
        self.state
            .lock()
            .unwrap()
            .create_failures
            .insert(name.to_string(), failure);
        self
    }

    /// Fail every `update`.
    pub fn fail_updates(self, failure: MockFailure) -> Self {
        self.state.lock().unwrap().update_failure = Some(failure);
        self
    }

    /// Fail every `list`.
    pub fn fail_list(self, failure: MockFailure) -> Self {
        self.state.lock().unwrap().list_failure = Some(failure);
        self
    }

    /// Current records of a component.
    pub fn records(&self, component_id: &str) -> Vec<ConfigurationRecord> {
        self.state
            .lock()
            .unwrap()
            .components
            .get(component_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every call in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Requests passed to `create`, including failed ones.
    pub fn created_requests(&self) -> Vec<CreateConfigurationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Create { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Requests passed to `update`, with the target configuration id.
    pub fn updated_requests(&self) -> Vec<(String, UpdateConfigurationRequest)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Update {
                    configuration_id,
                    request,
                    ..
                } => Some((configuration_id, request)),
                _ => None,
            })
            .collect()
    }

    pub fn create_count(&self) -> usize {
        self.created_requests().len()
    }

    pub fn update_count(&self) -> usize {
        self.updated_requests().len()
    }
}

#[async_trait]
impl ConfigurationStore for MockConfigurationStore {
    async fn list(&self, component_id: &str) -> Result<Vec<ConfigurationRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::List {
            component_id: component_id.to_string(),
        });
        if let Some(failure) = &state.list_failure {
            return Err(failure.to_error());
        }
        Ok(state
            .components
            .get(component_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(
        &self,
        component_id: &str,
        req: CreateConfigurationRequest,
    ) -> Result<ConfigurationRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Create {
            component_id: component_id.to_string(),
            request: req.clone(),
        });
        if let Some(failure) = state.create_failures.get(&req.name) {
            return Err(failure.to_error());
        }

        state.next_id += 1;
        let created = ConfigurationRecord {
            id: format!("{}", 1000 + state.next_id),
            name: req.name,
            description: Some(req.description),
            configuration: req.configuration,
        };
        state
            .components
            .entry(component_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        component_id: &str,
        configuration_id: &str,
        req: UpdateConfigurationRequest,
    ) -> Result<ConfigurationRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Update {
            component_id: component_id.to_string(),
            configuration_id: configuration_id.to_string(),
            request: req.clone(),
        });
        if let Some(failure) = &state.update_failure {
            return Err(failure.to_error());
        }

        let existing = state
            .components
            .get_mut(component_id)
            .and_then(|records| records.iter_mut().find(|r| r.id == configuration_id))
            .ok_or_else(|| Error::Api {
                status: 404,
                message: format!("Configuration {} not found", configuration_id),
            })?;
        existing.name = req.name;
        existing.description = Some(req.description);
        existing.configuration = req.configuration;
        Ok(existing.clone())
    }
}

/// In-memory [`ComponentDirectory`]; unknown components return a 404.
#[derive(Debug, Clone, Default)]
pub struct MockComponentDirectory {
    names: HashMap<String, Option<String>>,
}

impl MockComponentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with a display name.
    pub fn with_component(mut self, component_id: &str, name: &str) -> Self {
        self.names
            .insert(component_id.to_string(), Some(name.to_string()));
        self
    }

    /// Register a component whose metadata carries no name.
    pub fn with_unnamed_component(mut self, component_id: &str) -> Self {
        self.names.insert(component_id.to_string(), None);
        self
    }
}

#[async_trait]
impl ComponentDirectory for MockComponentDirectory {
    async fn get_component(&self, component_id: &str) -> Result<ComponentInfo> {
        match self.names.get(component_id) {
            Some(name) => Ok(ComponentInfo {
                id: component_id.to_string(),
                name: name.clone(),
            }),
            None => Err(Error::Api {
                status: 404,
                message: format!("Component {} not found", component_id),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_update_replaces_payload() {
        let store = MockConfigurationStore::new().with_records(
            "c",
            vec![ConfigurationRecord::new("1", "one").with_configuration(json!({"a": 1}))],
        );
        let updated = store
            .update(
                "c",
                "1",
                UpdateConfigurationRequest {
                    name: "one".into(),
                    description: "".into(),
                    configuration: json!({"b": 2}).as_object().unwrap().clone(),
                },
            )
            .await
            .unwrap();
        assert!(!updated.configuration.contains_key("a"));
        assert_eq!(store.records("c")[0].configuration["b"], json!(2));
    }

    #[tokio::test]
    async fn test_mock_update_unknown_record() {
        let store = MockConfigurationStore::new();
        let result = store
            .update(
                "c",
                "missing",
                UpdateConfigurationRequest {
                    name: "n".into(),
                    description: "".into(),
                    configuration: Default::default(),
                },
            )
            .await;
        assert!(matches!(result, Err(Error::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_mock_create_assigns_ids() {
        let store = MockConfigurationStore::new();
        let req = CreateConfigurationRequest {
            name: "n".into(),
            description: "".into(),
            configuration: Default::default(),
        };
        let a = store.create("dst", req.clone()).await.unwrap();
        let b = store.create("dst", req).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.records("dst").len(), 2);
    }

    #[tokio::test]
    async fn test_mock_directory() {
        let directory = MockComponentDirectory::new().with_component("a", "Facebook Pages");
        assert_eq!(
            directory.get_component("a").await.unwrap().name.as_deref(),
            Some("Facebook Pages")
        );
        assert!(directory.get_component("b").await.is_err());
    }
}
