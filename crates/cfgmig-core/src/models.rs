//! Data models for configuration records and migration runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use uuid::Uuid;

use crate::defaults::{STATUS_ERROR_PREFIX, STATUS_SUCCESS};

/// Opaque configuration body of a record.
pub type Payload = Map<String, JsonValue>;

// =============================================================================
// CONFIGURATION RECORDS
// =============================================================================

/// A configuration record as stored under a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    /// Identifier, unique within the owning component.
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Record payload. The Storage API encodes an empty payload as `[]` or
    /// `null`; both decode to an empty map.
    #[serde(default, deserialize_with = "deserialize_payload")]
    pub configuration: Payload,
}

impl ConfigurationRecord {
    /// Create a record with an empty payload.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            configuration: Payload::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the payload. Non-object values leave an empty payload.
    pub fn with_configuration(mut self, configuration: JsonValue) -> Self {
        self.configuration = match configuration {
            JsonValue::Object(map) => map,
            _ => Payload::new(),
        };
        self
    }

    /// Description as sent back to the store (empty when absent).
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

fn deserialize_payload<'de, D>(deserializer: D) -> Result<Payload, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Payload::new()),
        JsonValue::Array(items) if items.is_empty() => Ok(Payload::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected configuration object, got {}",
            other
        ))),
    }
}

/// Component metadata returned by the component directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// MIGRATION STATUS
// =============================================================================

/// Migration marker persisted in a record's runtime section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStatus {
    Unset,
    Success,
    Error(String),
}

impl MigrationStatus {
    /// Marker value written into the payload. `None` for `Unset`.
    pub fn marker(&self) -> Option<String> {
        match self {
            Self::Unset => None,
            Self::Success => Some(STATUS_SUCCESS.to_string()),
            Self::Error(message) => Some(format!("{}{}", STATUS_ERROR_PREFIX, message)),
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.marker() {
            Some(marker) => f.write_str(&marker),
            None => f.write_str("unset"),
        }
    }
}

// =============================================================================
// RUN OUTCOMES
// =============================================================================

/// Result of processing a single source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Migrated {
        source_id: String,
        source_name: String,
        new_id: String,
        new_name: String,
    },
    Failed {
        id: String,
        name: String,
        error: String,
    },
    Skipped {
        id: String,
        name: String,
    },
}

/// Summary counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub migrated: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// A record created at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigratedConfiguration {
    pub id: String,
    pub name: String,
    pub source_id: String,
    pub source_name: String,
}

/// A source record whose migration failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedConfiguration {
    pub id: String,
    pub name: String,
    pub error: String,
}

/// Aggregated result of one `execute` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub origin_id: String,
    pub destination_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub summary: RunSummary,
    pub created_configurations: Vec<MigratedConfiguration>,
    pub failed_configurations: Vec<FailedConfiguration>,
}

impl RunReport {
    /// Start an empty report.
    pub fn new(run_id: Uuid, origin_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self {
            run_id,
            origin_id: origin_id.into(),
            destination_id: destination_id.into(),
            started_at: Utc::now(),
            finished_at: None,
            summary: RunSummary::default(),
            created_configurations: Vec::new(),
            failed_configurations: Vec::new(),
        }
    }

    /// Fold one outcome into the counts and item lists.
    pub fn record(&mut self, outcome: MigrationOutcome) {
        self.summary.total += 1;
        match outcome {
            MigrationOutcome::Migrated {
                source_id,
                source_name,
                new_id,
                new_name,
            } => {
                self.summary.migrated += 1;
                self.created_configurations.push(MigratedConfiguration {
                    id: new_id,
                    name: new_name,
                    source_id,
                    source_name,
                });
            }
            MigrationOutcome::Failed { id, name, error } => {
                self.summary.failed += 1;
                self.failed_configurations
                    .push(FailedConfiguration { id, name, error });
            }
            MigrationOutcome::Skipped { .. } => {
                self.summary.skipped += 1;
            }
        }
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// `total == migrated + failed + skipped`.
    pub fn is_consistent(&self) -> bool {
        let s = &self.summary;
        s.total == s.migrated + s.failed + s.skipped
            && s.migrated == self.created_configurations.len()
            && s.failed == self.failed_configurations.len()
    }
}

// =============================================================================
// STATUS LISTING
// =============================================================================

/// Migration status of one source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub config_id: String,
    pub config_name: String,
    pub component_id: String,
    pub status: String,
}

/// Read-only status of every record of an origin component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusListing {
    pub configurations: Vec<StatusEntry>,
}

/// Registry entry with human-readable component names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedMigration {
    /// `"<origin name> -> <destination name>"`
    pub label: String,
    /// Origin component id.
    pub value: String,
}
