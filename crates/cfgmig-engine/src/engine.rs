//! Migration engine: moves configuration records from an origin component
//! to a destination component and records per-record status on the origin.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use cfgmig_core::defaults::AUTHORIZATION_KEY;
use cfgmig_core::{
    is_migrated, status_update_request, ConfigurationRecord, ConfigurationStore,
    CreateConfigurationRequest, Error, MigrationOutcome, MigrationRegistry, MigrationStatus,
    Result, RunReport, Transformer,
};

/// What a run does after a record fails to migrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run at the first failed record. Status markers written so far
    /// stay in place, so a re-run resumes where this one stopped.
    #[default]
    Abort,
    /// Record the failure and move on to the next record.
    Continue,
}

impl std::str::FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            _ => Err(Error::Config(format!("unknown failure policy: {}", s))),
        }
    }
}

/// Per-run engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Drop the `authorization` payload section before creating the record
    /// at the destination. Credentials are bound to the origin component.
    pub remove_authorization: bool,
    /// Behavior after a failed record.
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remove_authorization: true,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MIGRATION_REMOVE_AUTHORIZATION` | `true` | Strip `authorization` before create |
    /// | `MIGRATION_FAILURE_POLICY` | `abort` | `abort` or `continue` |
    pub fn from_env() -> Self {
        let remove_authorization = std::env::var("MIGRATION_REMOVE_AUTHORIZATION")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let failure_policy = std::env::var("MIGRATION_FAILURE_POLICY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            remove_authorization,
            failure_policy,
        }
    }

    /// Keep or strip the authorization section.
    pub fn with_remove_authorization(mut self, remove: bool) -> Self {
        self.remove_authorization = remove;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Drives migration runs against a configuration store.
pub struct MigrationEngine {
    pub(crate) store: Arc<dyn ConfigurationStore>,
    pub(crate) registry: MigrationRegistry,
    config: EngineConfig,
}

impl MigrationEngine {
    /// Create a new engine.
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        registry: MigrationRegistry,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Migrate every not-yet-migrated record of `origin_id` to
    /// `destination_id`.
    ///
    /// Fails before touching any record when the origin is blank or not
    /// registered, or when the destination is blank.
    pub async fn execute(&self, origin_id: &str, destination_id: &str) -> Result<RunReport> {
        let spec = self.registry.resolve(origin_id)?;
        if destination_id.trim().is_empty() {
            return Err(Error::Config(
                "Destination component ID not set.".to_string(),
            ));
        }

        let run_id = Uuid::now_v7();
        let span = info_span!(
            "migration_run",
            run_id = %run_id,
            origin_id = %origin_id,
            destination_id = %destination_id,
            transformer = %spec.transformer,
        );
        self.run(run_id, origin_id, destination_id, spec.transformer)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        run_id: Uuid,
        origin_id: &str,
        destination_id: &str,
        transformer: Transformer,
    ) -> Result<RunReport> {
        let start = Instant::now();
        info!(
            "Starting migration from {} to {}",
            origin_id, destination_id
        );

        let records = self.store.list(origin_id).await?;
        info!(
            record_count = records.len(),
            "Found configurations to process"
        );

        let mut report = RunReport::new(run_id, origin_id, destination_id);

        for record in &records {
            if is_migrated(record) {
                info!(
                    config_id = %record.id,
                    config_name = %record.name,
                    "Configuration already migrated, skipping"
                );
                report.record(MigrationOutcome::Skipped {
                    id: record.id.clone(),
                    name: record.name.clone(),
                });
                continue;
            }

            info!(
                config_id = %record.id,
                config_name = %record.name,
                "Migrating configuration"
            );

            match self
                .migrate_record(record, origin_id, destination_id, transformer)
                .await
            {
                Ok(created) => {
                    self.write_status(origin_id, record, MigrationStatus::Success)
                        .await;
                    info!(
                        config_id = %record.id,
                        new_config_id = %created.id,
                        new_config_name = %created.name,
                        "Successfully migrated configuration"
                    );
                    report.record(MigrationOutcome::Migrated {
                        source_id: record.id.clone(),
                        source_name: record.name.clone(),
                        new_id: created.id,
                        new_name: created.name,
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(
                        config_id = %record.id,
                        config_name = %record.name,
                        error = %message,
                        "Failed to migrate configuration"
                    );
                    self.write_status(origin_id, record, MigrationStatus::Error(message.clone()))
                        .await;
                    report.record(MigrationOutcome::Failed {
                        id: record.id.clone(),
                        name: record.name.clone(),
                        error: message.clone(),
                    });

                    // Abort is the default; see FailurePolicy.
                    if self.config.failure_policy == FailurePolicy::Abort {
                        report.finish();
                        warn!(
                            total = report.summary.total,
                            migrated = report.summary.migrated,
                            failed = report.summary.failed,
                            skipped = report.summary.skipped,
                            remaining = records.len() - report.summary.total,
                            duration_ms = start.elapsed().as_millis() as u64,
                            "Migration aborted"
                        );
                        if e.is_user_facing() {
                            return Err(e);
                        }
                        return Err(Error::User(format!(
                            "Migration failed for configuration '{}': {}",
                            record.name, message
                        )));
                    }
                }
            }
        }

        report.finish();
        info!(
            total = report.summary.total,
            migrated = report.summary.migrated,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            duration_ms = start.elapsed().as_millis() as u64,
            "Migration completed"
        );
        Ok(report)
    }

    /// Transform a copy of `record` and create it at the destination.
    async fn migrate_record(
        &self,
        record: &ConfigurationRecord,
        origin_id: &str,
        destination_id: &str,
        transformer: Transformer,
    ) -> Result<ConfigurationRecord> {
        let mut target = transformer.transform(record, origin_id);

        if self.config.remove_authorization
            && target.configuration.remove(AUTHORIZATION_KEY).is_some()
        {
            debug!(config_id = %record.id, "Removed authorization section");
        }

        self.store
            .create(
                destination_id,
                CreateConfigurationRequest {
                    name: target.name,
                    description: target.description.unwrap_or_default(),
                    configuration: target.configuration,
                },
            )
            .await
    }

    /// Persist `status` on the untransformed origin record.
    ///
    /// Failures are logged and swallowed; they never change the outcome of
    /// the record being processed.
    async fn write_status(
        &self,
        origin_id: &str,
        record: &ConfigurationRecord,
        status: MigrationStatus,
    ) {
        let marker = status.marker().unwrap_or_default();
        let req = status_update_request(record, &marker);
        if let Err(e) = self.store.update(origin_id, &record.id, req).await {
            warn!(
                config_id = %record.id,
                status = %marker,
                error = %e,
                "Failed to persist migration status"
            );
        }
    }
}
