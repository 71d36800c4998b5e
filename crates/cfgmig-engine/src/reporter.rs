//! Read-only status listing of an origin component.

use tracing::{debug, instrument};

use cfgmig_core::{current_status, Result, StatusEntry, StatusListing};

use crate::engine::MigrationEngine;

impl MigrationEngine {
    /// Report the migration marker of every record of `origin_id`.
    ///
    /// Performs a single `list` call and never writes. Records without a
    /// marker report `"n/a"`.
    #[instrument(skip(self), fields(subsystem = "engine", op = "status"))]
    pub async fn status(&self, origin_id: &str) -> Result<StatusListing> {
        self.registry.resolve(origin_id)?;

        let records = self.store.list(origin_id).await?;
        debug!(record_count = records.len(), "Collected migration status");

        Ok(StatusListing {
            configurations: records
                .iter()
                .map(|record| StatusEntry {
                    config_id: record.id.clone(),
                    config_name: record.name.clone(),
                    component_id: origin_id.to_string(),
                    status: current_status(record),
                })
                .collect(),
        })
    }
}
