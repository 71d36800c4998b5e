//! Supported-migration catalog with human-readable labels.

use tracing::warn;

use cfgmig_core::{ComponentDirectory, MigrationRegistry, SupportedMigration};

/// List every registered migration as `"<origin name> -> <destination name>"`.
///
/// Name lookups are best-effort: a failed or nameless lookup falls back to
/// the raw component id.
pub async fn supported_migrations(
    registry: &MigrationRegistry,
    directory: &dyn ComponentDirectory,
) -> Vec<SupportedMigration> {
    let mut result = Vec::with_capacity(registry.len());
    for spec in registry.iter() {
        let origin_name = component_label(directory, &spec.origin).await;
        let destination_name = component_label(directory, &spec.destination).await;
        result.push(SupportedMigration {
            label: format!("{} -> {}", origin_name, destination_name),
            value: spec.origin.clone(),
        });
    }
    result
}

async fn component_label(directory: &dyn ComponentDirectory, component_id: &str) -> String {
    match directory.get_component(component_id).await {
        Ok(info) => info
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| component_id.to_string()),
        Err(e) => {
            warn!(
                component_id = %component_id,
                error = %e,
                "Failed to get component info, using id as label"
            );
            component_id.to_string()
        }
    }
}
