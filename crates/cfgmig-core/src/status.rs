//! Migration status codec.
//!
//! The marker lives at `configuration.runtime.migrationStatus` of the source
//! record. Reading never fails; writing returns a new record and leaves
//! persistence to the caller.

use serde_json::{Map, Value as JsonValue};

use crate::defaults::{MIGRATION_STATUS_KEY, RUNTIME_KEY, STATUS_NOT_AVAILABLE, STATUS_SUCCESS};
use crate::models::ConfigurationRecord;
use crate::traits::UpdateConfigurationRequest;

fn raw_status(record: &ConfigurationRecord) -> Option<&JsonValue> {
    record
        .configuration
        .get(RUNTIME_KEY)
        .and_then(JsonValue::as_object)
        .and_then(|runtime| runtime.get(MIGRATION_STATUS_KEY))
}

/// True iff the record's marker is exactly `success`.
pub fn is_migrated(record: &ConfigurationRecord) -> bool {
    matches!(raw_status(record), Some(JsonValue::String(s)) if s == STATUS_SUCCESS)
}

/// Raw marker value, or `"n/a"` when the record has none.
pub fn current_status(record: &ConfigurationRecord) -> String {
    match raw_status(record) {
        None | Some(JsonValue::Null) => STATUS_NOT_AVAILABLE.to_string(),
        Some(JsonValue::String(s)) if s.is_empty() => STATUS_NOT_AVAILABLE.to_string(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Copy of `record` with the marker set to `status`.
///
/// Every other payload field, including unrelated runtime data, is kept.
/// A missing or non-object runtime section is replaced by a fresh one.
pub fn with_status(record: &ConfigurationRecord, status: &str) -> ConfigurationRecord {
    let mut updated = record.clone();
    let runtime = updated
        .configuration
        .entry(RUNTIME_KEY)
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if !runtime.is_object() {
        *runtime = JsonValue::Object(Map::new());
    }
    if let JsonValue::Object(fields) = runtime {
        fields.insert(
            MIGRATION_STATUS_KEY.to_string(),
            JsonValue::String(status.to_string()),
        );
    }
    updated
}

/// Full-replace update body that persists `status` on `record`.
pub fn status_update_request(record: &ConfigurationRecord, status: &str) -> UpdateConfigurationRequest {
    let updated = with_status(record, status);
    UpdateConfigurationRequest {
        name: updated.name.clone(),
        description: updated.description_or_empty().to_string(),
        configuration: updated.configuration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(configuration: JsonValue) -> ConfigurationRecord {
        ConfigurationRecord::new("test-config-1", "Test Configuration")
            .with_description("Test Description")
            .with_configuration(configuration)
    }

    #[test]
    fn test_is_migrated_success_status() {
        let r = record(json!({"runtime": {"migrationStatus": "success"}}));
        assert!(is_migrated(&r));
    }

    #[test]
    fn test_is_migrated_error_status() {
        let r = record(json!({"runtime": {"migrationStatus": "error: Some error message"}}));
        assert!(!is_migrated(&r));
    }

    #[test]
    fn test_is_migrated_empty_status() {
        let r = record(json!({"runtime": {"migrationStatus": ""}}));
        assert!(!is_migrated(&r));
    }

    #[test]
    fn test_is_migrated_missing_status_key() {
        let r = record(json!({"runtime": {"otherProperty": "some value"}}));
        assert!(!is_migrated(&r));
    }

    #[test]
    fn test_is_migrated_missing_runtime() {
        let r = record(json!({"otherProperty": "some value"}));
        assert!(!is_migrated(&r));
    }

    #[test]
    fn test_is_migrated_empty_configuration() {
        let r = ConfigurationRecord::new("test-config-6", "Test Configuration");
        assert!(!is_migrated(&r));
    }

    #[test]
    fn test_is_migrated_runtime_not_an_object() {
        let r = record(json!({"runtime": null}));
        assert!(!is_migrated(&r));
        let r = record(json!({"runtime": "success"}));
        assert!(!is_migrated(&r));
    }

    #[test]
    fn test_current_status_returns_raw_marker() {
        let r = record(json!({"runtime": {"migrationStatus": "error: HTTP 500"}}));
        assert_eq!(current_status(&r), "error: HTTP 500");
        let r = record(json!({"runtime": {"migrationStatus": "success"}}));
        assert_eq!(current_status(&r), "success");
    }

    #[test]
    fn test_current_status_sentinel_when_absent() {
        assert_eq!(current_status(&record(json!({}))), "n/a");
        assert_eq!(current_status(&record(json!({"runtime": {}}))), "n/a");
        assert_eq!(
            current_status(&record(json!({"runtime": {"migrationStatus": ""}}))),
            "n/a"
        );
        assert_eq!(
            current_status(&record(json!({"runtime": {"migrationStatus": null}}))),
            "n/a"
        );
    }

    #[test]
    fn test_with_status_existing_runtime() {
        let r = record(json!({
            "runtime": {"otherProperty": "existing value"},
            "otherConfig": "some data"
        }));
        let updated = with_status(&r, "success");
        assert_eq!(
            JsonValue::Object(updated.configuration),
            json!({
                "runtime": {"otherProperty": "existing value", "migrationStatus": "success"},
                "otherConfig": "some data"
            })
        );
    }

    #[test]
    fn test_with_status_without_runtime() {
        let r = record(json!({"otherConfig": "some data"}));
        let updated = with_status(&r, "error: Test error");
        assert_eq!(
            JsonValue::Object(updated.configuration),
            json!({"otherConfig": "some data", "runtime": {"migrationStatus": "error: Test error"}})
        );
    }

    #[test]
    fn test_with_status_without_configuration() {
        let r = ConfigurationRecord::new("test-config-3", "Test Configuration");
        let updated = with_status(&r, "success");
        assert_eq!(
            JsonValue::Object(updated.configuration),
            json!({"runtime": {"migrationStatus": "success"}})
        );
    }

    #[test]
    fn test_with_status_preserves_unrelated_runtime_fields() {
        let r = record(json!({"runtime": {"otherRuntimeData": "preserved"}}));
        let updated = with_status(&r, "success");
        assert_eq!(
            updated.configuration["runtime"],
            json!({"otherRuntimeData": "preserved", "migrationStatus": "success"})
        );
    }

    #[test]
    fn test_with_status_overwrites_previous_marker() {
        let r = record(json!({"runtime": {"migrationStatus": "error: timeout"}}));
        let updated = with_status(&r, "success");
        assert!(is_migrated(&updated));
    }

    #[test]
    fn test_with_status_replaces_null_runtime() {
        let r = record(json!({"runtime": null}));
        let updated = with_status(&r, "success");
        assert_eq!(updated.configuration["runtime"], json!({"migrationStatus": "success"}));
    }

    #[test]
    fn test_with_status_leaves_input_untouched() {
        let r = record(json!({"runtime": {"otherRuntimeData": "preserved"}}));
        let before = r.clone();
        let _ = with_status(&r, "success");
        assert_eq!(r, before);
    }

    #[test]
    fn test_status_update_request_defaults_description() {
        let r = ConfigurationRecord::new("test-config-4", "Test Configuration")
            .with_configuration(json!({"someConfig": "data"}));
        let req = status_update_request(&r, "pending");
        assert_eq!(req.name, "Test Configuration");
        assert_eq!(req.description, "");
        assert_eq!(
            JsonValue::Object(req.configuration),
            json!({"someConfig": "data", "runtime": {"migrationStatus": "pending"}})
        );
    }

    #[test]
    fn test_status_update_request_empty_marker() {
        let r = record(json!({"someConfig": "data"}));
        let req = status_update_request(&r, "");
        assert_eq!(req.description, "Test Description");
        assert_eq!(req.configuration["runtime"], json!({"migrationStatus": ""}));
    }
}
