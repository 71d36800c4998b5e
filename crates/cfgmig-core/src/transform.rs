//! Per-record transformers applied before a record is created at the
//! destination component.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

use crate::defaults::{BUCKET_ID_KEY, BUCKET_ID_PREFIX, PARAMETERS_KEY};
use crate::error::Error;
use crate::models::ConfigurationRecord;

/// Transformation variant selected by the migration registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transformer {
    /// Copy the record unchanged.
    #[default]
    Identity,
    /// Meta extractors (Facebook pages, Facebook ads, Instagram): pin the
    /// output bucket of the new configuration to the one the origin
    /// configuration wrote to.
    Meta,
}

impl Transformer {
    /// Produce the record to create at the destination.
    ///
    /// `record` is never modified; callers keep using it for status
    /// write-back on the origin side.
    pub fn transform(&self, record: &ConfigurationRecord, origin_id: &str) -> ConfigurationRecord {
        let mut target = record.clone();
        match self {
            Self::Identity => {}
            Self::Meta => {
                let parameters = target
                    .configuration
                    .entry(PARAMETERS_KEY)
                    .or_insert_with(|| JsonValue::Object(Map::new()));
                if !parameters.is_object() {
                    *parameters = JsonValue::Object(Map::new());
                }
                if let JsonValue::Object(fields) = parameters {
                    fields.insert(
                        BUCKET_ID_KEY.to_string(),
                        JsonValue::String(bucket_id(origin_id, &record.id)),
                    );
                }
            }
        }
        target
    }
}

/// Bucket the origin component wrote a configuration's data into.
pub fn bucket_id(origin_id: &str, configuration_id: &str) -> String {
    format!(
        "{}{}-{}",
        BUCKET_ID_PREFIX,
        origin_id.replace('.', "-"),
        configuration_id
    )
}

impl FromStr for Transformer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "meta" => Ok(Self::Meta),
            _ => Err(Error::InvalidInput(format!("unknown transformer: {}", s))),
        }
    }
}

impl fmt::Display for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Meta => write!(f, "meta"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, configuration: JsonValue) -> ConfigurationRecord {
        ConfigurationRecord::new(id, "Test Configuration").with_configuration(configuration)
    }

    #[test]
    fn test_meta_with_existing_parameters() {
        let r = record(
            "test-config-1",
            json!({"parameters": {"existing_param": "existing_value", "other_param": "other_value"}}),
        );
        let out = Transformer::Meta.transform(&r, "ex-facebook");
        assert_eq!(
            JsonValue::Object(out.configuration),
            json!({"parameters": {
                "existing_param": "existing_value",
                "other_param": "other_value",
                "bucket-id": "in.c-ex-facebook-test-config-1"
            }})
        );
    }

    #[test]
    fn test_meta_without_parameters_section() {
        let r = record("test-config-2", json!({"other_section": "some_value"}));
        let out = Transformer::Meta.transform(&r, "ex-facebook");
        assert_eq!(
            JsonValue::Object(out.configuration),
            json!({
                "other_section": "some_value",
                "parameters": {"bucket-id": "in.c-ex-facebook-test-config-2"}
            })
        );
    }

    #[test]
    fn test_meta_with_empty_parameters() {
        let r = record("test-config-3", json!({"parameters": {}}));
        let out = Transformer::Meta.transform(&r, "ex-facebook");
        assert_eq!(
            out.configuration["parameters"],
            json!({"bucket-id": "in.c-ex-facebook-test-config-3"})
        );
    }

    #[test]
    fn test_meta_with_null_parameters() {
        let r = record("test-config-4", json!({"parameters": null}));
        let out = Transformer::Meta.transform(&r, "ex-facebook");
        assert_eq!(
            out.configuration["parameters"],
            json!({"bucket-id": "in.c-ex-facebook-test-config-4"})
        );
    }

    #[test]
    fn test_meta_dotted_origin() {
        let r = record("cfg-5", json!({}));
        let out = Transformer::Meta.transform(&r, "ex.facebook.ads");
        assert_eq!(
            out.configuration["parameters"]["bucket-id"],
            json!("in.c-ex-facebook-ads-cfg-5")
        );
    }

    #[test]
    fn test_meta_overwrites_prior_bucket_id() {
        let r = record("cfg-5", json!({"parameters": {"bucket-id": "in.c-old"}}));
        let out = Transformer::Meta.transform(&r, "ex.facebook.ads");
        assert_eq!(
            out.configuration["parameters"]["bucket-id"],
            json!("in.c-ex-facebook-ads-cfg-5")
        );
    }

    #[test]
    fn test_bucket_id_component_formats() {
        let cases = [
            ("ex-facebook", "in.c-ex-facebook-test-config"),
            ("ex.facebook", "in.c-ex-facebook-test-config"),
            ("ex.facebook.ads", "in.c-ex-facebook-ads-test-config"),
            ("ex-instagram", "in.c-ex-instagram-test-config"),
            ("ex.instagram", "in.c-ex-instagram-test-config"),
            ("keboola.ex-facebook", "in.c-keboola-ex-facebook-test-config"),
        ];
        for (origin, expected) in cases {
            assert_eq!(bucket_id(origin, "test-config"), expected, "origin {}", origin);
        }
    }

    #[test]
    fn test_bucket_id_keeps_config_id_verbatim() {
        assert_eq!(
            bucket_id("ex-facebook", "test-config-with-special_chars.123"),
            "in.c-ex-facebook-test-config-with-special_chars.123"
        );
    }

    #[test]
    fn test_meta_preserves_other_fields() {
        let r = ConfigurationRecord::new("test-config-6", "Test Configuration")
            .with_description("Test Description")
            .with_configuration(json!({
                "parameters": {"existing_param": "existing_value"},
                "other_section": {"nested": "value"}
            }));
        let out = Transformer::Meta.transform(&r, "ex-facebook");
        assert_eq!(out.id, "test-config-6");
        assert_eq!(out.name, "Test Configuration");
        assert_eq!(out.description.as_deref(), Some("Test Description"));
        assert_eq!(out.configuration["other_section"], json!({"nested": "value"}));
        assert_eq!(
            out.configuration["parameters"]["existing_param"],
            json!("existing_value")
        );
    }

    #[test]
    fn test_transform_does_not_mutate_input() {
        let r = record("cfg-1", json!({"parameters": null, "authorization": {"oauth_api": {}}}));
        let before = serde_json::to_string(&r).unwrap();
        let _ = Transformer::Meta.transform(&r, "keboola.ex-facebook");
        let _ = Transformer::Identity.transform(&r, "keboola.ex-facebook");
        assert_eq!(serde_json::to_string(&r).unwrap(), before);
    }

    #[test]
    fn test_identity_returns_equal_copy() {
        let r = record("cfg-1", json!({"parameters": {"a": 1}}));
        assert_eq!(Transformer::Identity.transform(&r, "x.y"), r);
    }

    #[test]
    fn test_transformer_from_str_and_display() {
        assert_eq!("meta".parse::<Transformer>().unwrap(), Transformer::Meta);
        assert_eq!("IDENTITY".parse::<Transformer>().unwrap(), Transformer::Identity);
        assert!("copy".parse::<Transformer>().is_err());
        assert_eq!(Transformer::Meta.to_string(), "meta");
    }
}
