//! Static origin → destination → transformer table.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transform::Transformer;

/// One supported migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSpec {
    pub origin: String,
    pub destination: String,
    pub transformer: Transformer,
}

impl MigrationSpec {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        transformer: Transformer,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            transformer,
        }
    }
}

/// Immutable lookup table of supported migrations, keyed by origin id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRegistry {
    specs: Vec<MigrationSpec>,
}

impl MigrationRegistry {
    /// Build a registry from explicit entries. The first entry wins when an
    /// origin is listed twice.
    pub fn new(specs: Vec<MigrationSpec>) -> Self {
        Self { specs }
    }

    /// Registry of migrations shipped with the tool.
    pub fn builtin() -> Self {
        Self::new(vec![
            MigrationSpec::new(
                "keboola.ex-facebook",
                "keboola.ex-facebook-pages",
                Transformer::Meta,
            ),
            MigrationSpec::new(
                "keboola.ex-facebook-ads",
                "keboola.ex-facebook-ads-v2",
                Transformer::Meta,
            ),
            MigrationSpec::new(
                "keboola.ex-instagram",
                "keboola.ex-instagram-v2",
                Transformer::Meta,
            ),
        ])
    }

    /// Look up the entry for an origin.
    pub fn get(&self, origin: &str) -> Option<&MigrationSpec> {
        self.specs.iter().find(|spec| spec.origin == origin)
    }

    /// Look up the entry for an origin, failing with a user-facing error
    /// when the origin is blank or unknown.
    pub fn resolve(&self, origin: &str) -> Result<&MigrationSpec> {
        if origin.trim().is_empty() {
            return Err(Error::Config("Origin component ID not set.".to_string()));
        }
        self.get(origin)
            .ok_or_else(|| Error::UnsupportedOrigin(origin.to_string()))
    }

    /// Registered destination of an origin.
    pub fn destination_for(&self, origin: &str) -> Option<&str> {
        self.get(origin).map(|spec| spec.destination.as_str())
    }

    /// Origin ids in registration order.
    pub fn origin_ids(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.origin.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MigrationSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
