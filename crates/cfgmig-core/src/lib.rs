//! # cfgmig-core
//!
//! Core types, traits, and the migration status protocol for cfgmig.
//!
//! This crate provides the configuration record model, the store contracts
//! the engine depends on, the status codec, the per-record transformers and
//! the registry of supported migrations.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod status;
pub mod traits;
pub mod transform;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use registry::{MigrationRegistry, MigrationSpec};
pub use status::{current_status, is_migrated, status_update_request, with_status};
pub use traits::*;
pub use transform::{bucket_id, Transformer};
