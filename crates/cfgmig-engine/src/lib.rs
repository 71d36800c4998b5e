//! # cfgmig-engine
//!
//! Migration orchestration for cfgmig.
//!
//! This crate provides:
//! - [`MigrationEngine::execute`]: idempotent, resumable migration of every
//!   configuration of an origin component to a destination component
//! - [`MigrationEngine::status`]: read-only per-record status listing
//! - [`supported_migrations`]: registry listing with component names
//! - In-memory store and directory for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cfgmig_core::{ConfigurationStore, MigrationRegistry};
//! use cfgmig_engine::{EngineConfig, MigrationEngine};
//!
//! async fn migrate(store: Arc<dyn ConfigurationStore>) -> cfgmig_core::Result<()> {
//!     let engine = MigrationEngine::new(store, MigrationRegistry::builtin(), EngineConfig::default());
//!     let report = engine
//!         .execute("keboola.ex-facebook", "keboola.ex-facebook-pages")
//!         .await?;
//!     println!("migrated {} of {}", report.summary.migrated, report.summary.total);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod engine;
mod reporter;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use catalog::supported_migrations;
pub use engine::{EngineConfig, FailurePolicy, MigrationEngine};
