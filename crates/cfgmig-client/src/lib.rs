//! # cfgmig-client
//!
//! Storage API client for cfgmig.
//!
//! [`StorageClient`] implements [`cfgmig_core::ConfigurationStore`] and
//! [`cfgmig_core::ComponentDirectory`] over the component configuration
//! endpoints of a project branch.
//!
//! # Example
//!
//! ```rust,no_run
//! use cfgmig_client::{StorageClient, StorageConfig};
//! use cfgmig_core::ConfigurationStore;
//!
//! #[tokio::main]
//! async fn main() -> cfgmig_core::Result<()> {
//!     let client = StorageClient::new(
//!         StorageConfig::new("https://connection.keboola.com", "my-token"),
//!     )?;
//!     let configs = client.list("keboola.ex-facebook").await?;
//!     println!("{} configurations", configs.len());
//!     Ok(())
//! }
//! ```

pub mod storage;

pub use storage::{StorageClient, StorageConfig};
