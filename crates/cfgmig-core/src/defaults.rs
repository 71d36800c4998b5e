//! Centralized default constants for cfgmig.
//!
//! Payload key names, sentinels and client defaults live here so the codec,
//! the transformers and the Storage API client agree on them.

// =============================================================================
// PAYLOAD LAYOUT
// =============================================================================

/// Payload section holding runtime (non-user) data.
pub const RUNTIME_KEY: &str = "runtime";

/// Field inside the runtime section that stores the migration marker.
pub const MIGRATION_STATUS_KEY: &str = "migrationStatus";

/// Payload section holding component parameters.
pub const PARAMETERS_KEY: &str = "parameters";

/// Payload section holding OAuth credentials. Never copied to a destination.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Parameter key receiving the generated bucket identifier.
pub const BUCKET_ID_KEY: &str = "bucket-id";

/// Prefix of generated bucket identifiers (input stage, `c-` bucket).
pub const BUCKET_ID_PREFIX: &str = "in.c-";

// =============================================================================
// STATUS MARKERS
// =============================================================================

/// Marker written after a successful migration.
pub const STATUS_SUCCESS: &str = "success";

/// Prefix of the marker written after a failed migration.
pub const STATUS_ERROR_PREFIX: &str = "error: ";

/// Reported when a record carries no migration marker.
pub const STATUS_NOT_AVAILABLE: &str = "n/a";

// =============================================================================
// STORAGE API
// =============================================================================

/// Development branch used when none is configured.
pub const BRANCH_ID: &str = "default";

/// Header carrying the Storage API token.
pub const TOKEN_HEADER: &str = "X-StorageApi-Token";

/// Per-request timeout for Storage API calls (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// CLI
// =============================================================================

/// Data directory searched for `config.json` when `KBC_DATADIR` is unset.
pub const DATA_DIR: &str = "data";

/// Name of the run configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";
