//! Structured logging field name constants for cfgmig.
//!
//! All crates use these constants for structured `tracing` fields so log
//! aggregation can query a run by the same names everywhere.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | A record failed to migrate, run is about to abort |
//! | WARN  | Recoverable issue (status write-back failed, label fallback) |
//! | INFO  | Run start/finish, per-record outcomes |
//! | DEBUG | Decision points (transformer chosen, authorization stripped) |
//! | TRACE | Raw request/response details |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Identifier of one `execute`/`status` invocation. Format: UUIDv7.
pub const RUN_ID: &str = "run_id";

/// Subsystem originating the log event.
/// Values: "engine", "client", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "execute", "status", "list", "create", "update"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Component the records are migrated from.
pub const ORIGIN_ID: &str = "origin_id";

/// Component the records are migrated to.
pub const DESTINATION_ID: &str = "destination_id";

/// Configuration record identifier.
pub const CONFIG_ID: &str = "config_id";

/// Configuration record display name.
pub const CONFIG_NAME: &str = "config_name";

/// Transformer variant applied to records.
pub const TRANSFORMER: &str = "transformer";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned by a list call.
pub const RECORD_COUNT: &str = "record_count";

/// HTTP status code returned by the Storage API.
pub const HTTP_STATUS: &str = "http_status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
