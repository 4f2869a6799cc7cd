//! Structured logging schema and field name constants for lingodir.
//!
//! All crates use these names for structured `tracing` fields so that log
//! aggregation can query the same keys across subsystems. The `tracing`
//! macros take field names as identifiers, so call sites spell them out
//! (`subsystem = "directory"`, `op = "create"`); this module is the list
//! they are written against.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (duplicate rejected, skipped import row) |
//! | INFO  | Lifecycle events (startup, shutdown), completed mutations |
//! | DEBUG | Decision points (existing vs. new entity), config choices |
//! | TRACE | Per-item iteration (name rows, link rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "directory", "database", "import"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "service", "pool", "memory_store", "pg_store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "get", "add_tags", "delete_tag"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Company surrogate id.
pub const COMPANY_ID: &str = "company_id";

/// Tag surrogate id.
pub const TAG_ID: &str = "tag_id";

/// Requested language code.
pub const LANG: &str = "lang";

/// Free-text query (autocomplete, tag search).
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of company-tag links created by an operation.
pub const LINKS_CREATED: &str = "links_created";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Whether the operation created a new entity.
pub const CREATED: &str = "created";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
