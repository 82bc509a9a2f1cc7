//! Application-wide constants

/// Application display name
pub const APP_NAME: &str = "OpsDeck";

/// Lowercase application name (log targets, paths)
pub const APP_NAME_LOWER: &str = "opsdeck";

/// Dot-folder name used as a local data fallback
pub const APP_DOT_FOLDER: &str = ".opsdeck";

/// Config file name searched in the profile and working directories
pub const CONFIG_FILE_NAME: &str = "opsdeck.json";

// =============================================================================
// Environment variables
// =============================================================================

pub const ENV_LOG: &str = "OPSDECK_LOG";
pub const ENV_HOST: &str = "OPSDECK_HOST";
pub const ENV_PORT: &str = "OPSDECK_PORT";
pub const ENV_CONFIG: &str = "OPSDECK_CONFIG";
pub const ENV_DATA_DIR: &str = "OPSDECK_DATA_DIR";
pub const ENV_PRESENCE_STALE_SECS: &str = "OPSDECK_PRESENCE_STALE_SECS";

// =============================================================================
// Server defaults
// =============================================================================

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5470;

/// Maximum request body size for JSON APIs
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Smaller body limit for auth endpoints
pub const AUTH_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Sessions & auth
// =============================================================================

pub const SESSION_COOKIE_NAME: &str = "opsdeck_session";

pub const DEFAULT_SESSION_TTL_DAYS: u32 = 30;

/// One-time code length (digits)
pub const OTP_CODE_DIGITS: u32 = 6;

/// One-time codes expire after this many seconds
pub const OTP_TTL_SECS: i64 = 300;

/// File in the data directory holding the JWT signing key (hex)
pub const SIGNING_KEY_FILENAME: &str = "session.key";

// =============================================================================
// Presence
// =============================================================================

/// Members with no heartbeat for this long are swept to offline
pub const PRESENCE_STALE_SECS: i64 = 300;

/// Expected client heartbeat interval (informational, drives the stale window)
pub const HEARTBEAT_INTERVAL_SECS: u64 = 60;

// =============================================================================
// SQLite
// =============================================================================

pub const SQLITE_DB_FILENAME: &str = "opsdeck.db";

pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// Negative value = KiB of page cache
pub const SQLITE_CACHE_SIZE: &str = "-64000";

pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Shutdown
// =============================================================================

pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Seed data
// =============================================================================

/// Team member seeded by the initial schema
pub const DEFAULT_MEMBER_ID: &str = "admin";
