//! Error types for dbu-core

use thiserror::Error;

/// Core error type for dbu
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Product config file does not exist
    #[error("[C001] Config path {path} doesn't exist, stop db upgrade")]
    ConfigMissing { path: String },

    /// C002: A database section exists but is incomplete or malformed
    #[error("[C002] Database config in {path} is invalid: {reason}")]
    InvalidConfig { path: String, reason: String },

    /// C003: Engine name recognized but not supported by the upgrader
    #[error("[C003] {subsystem} uses unsupported database engine '{engine}' (configured in {path})")]
    UnsupportedBackend {
        subsystem: String,
        engine: String,
        path: String,
    },

    /// C004: Subsystems disagree on the database backend
    #[error("[C004] Subsystems are configured for different databases:\n{details}")]
    InconsistentBackend { details: String },

    /// C005: Required environment setting is absent
    #[error("[C005] {name} is not set: {reason}")]
    MissingEnvironment { name: String, reason: String },

    /// C006: Target version string cannot be parsed
    #[error("[C006] Invalid server version '{version}': expected dotted numbers such as 5.0.0 with an optional suffix such as -beta")]
    InvalidVersion { version: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
