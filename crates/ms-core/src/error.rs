//! Error types for ms-core

use thiserror::Error;

/// Core error type for migrasync
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Project directory not found
    #[error("[E003] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E004: Migration file could not be parsed
    #[error("[E004] Failed to parse migration file {path}: {details}")]
    MigrationParseError { path: String, details: String },

    /// E005: Migration file is structurally valid but semantically wrong
    #[error("[E005] Invalid migration '{id}' in {path}: {reason}")]
    MigrationInvalid {
        id: String,
        path: String,
        reason: String,
    },

    /// E006: Two migration files declare the same id
    #[error("[E006] Duplicate migration id '{id}' in {path1} and {path2}")]
    DuplicateMigration {
        id: String,
        path1: String,
        path2: String,
    },

    /// E007: IO error
    #[error("[E007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E008: IO error with file path context
    #[error("[E008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E009: YAML parse error
    #[error("[E009] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
