//! Error types for equiptrack.
//!
//! The record store itself never fails. Everything around it does: forms
//! reject drafts with missing fields, the session gate rejects empty
//! credentials, and local storage and configuration can fail to load.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for equiptrack operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Form Errors ===
    /// A required field was left empty when the form was submitted.
    #[error("{form}: please fill out the '{field}' field")]
    MissingField {
        /// Name of the form being submitted.
        form: &'static str,
        /// Identifier of the first empty required field.
        field: &'static str,
    },

    /// The form has no field with this identifier.
    #[error("{form}: unknown field '{field}'")]
    UnknownField {
        /// Name of the form.
        form: &'static str,
        /// The field identifier that was given.
        field: String,
    },

    /// A choice field was given a value outside its options.
    #[error("invalid value '{value}' for '{field}' (expected one of: {allowed})")]
    InvalidChoice {
        /// Identifier of the choice field.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Comma separated list of accepted values.
        allowed: String,
    },

    /// A form command was issued from a view that has no form.
    #[error("the {view} view has no entry form")]
    NoActiveForm {
        /// Name of the current view.
        view: &'static str,
    },

    // === Navigation Errors ===
    /// A table selector did not name any known table.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A route or view name did not match any view.
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// A shell command was malformed.
    #[error("usage: {0}")]
    Usage(String),

    // === Session Errors ===
    /// Login, signup or password reset was attempted with empty fields.
    #[error("{message}")]
    MissingCredentials {
        /// User-facing description.
        message: String,
    },

    /// Signup password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    // === Storage Errors ===
    /// Failed to open or create the local storage database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for equiptrack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a missing credentials error with a user-facing message.
    #[must_use]
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::MissingCredentials {
            message: message.into(),
        }
    }

    /// Check if this error is something the user can correct at the prompt.
    ///
    /// These are reported as destructive notifications rather than
    /// aborting the session.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::UnknownField { .. }
                | Self::InvalidChoice { .. }
                | Self::NoActiveForm { .. }
                | Self::UnknownTable(_)
                | Self::UnknownView(_)
                | Self::Usage(_)
                | Self::MissingCredentials { .. }
                | Self::PasswordMismatch
        )
    }
}
