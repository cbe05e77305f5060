//! Schema subsystem error types
//!
//! Error taxonomy:
//! - structural: definitions fail static shape rules (accumulated findings)
//! - reference: a `$ref` target is absent from the property bank
//! - cyclic: the inheritance graph contains a cycle
//! - storage: the loader cannot produce raw data
//! - registration: the registry rejects the resolved set
//!
//! Resolution errors (cyclic, reference) are fail-fast; structural findings
//! are accumulated so a user sees every problem in one pass. Engine-level
//! errors wrap the stage error with a stage-identifying label.

use thiserror::Error;

use super::validation::ValidationResult;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors produced inside the schema pipeline.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema or property definitions failed structural validation.
    /// Carries every finding, not just the first.
    #[error("invalid schema definitions: {0}")]
    Structural(ValidationResult),

    /// The inheritance graph contains a cycle. The message names every
    /// schema on the cycle path.
    #[error("schema '{schema}': circular inheritance: {cycle}")]
    CircularInheritance {
        /// Schema at which the cycle was detected
        schema: String,
        /// Full cycle path, e.g. `a → b → c → a`
        cycle: String,
    },

    /// A `$ref` points at a key absent from the property bank.
    #[error(
        "schema '{schema}', property '{property}': $ref '{key}' not found in \
         property bank; add '{key}' to the property bank or fix the $ref"
    )]
    UnresolvedReference {
        schema: String,
        property: String,
        key: String,
    },

    /// Two schema files declare the same schema name.
    #[error("duplicate schema name '{name}' in {path}")]
    DuplicateSchema { name: String, path: String },

    /// Two bank entries share a key.
    #[error("duplicate property bank key '{key}' in {path}")]
    DuplicateBankKey { key: String, path: String },

    /// The loader could not read or parse raw definitions.
    #[error("{path}: {reason}")]
    Storage { path: String, reason: String },

    /// The registry rejected the resolved set.
    #[error("registry rejected resolved set: {0}")]
    Registration(String),

    /// Point lookup missed: no schema registered under this name.
    #[error("schema '{0}' not found in registry")]
    SchemaNotFound(String),

    /// Point lookup missed: no property registered under this name.
    #[error("property '{0}' not found in registry")]
    PropertyNotFound(String),

    /// The operation observed its cancellation signal and aborted.
    #[error("operation cancelled")]
    Cancelled,
}

impl SchemaError {
    /// Builds a storage error for a path, with a reason.
    pub fn storage(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Storage {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Engine-level errors: each pipeline stage failure is wrapped with a
/// stage-identifying message so operators can tell which phase failed
/// without inspecting stack traces.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("schema loading failed: {0}")]
    Load(#[source] SchemaError),

    #[error("schema validation failed: {0}")]
    Validation(#[source] SchemaError),

    #[error("schema resolution failed: {0}")]
    Resolution(#[source] SchemaError),

    #[error("schema registration failed: {0}")]
    Registration(#[source] SchemaError),

    /// The pipeline observed its cancellation signal between stages.
    #[error("schema pipeline cancelled")]
    Cancelled,
}
