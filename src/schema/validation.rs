//! Accumulated validation findings
//!
//! Validator operations report problems instead of raising them: every check
//! returns a `ValidationResult` carrying zero or more field-level findings so
//! a caller can present all problems in one pass (important for a CLI
//! diagnosing a broken vault).

use serde::Serialize;
use std::fmt;

/// The constraint category a finding violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Required field missing
    Required,
    /// Array/scalar shape mismatch
    Shape,
    /// Value rejected by a property spec rule
    Spec,
    /// Structural rule on a schema or property definition
    Structure,
}

impl Constraint {
    /// Returns the constraint label used in findings output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Shape => "shape",
            Constraint::Spec => "spec",
            Constraint::Structure => "structure",
        }
    }
}

/// A single field-level validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Path of the offending field (e.g. `note.properties.title`)
    pub field: String,
    /// Violated constraint category
    pub constraint: Constraint,
    /// Human-readable description of the violation
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        constraint: Constraint,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            constraint,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': {}", self.field, self.message)
    }
}

/// Result of a validation operation: all findings, never an early abort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Creates an empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finding.
    pub fn add(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// True when no findings were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All recorded findings, in discovery order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when no findings were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Absorbs all findings from another result.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Absorbs findings from another result, prefixing each field path.
    pub fn merge_prefixed(&mut self, other: ValidationResult, prefix: &str) {
        for mut error in other.errors {
            error.field = if error.field.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}.{}", error.field)
            };
            self.errors.push(error);
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "valid");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
