//! Structural and value validation for schemas, properties, and banks
//!
//! Structural validation rejects definitions before resolution is attempted;
//! value validation checks candidate frontmatter values against resolved
//! properties. All operations are pure and accumulate every finding into a
//! `ValidationResult` instead of stopping at the first one.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::types::{
    DateSpec, FileSpec, NumberSpec, Property, PropertyBank, PropertySpec, Schema, StringSpec,
};
use super::validation::{Constraint, FieldError, ValidationResult};

/// Identifier pattern shared by schema and property names.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("identifier regex"));

/// Pure, stateless validator for the schema subsystem.
#[derive(Debug, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        SchemaValidator
    }

    /// Checks the structural integrity of a schema definition.
    ///
    /// Rules: name non-empty and identifier-shaped; `extends` must not equal
    /// `name`; `excludes` only meaningful with `extends` and free of
    /// duplicates; declared property names unique; each declared property
    /// structurally valid. Every violation is recorded.
    pub fn validate_schema(&self, schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !is_identifier(&schema.name) {
            result.add(FieldError::new(
                "name",
                Constraint::Structure,
                format!(
                    "schema name '{}' must be a non-empty identifier (letters, digits, '_', '-')",
                    schema.name
                ),
            ));
        }

        if let Some(parent) = &schema.extends {
            if parent == &schema.name {
                result.add(FieldError::new(
                    "extends",
                    Constraint::Structure,
                    format!("schema '{}' cannot extend itself", schema.name),
                ));
            }
        } else if !schema.excludes.is_empty() {
            result.add(FieldError::new(
                "excludes",
                Constraint::Structure,
                "excludes is only allowed when extends is set",
            ));
        }

        let mut seen_excludes = std::collections::HashSet::new();
        for name in &schema.excludes {
            if !seen_excludes.insert(name.as_str()) {
                result.add(FieldError::new(
                    "excludes",
                    Constraint::Structure,
                    format!("duplicate exclude entry '{name}'"),
                ));
            }
        }

        let mut seen_properties = std::collections::HashSet::new();
        for property in &schema.properties {
            if !seen_properties.insert(property.name.as_str()) {
                result.add(FieldError::new(
                    "properties",
                    Constraint::Structure,
                    format!("duplicate property name '{}'", property.name),
                ));
                continue;
            }
            result.merge_prefixed(
                self.validate_property(property),
                &format!("properties.{}", property.name),
            );
        }

        result
    }

    /// Checks the structural integrity of a single property definition:
    /// identifier-shaped name, and either a spec or a `$ref` present.
    /// When a spec is present its own constraint definition is checked too.
    pub fn validate_property(&self, property: &Property) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !is_identifier(&property.name) {
            result.add(FieldError::new(
                "name",
                Constraint::Structure,
                format!(
                    "property name '{}' must be a non-empty identifier (letters, digits, '_', '-')",
                    property.name
                ),
            ));
        }

        match (&property.spec, &property.reference) {
            (None, None) => result.add(FieldError::new(
                "spec",
                Constraint::Structure,
                "property must define a spec or a $ref",
            )),
            (Some(spec), _) => check_spec_definition(spec, &mut result),
            (None, Some(_)) => {}
        }

        result
    }

    /// Structural check for a property bank. Deliberately lenient: bank
    /// entries are not individually validated here; a broken entry only
    /// surfaces when a `$ref` pulls it in or a value is checked against it.
    pub fn validate_property_bank(&self, _bank: &PropertyBank) -> ValidationResult {
        ValidationResult::new()
    }

    /// Validates a candidate frontmatter value against a resolved property.
    ///
    /// The array/scalar shape is enforced first (a mismatch is a single
    /// finding); a property without a spec at this stage is always an error.
    pub fn validate_property_value(&self, property: &Property, value: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();

        let is_sequence = value.is_array();
        if property.array && !is_sequence {
            result.add(FieldError::new(
                &property.name,
                Constraint::Shape,
                "must be an array",
            ));
            return result;
        }
        if !property.array && is_sequence {
            result.add(FieldError::new(
                &property.name,
                Constraint::Shape,
                "must be a scalar, not an array",
            ));
            return result;
        }

        let Some(spec) = &property.spec else {
            result.add(FieldError::new(
                &property.name,
                Constraint::Structure,
                "property has no resolved spec",
            ));
            return result;
        };

        if let Some(elements) = value.as_array() {
            for (i, element) in elements.iter().enumerate() {
                check_value(spec, &format!("{}[{i}]", property.name), element, &mut result);
            }
        } else {
            check_value(spec, &property.name, value, &mut result);
        }

        result
    }
}

/// True when `name` is non-empty and matches the identifier pattern.
fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Checks the constraint definition carried by a spec (not a value).
fn check_spec_definition(spec: &PropertySpec, result: &mut ValidationResult) {
    match spec {
        PropertySpec::String(s) => {
            if let Some(pattern) = &s.pattern {
                if Regex::new(pattern).is_err() {
                    result.add(FieldError::new(
                        "spec.pattern",
                        Constraint::Structure,
                        format!("invalid regex pattern '{pattern}'"),
                    ));
                }
            }
        }
        PropertySpec::Number(n) => {
            if let (Some(min), Some(max)) = (n.min, n.max) {
                if min > max {
                    result.add(FieldError::new(
                        "spec.min",
                        Constraint::Structure,
                        format!("min ({min}) cannot be greater than max ({max})"),
                    ));
                }
            }
            if let Some(step) = n.step {
                if step <= 0.0 {
                    result.add(FieldError::new(
                        "spec.step",
                        Constraint::Structure,
                        format!("step must be positive, got {step}"),
                    ));
                }
            }
        }
        PropertySpec::Date(d) => {
            if let Some(format) = &d.format {
                if !is_valid_date_format(format) {
                    result.add(FieldError::new(
                        "spec.format",
                        Constraint::Structure,
                        format!("invalid date format '{format}'"),
                    ));
                }
            }
        }
        PropertySpec::File(f) => {
            check_file_pattern("spec.fileClass", f.file_class.as_deref(), result);
            check_file_pattern("spec.directory", f.directory.as_deref(), result);
        }
        PropertySpec::Bool(_) => {}
    }
}

/// File class/directory constraints are regexes, optionally negated with a
/// leading `^` marker which is stripped before compiling.
fn check_file_pattern(field: &str, pattern: Option<&str>, result: &mut ValidationResult) {
    let Some(pattern) = pattern else { return };
    let stripped = pattern.strip_prefix('^').unwrap_or(pattern);
    if Regex::new(stripped).is_err() {
        result.add(FieldError::new(
            field,
            Constraint::Structure,
            format!("invalid pattern '{pattern}'"),
        ));
    }
}

/// A format is usable when chrono can parse it into items without errors.
fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Dispatches a scalar candidate value to its spec variant's rules.
fn check_value(spec: &PropertySpec, field: &str, value: &Value, result: &mut ValidationResult) {
    match spec {
        PropertySpec::String(s) => check_string(s, field, value, result),
        PropertySpec::Number(n) => check_number(n, field, value, result),
        PropertySpec::Date(d) => check_date(d, field, value, result),
        PropertySpec::File(f) => check_file(f, field, value, result),
        PropertySpec::Bool(_) => {
            if !value.is_boolean() {
                result.add(FieldError::new(field, Constraint::Spec, "must be a boolean"));
            }
        }
    }
}

fn check_string(spec: &StringSpec, field: &str, value: &Value, result: &mut ValidationResult) {
    let Some(text) = value.as_str() else {
        result.add(FieldError::new(field, Constraint::Spec, "must be a string"));
        return;
    };

    // Enum membership is checked before the pattern.
    if !spec.enum_values.is_empty() && !spec.enum_values.iter().any(|v| v == text) {
        result.add(FieldError::new(
            field,
            Constraint::Spec,
            format!("must be one of: {}", spec.enum_values.join(", ")),
        ));
        return;
    }

    if let Some(pattern) = &spec.pattern {
        match Regex::new(pattern) {
            Ok(regex) => {
                if !regex.is_match(text) {
                    result.add(FieldError::new(
                        field,
                        Constraint::Spec,
                        format!("must match pattern: {pattern}"),
                    ));
                }
            }
            Err(_) => result.add(FieldError::new(
                field,
                Constraint::Spec,
                format!("invalid regex pattern '{pattern}'"),
            )),
        }
    }
}

fn check_number(spec: &NumberSpec, field: &str, value: &Value, result: &mut ValidationResult) {
    let Some(number) = value.as_f64() else {
        result.add(FieldError::new(field, Constraint::Spec, "must be a number"));
        return;
    };

    if let Some(min) = spec.min {
        if number < min {
            result.add(FieldError::new(
                field,
                Constraint::Spec,
                format!("must be >= {min}"),
            ));
            return;
        }
    }
    if let Some(max) = spec.max {
        if number > max {
            result.add(FieldError::new(
                field,
                Constraint::Spec,
                format!("must be <= {max}"),
            ));
            return;
        }
    }
    // step == 1.0 restricts the value to integers.
    if spec.step == Some(1.0) && number.fract() != 0.0 {
        result.add(FieldError::new(field, Constraint::Spec, "must be an integer"));
    }
}

fn check_date(spec: &DateSpec, field: &str, value: &Value, result: &mut ValidationResult) {
    let Some(text) = value.as_str() else {
        result.add(FieldError::new(field, Constraint::Spec, "must be a date string"));
        return;
    };

    let parsed = match &spec.format {
        None => DateTime::parse_from_rfc3339(text).is_ok(),
        Some(format) => {
            DateTime::parse_from_str(text, format).is_ok()
                || NaiveDateTime::parse_from_str(text, format).is_ok()
                || NaiveDate::parse_from_str(text, format).is_ok()
        }
    };

    if !parsed {
        let format = spec.format.as_deref().unwrap_or("RFC 3339");
        result.add(FieldError::new(
            field,
            Constraint::Spec,
            format!("must be a valid date in format: {format}"),
        ));
    }
}

fn check_file(_spec: &FileSpec, field: &str, value: &Value, result: &mut ValidationResult) {
    let Some(text) = value.as_str() else {
        result.add(FieldError::new(field, Constraint::Spec, "must be a file reference"));
        return;
    };
    if text.is_empty() {
        result.add(FieldError::new(field, Constraint::Spec, "cannot be empty"));
    }
}
