//! Schema type definitions for frontmatter validation
//!
//! The vocabulary every other schema component speaks:
//! - `Property`: a named frontmatter field with required/array flags and a
//!   value-validation spec, or an unresolved `$ref` into the property bank
//! - `PropertySpec`: closed set of value-level validation rules
//! - `Schema`: a named, optionally-inheriting property set
//! - `PropertyBank`: reusable property definitions addressable by key

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value-validation rule for a property.
///
/// The `type` discriminator only exists at the storage boundary; internal
/// code matches exhaustively on the variants so adding one is a
/// compile-checked change everywhere it matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertySpec {
    /// UTF-8 string with optional enum and regex pattern constraints
    String(StringSpec),
    /// Numeric value with optional min/max/step constraints
    Number(NumberSpec),
    /// Date string parsed against a chrono format (RFC 3339 by default)
    Date(DateSpec),
    /// Reference to another note in the vault
    File(FileSpec),
    /// Boolean value, no further configuration
    Bool(BoolSpec),
}

impl PropertySpec {
    /// Returns the storage discriminator for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertySpec::String(_) => "string",
            PropertySpec::Number(_) => "number",
            PropertySpec::Date(_) => "date",
            PropertySpec::File(_) => "file",
            PropertySpec::Bool(_) => "bool",
        }
    }

    /// Unconstrained string spec
    pub fn string() -> Self {
        PropertySpec::String(StringSpec::default())
    }

    /// Unconstrained number spec
    pub fn number() -> Self {
        PropertySpec::Number(NumberSpec::default())
    }

    /// RFC 3339 date spec
    pub fn date() -> Self {
        PropertySpec::Date(DateSpec::default())
    }

    /// Boolean spec
    pub fn bool() -> Self {
        PropertySpec::Bool(BoolSpec::default())
    }
}

/// String constraints: enum membership checked before pattern match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringSpec {
    /// Allowed values as a fixed list; empty means unconstrained
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Regex the value must match; must compile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Numeric constraints. Bounds are inclusive; `step == 1.0` restricts the
/// value to integers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// Date constraint: a chrono strftime format, RFC 3339 when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// File-reference constraints. A leading `^` on either pattern negates it.
/// Cross-checking against the vault index happens outside this subsystem;
/// value validation here only enforces a non-empty reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSpec {
    #[serde(rename = "fileClass", default, skip_serializing_if = "Option::is_none")]
    pub file_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// Boolean marker spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolSpec {}

/// A single frontmatter property definition.
///
/// Before resolution a property may carry a `reference` into the property
/// bank instead of a spec. After resolution `reference` is always `None`
/// and `spec` is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Frontmatter key; unique within a schema's resolved set
    pub name: String,
    /// Whether the property must be present
    #[serde(default)]
    pub required: bool,
    /// Whether the value must be a sequence rather than a scalar
    #[serde(default)]
    pub array: bool,
    /// Value-validation rule; absent only while `reference` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<PropertySpec>,
    /// Unresolved pointer into the property bank
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Property {
    /// Creates a property with an explicit spec.
    pub fn new(name: impl Into<String>, required: bool, array: bool, spec: PropertySpec) -> Self {
        Self {
            name: name.into(),
            required,
            array,
            spec: Some(spec),
            reference: None,
        }
    }

    /// Creates a required scalar property.
    pub fn required(name: impl Into<String>, spec: PropertySpec) -> Self {
        Self::new(name, true, false, spec)
    }

    /// Creates an optional scalar property.
    pub fn optional(name: impl Into<String>, spec: PropertySpec) -> Self {
        Self::new(name, false, false, spec)
    }

    /// Creates an unresolved `$ref` property pointing at a bank key.
    pub fn reference(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            array: false,
            spec: None,
            reference: Some(key.into()),
        }
    }

    /// True once the property carries a spec and no dangling `$ref`.
    pub fn is_resolved(&self) -> bool {
        self.reference.is_none() && self.spec.is_some()
    }
}

/// A named collection of properties with optional inheritance.
///
/// `resolved_properties` stays empty until the resolver produces a new copy
/// with the flattened set; originals are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique identifier; matches the note frontmatter class it governs
    pub name: String,
    /// Optional parent schema name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Inherited property names removed from the flattened set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    /// Declared properties; override inherited ones by name
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Flattened property set; populated by the resolver only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved_properties: Vec<Property>,
}

impl Schema {
    /// Creates a raw (unresolved) schema.
    pub fn new(
        name: impl Into<String>,
        extends: Option<String>,
        excludes: Vec<String>,
        properties: Vec<Property>,
    ) -> Self {
        Self {
            name: name.into(),
            extends,
            excludes,
            properties,
            resolved_properties: Vec::new(),
        }
    }

    /// Creates a root schema with no inheritance.
    pub fn root(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self::new(name, None, Vec::new(), properties)
    }

    /// True once the resolver has populated the flattened set.
    pub fn is_resolved(&self) -> bool {
        !self.resolved_properties.is_empty()
    }
}

/// A flat store of reusable property definitions addressable by key,
/// used to satisfy `$ref` substitution. Consumed read-only by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBank {
    /// Where the bank was loaded from, for diagnostics; may be empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default)]
    properties: HashMap<String, Property>,
}

impl PropertyBank {
    /// Creates an empty bank with the given source location.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            properties: HashMap::new(),
        }
    }

    /// Adds a reusable property definition under `key`.
    /// Duplicate keys are rejected so one entry cannot silently shadow another.
    pub fn insert(&mut self, key: impl Into<String>, property: Property) -> Result<(), String> {
        let key = key.into();
        if self.properties.contains_key(&key) {
            return Err(format!("duplicate property bank key '{key}'"));
        }
        self.properties.insert(key, property);
        Ok(())
    }

    /// Looks up a bank entry by key.
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Checks whether a key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Number of entries in the bank.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True when the bank holds no entries.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates over `(key, property)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Property)> {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_type_names() {
        assert_eq!(PropertySpec::string().type_name(), "string");
        assert_eq!(PropertySpec::number().type_name(), "number");
        assert_eq!(PropertySpec::date().type_name(), "date");
        assert_eq!(PropertySpec::File(FileSpec::default()).type_name(), "file");
        assert_eq!(PropertySpec::bool().type_name(), "bool");
    }

    #[test]
    fn property_resolution_state() {
        let declared = Property::required("title", PropertySpec::string());
        assert!(declared.is_resolved());

        let referenced = Property::reference("title", "standard_title");
        assert!(!referenced.is_resolved());
        assert_eq!(referenced.reference.as_deref(), Some("standard_title"));
        assert!(referenced.spec.is_none());
    }

    #[test]
    fn bank_rejects_duplicate_keys() {
        let mut bank = PropertyBank::new("schemas/properties.json");
        bank.insert("title", Property::required("title", PropertySpec::string()))
            .unwrap();
        let err = bank
            .insert("title", Property::optional("title", PropertySpec::string()))
            .unwrap_err();
        assert!(err.contains("title"));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn bank_lookup() {
        let mut bank = PropertyBank::new("schemas/properties.json");
        bank.insert("iso_date", Property::optional("date", PropertySpec::date()))
            .unwrap();
        assert!(bank.contains("iso_date"));
        assert!(!bank.contains("missing"));
        assert_eq!(bank.get("iso_date").unwrap().name, "date");
    }

    #[test]
    fn schema_starts_unresolved() {
        let schema =
            Schema::root("note", vec![Property::required("title", PropertySpec::string())]);
        assert!(!schema.is_resolved());
        assert!(schema.resolved_properties.is_empty());
    }

    #[test]
    fn property_serialization_keeps_discriminator() {
        let prop = Property::required(
            "status",
            PropertySpec::String(StringSpec {
                enum_values: vec!["open".into(), "done".into()],
                pattern: None,
            }),
        );
        let value = serde_json::to_value(&prop).unwrap();
        assert_eq!(value["spec"]["type"], "string");
        assert_eq!(value["spec"]["enum"][0], "open");
        assert!(value.get("$ref").is_none());

        let back: Property = serde_json::from_value(value).unwrap();
        assert_eq!(back, prop);
    }
}
