//! Filesystem schema source
//!
//! Reads one schema per `.json` file from a schemas directory plus a single
//! property bank file. Raw files use an explicit wire shape (properties as a
//! keyed object, specs discriminated by a `type` field) that is decoded into
//! the domain types here, at the storage boundary. Files are visited in
//! sorted path order so loads are deterministic.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::errors::{SchemaError, SchemaResult};
use super::ports::SchemaSource;
use super::types::{
    BoolSpec, DateSpec, FileSpec, NumberSpec, Property, PropertyBank, PropertySpec, Schema,
    StringSpec,
};

/// Wire shape of a schema file.
#[derive(Debug, Deserialize)]
struct RawSchema {
    name: String,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    excludes: Vec<String>,
    /// Keyed by property name; decoded through a BTreeMap so declared order
    /// is name-sorted and stable.
    #[serde(default)]
    properties: BTreeMap<String, RawProperty>,
}

/// Wire shape of a property: either a `$ref` or a typed definition.
#[derive(Debug, Deserialize)]
struct RawProperty {
    #[serde(rename = "$ref", default)]
    reference: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    array: bool,
    #[serde(default)]
    spec: Value,
}

/// Wire shape of the property bank file.
#[derive(Debug, Deserialize)]
struct RawBank {
    #[serde(default)]
    properties: HashMap<String, RawProperty>,
}

/// Loads schemas and the property bank from a vault's filesystem layout.
pub struct FsSchemaLoader {
    schemas_dir: PathBuf,
    bank_path: PathBuf,
}

impl FsSchemaLoader {
    pub fn new(schemas_dir: impl Into<PathBuf>, bank_path: impl Into<PathBuf>) -> Self {
        Self {
            schemas_dir: schemas_dir.into(),
            bank_path: bank_path.into(),
        }
    }

    fn load_schemas(&self, cancel: &CancellationToken) -> SchemaResult<Vec<Schema>> {
        let dir = &self.schemas_dir;
        let entries = fs::read_dir(dir)
            .map_err(|e| SchemaError::storage(dir.display().to_string(), e.to_string()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file() && path.extension().map_or(false, |ext| ext == "json")
            })
            // The bank file may live inside the schemas directory.
            .filter(|path| path != &self.bank_path)
            .collect();
        paths.sort();

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut schemas = Vec::with_capacity(paths.len());
        for path in paths {
            if cancel.is_cancelled() {
                return Err(SchemaError::Cancelled);
            }
            let schema = read_schema_file(&path)?;
            if let Some(first) = seen.insert(schema.name.clone(), path.clone()) {
                return Err(SchemaError::DuplicateSchema {
                    name: schema.name,
                    path: format!("{} and {}", first.display(), path.display()),
                });
            }
            schemas.push(schema);
        }
        Ok(schemas)
    }

    fn load_bank(&self) -> SchemaResult<PropertyBank> {
        let path = &self.bank_path;
        // A vault without a bank file simply has no reusable properties.
        if !path.exists() {
            return Ok(PropertyBank::new(path.display().to_string()));
        }

        let text = fs::read_to_string(path)
            .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))?;
        let raw: RawBank = serde_json::from_str(&text)
            .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))?;

        let mut bank = PropertyBank::new(path.display().to_string());
        let mut entries: Vec<(String, RawProperty)> = raw.properties.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (key, raw_property) in entries {
            let property = decode_property(path, key.clone(), raw_property)?;
            bank.insert(&key, property)
                .map_err(|_| SchemaError::DuplicateBankKey {
                    key: key.clone(),
                    path: path.display().to_string(),
                })?;
        }
        Ok(bank)
    }
}

impl SchemaSource for FsSchemaLoader {
    fn load(&self, cancel: &CancellationToken) -> SchemaResult<(Vec<Schema>, PropertyBank)> {
        let schemas = self.load_schemas(cancel)?;
        if cancel.is_cancelled() {
            return Err(SchemaError::Cancelled);
        }
        let bank = self.load_bank()?;
        Ok((schemas, bank))
    }
}

fn read_schema_file(path: &Path) -> SchemaResult<Schema> {
    let text = fs::read_to_string(path)
        .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))?;
    let raw: RawSchema = serde_json::from_str(&text)
        .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))?;

    let extends = raw.extends.filter(|p| !p.is_empty());
    let mut properties = Vec::with_capacity(raw.properties.len());
    for (name, raw_property) in raw.properties {
        properties.push(decode_property(path, name, raw_property)?);
    }

    Ok(Schema::new(raw.name, extends, raw.excludes, properties))
}

/// Decodes a raw property into the domain type. A `$ref` entry carries no
/// spec; a typed entry must name a known discriminator.
fn decode_property(path: &Path, name: String, raw: RawProperty) -> SchemaResult<Property> {
    if let Some(reference) = raw.reference {
        return Ok(Property {
            name,
            required: raw.required,
            array: raw.array,
            spec: None,
            reference: Some(reference),
        });
    }

    let kind = raw.kind.unwrap_or_default();
    let spec_value = match raw.spec {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    let spec = decode_spec(&kind, spec_value).map_err(|reason| {
        SchemaError::storage(
            path.display().to_string(),
            format!("property '{name}': {reason}"),
        )
    })?;

    Ok(Property {
        name,
        required: raw.required,
        array: raw.array,
        spec: Some(spec),
        reference: None,
    })
}

fn decode_spec(kind: &str, value: Value) -> Result<PropertySpec, String> {
    let decode_err = |e: serde_json::Error| format!("invalid {kind} spec: {e}");
    match kind {
        "string" => serde_json::from_value::<StringSpec>(value)
            .map(PropertySpec::String)
            .map_err(decode_err),
        "number" => serde_json::from_value::<NumberSpec>(value)
            .map(PropertySpec::Number)
            .map_err(decode_err),
        "date" => serde_json::from_value::<DateSpec>(value)
            .map(PropertySpec::Date)
            .map_err(decode_err),
        "file" => serde_json::from_value::<FileSpec>(value)
            .map(PropertySpec::File)
            .map_err(decode_err),
        "bool" => serde_json::from_value::<BoolSpec>(value)
            .map(PropertySpec::Bool)
            .map_err(decode_err),
        "" => Err("missing property type".to_string()),
        other => Err(format!("unknown property type '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn loader(dir: &TempDir) -> FsSchemaLoader {
        FsSchemaLoader::new(dir.path(), dir.path().join("properties.json"))
    }

    #[test]
    fn loads_schema_files_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "b.json",
            r#"{"name": "b", "properties": {"title": {"type": "string", "required": true}}}"#,
        );
        write(&dir, "a.json", r#"{"name": "a"}"#);
        write(&dir, "notes.txt", "not a schema");

        let (schemas, _) = loader(&dir).load(&CancellationToken::new()).unwrap();
        let names: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(schemas[1].properties[0].required);
    }

    #[test]
    fn bank_file_inside_schemas_dir_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "note.json", r#"{"name": "note"}"#);
        write(
            &dir,
            "properties.json",
            r#"{"properties": {"std_title": {"type": "string", "required": true}}}"#,
        );

        let (schemas, bank) = loader(&dir).load(&CancellationToken::new()).unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(bank.len(), 1);
        assert!(bank.contains("std_title"));
        assert_eq!(bank.get("std_title").unwrap().name, "std_title");
    }

    #[test]
    fn missing_bank_file_yields_empty_bank() {
        let dir = TempDir::new().unwrap();
        write(&dir, "note.json", r#"{"name": "note"}"#);

        let (_, bank) = loader(&dir).load(&CancellationToken::new()).unwrap();
        assert!(bank.is_empty());
    }

    #[test]
    fn ref_properties_decode_without_spec() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "note.json",
            r#"{"name": "note", "properties": {"created": {"$ref": "std_date"}}}"#,
        );

        let (schemas, _) = loader(&dir).load(&CancellationToken::new()).unwrap();
        let created = &schemas[0].properties[0];
        assert_eq!(created.reference.as_deref(), Some("std_date"));
        assert!(created.spec.is_none());
    }

    #[test]
    fn spec_constraints_decode() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "task.json",
            r#"{
                "name": "task",
                "properties": {
                    "priority": {
                        "type": "number",
                        "required": true,
                        "spec": {"min": 1, "max": 5, "step": 1}
                    },
                    "status": {
                        "type": "string",
                        "spec": {"enum": ["open", "done"]}
                    }
                }
            }"#,
        );

        let (schemas, _) = loader(&dir).load(&CancellationToken::new()).unwrap();
        let task = &schemas[0];
        let priority = task.properties.iter().find(|p| p.name == "priority").unwrap();
        match priority.spec.as_ref().unwrap() {
            PropertySpec::Number(n) => {
                assert_eq!(n.min, Some(1.0));
                assert_eq!(n.max, Some(5.0));
                assert_eq!(n.step, Some(1.0));
            }
            other => panic!("expected number spec, got {}", other.type_name()),
        }
    }

    #[test]
    fn unknown_type_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "bad.json",
            r#"{"name": "bad", "properties": {"x": {"type": "timestamp"}}}"#,
        );

        let err = loader(&dir).load(&CancellationToken::new()).unwrap_err();
        match err {
            SchemaError::Storage { reason, .. } => {
                assert!(reason.contains("unknown property type 'timestamp'"));
            }
            other => panic!("expected storage error, got {other}"),
        }
    }

    #[test]
    fn malformed_json_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "bad.json", "{not json");

        assert!(matches!(
            loader(&dir).load(&CancellationToken::new()),
            Err(SchemaError::Storage { .. })
        ));
    }

    #[test]
    fn duplicate_schema_names_across_files_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", r#"{"name": "note"}"#);
        write(&dir, "b.json", r#"{"name": "note"}"#);

        let err = loader(&dir).load(&CancellationToken::new()).unwrap_err();
        match err {
            SchemaError::DuplicateSchema { name, path } => {
                assert_eq!(name, "note");
                assert!(path.contains("a.json") && path.contains("b.json"));
            }
            other => panic!("expected duplicate schema error, got {other}"),
        }
    }

    #[test]
    fn empty_extends_is_treated_as_root() {
        let dir = TempDir::new().unwrap();
        write(&dir, "note.json", r#"{"name": "note", "extends": ""}"#);

        let (schemas, _) = loader(&dir).load(&CancellationToken::new()).unwrap();
        assert!(schemas[0].extends.is_none());
    }

    #[test]
    fn missing_schemas_dir_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let loader = FsSchemaLoader::new(
            dir.path().join("absent"),
            dir.path().join("properties.json"),
        );
        assert!(matches!(
            loader.load(&CancellationToken::new()),
            Err(SchemaError::Storage { .. })
        ));
    }

    #[test]
    fn cancellation_observed_between_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "note.json", r#"{"name": "note"}"#);
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            loader(&dir).load(&token),
            Err(SchemaError::Cancelled)
        ));
    }
}
