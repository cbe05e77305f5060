//! In-memory schema registry with optional JSON index persistence
//!
//! Resolved schemas and bank properties live behind a single `RwLock` so a
//! `register_all` swaps both maps atomically: concurrent readers see either
//! the previous generation or the new one, never a mix. The whole state can
//! be saved to and reloaded from a JSON index file for fast startup.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::ports::SchemaRegistry;
use super::types::{Property, PropertyBank, Schema};

/// Both maps behind one lock, so they swap together.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryState {
    schemas: HashMap<String, Schema>,
    properties: HashMap<String, Property>,
}

/// Thread-safe registry holding the current resolved generation.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes the current contents to a JSON index file.
    pub fn save_index(&self, path: &Path) -> SchemaResult<()> {
        let state = self.read_state();
        let json = serde_json::to_string_pretty(&*state)
            .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))
    }

    /// Replaces the contents from a previously saved JSON index file.
    pub fn load_index(&self, path: &Path) -> SchemaResult<()> {
        let json = fs::read_to_string(path)
            .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))?;
        let state: RegistryState = serde_json::from_str(&json)
            .map_err(|e| SchemaError::storage(path.display().to_string(), e.to_string()))?;
        *self.write_state() = state;
        Ok(())
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl SchemaRegistry for InMemoryRegistry {
    fn register_all(&self, schemas: &[Schema], bank: &PropertyBank) -> SchemaResult<()> {
        let mut next = RegistryState::default();
        for schema in schemas {
            if next
                .schemas
                .insert(schema.name.clone(), schema.clone())
                .is_some()
            {
                return Err(SchemaError::Registration(format!(
                    "duplicate schema name '{}' in resolved set",
                    schema.name
                )));
            }
        }
        for (key, property) in bank.iter() {
            next.properties.insert(key.clone(), property.clone());
        }
        *self.write_state() = next;
        Ok(())
    }

    fn get_schema(&self, name: &str) -> SchemaResult<Schema> {
        self.read_state()
            .schemas
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::SchemaNotFound(name.to_string()))
    }

    fn get_property(&self, name: &str) -> SchemaResult<Property> {
        self.read_state()
            .properties
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::PropertyNotFound(name.to_string()))
    }

    fn has_schema(&self, name: &str) -> bool {
        self.read_state().schemas.contains_key(name)
    }

    fn has_property(&self, name: &str) -> bool {
        self.read_state().properties.contains_key(name)
    }

    fn schema_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_state().schemas.keys().cloned().collect();
        names.sort();
        names
    }

    fn property_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_state().properties.keys().cloned().collect();
        names.sort();
        names
    }
}
