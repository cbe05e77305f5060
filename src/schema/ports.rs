//! Seams between the schema engine and its infrastructure
//!
//! The engine is written against these traits so storage and registry
//! backends can be swapped (filesystem loader and in-memory registry in
//! production, hand-built fakes in tests).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::errors::SchemaResult;
use super::types::{Property, PropertyBank, Schema};

/// Produces raw (unresolved) schemas and the property bank.
pub trait SchemaSource: Send + Sync {
    /// Loads every schema definition plus the property bank. Implementations
    /// check `cancel` between units of work and return
    /// `SchemaError::Cancelled` when it fires.
    fn load(&self, cancel: &CancellationToken) -> SchemaResult<(Vec<Schema>, PropertyBank)>;
}

/// Holds the resolved schema set for point lookups.
pub trait SchemaRegistry: Send + Sync {
    /// Replaces the registry contents with the given resolved set and bank.
    /// The swap is atomic: readers see either the old set or the new one.
    fn register_all(&self, schemas: &[Schema], bank: &PropertyBank) -> SchemaResult<()>;

    /// Fetches a resolved schema by name.
    fn get_schema(&self, name: &str) -> SchemaResult<Schema>;

    /// Fetches a bank property by key.
    fn get_property(&self, name: &str) -> SchemaResult<Property>;

    /// True when a schema is registered under `name`.
    fn has_schema(&self, name: &str) -> bool;

    /// True when a bank property is registered under `name`.
    fn has_property(&self, name: &str) -> bool;

    /// All registered schema names, sorted.
    fn schema_names(&self) -> Vec<String>;

    /// All registered bank property keys, sorted.
    fn property_names(&self) -> Vec<String>;
}

impl<T: SchemaRegistry + ?Sized> SchemaRegistry for Arc<T> {
    fn register_all(&self, schemas: &[Schema], bank: &PropertyBank) -> SchemaResult<()> {
        (**self).register_all(schemas, bank)
    }

    fn get_schema(&self, name: &str) -> SchemaResult<Schema> {
        (**self).get_schema(name)
    }

    fn get_property(&self, name: &str) -> SchemaResult<Property> {
        (**self).get_property(name)
    }

    fn has_schema(&self, name: &str) -> bool {
        (**self).has_schema(name)
    }

    fn has_property(&self, name: &str) -> bool {
        (**self).has_property(name)
    }

    fn schema_names(&self) -> Vec<String> {
        (**self).schema_names()
    }

    fn property_names(&self) -> Vec<String> {
        (**self).property_names()
    }
}
