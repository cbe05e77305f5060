//! Frontmatter schema subsystem
//!
//! Schemas describe the frontmatter of a class of notes: which properties
//! exist, which are required, and what values they accept. The subsystem is
//! a four-stage pipeline (load, validate, resolve, register) orchestrated by
//! [`SchemaEngine`] over pluggable [`SchemaSource`] and [`SchemaRegistry`]
//! backends.

pub mod engine;
pub mod errors;
pub mod loader;
pub mod ports;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod validation;
pub mod validator;

pub use engine::SchemaEngine;
pub use errors::{EngineError, SchemaError, SchemaResult};
pub use loader::FsSchemaLoader;
pub use ports::{SchemaRegistry, SchemaSource};
pub use registry::InMemoryRegistry;
pub use resolver::SchemaResolver;
pub use types::{
    BoolSpec, DateSpec, FileSpec, NumberSpec, Property, PropertyBank, PropertySpec, Schema,
    StringSpec,
};
pub use validation::{Constraint, FieldError, ValidationResult};
pub use validator::SchemaValidator;
