//! stela: schema-validated frontmatter for template-driven notes
//!
//! The library is organized around the schema subsystem: a pipeline that
//! loads raw schema definitions from a vault, validates them structurally,
//! flattens inheritance and `$ref` substitutions, and registers the resolved
//! set for lookup. The `cli` module exposes the same pipeline as commands.

pub mod cli;
pub mod config;
pub mod observability;
pub mod schema;
