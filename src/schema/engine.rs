//! Pipeline orchestration: load, validate, resolve, register
//!
//! The engine runs the four stages in order and stops at the first failing
//! stage, wrapping its error with a stage label. Validation is the one stage
//! that accumulates: every schema (and the bank) is checked and all findings
//! are reported together. Cancellation is observed at each stage boundary.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::observability::Logger;

use super::errors::{EngineError, SchemaError, SchemaResult};
use super::ports::{SchemaRegistry, SchemaSource};
use super::resolver::SchemaResolver;
use super::types::{Property, Schema};
use super::validation::ValidationResult;
use super::validator::SchemaValidator;

/// Orchestrates the schema pipeline over pluggable source and registry
/// backends.
pub struct SchemaEngine {
    source: Box<dyn SchemaSource>,
    registry: Box<dyn SchemaRegistry>,
    validator: SchemaValidator,
    resolver: SchemaResolver,
    logger: Logger,
}

impl SchemaEngine {
    pub fn new(source: Box<dyn SchemaSource>, registry: Box<dyn SchemaRegistry>) -> Self {
        Self {
            source,
            registry,
            validator: SchemaValidator::new(),
            resolver: SchemaResolver::new(),
            logger: Logger::new("schema.engine"),
        }
    }

    /// Runs the full pipeline. Safe to call repeatedly: a successful run
    /// replaces the registry contents wholesale.
    pub fn load(&self, cancel: &CancellationToken) -> Result<(), EngineError> {
        let started = Instant::now();

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let stage = Instant::now();
        let (schemas, bank) = self
            .source
            .load(cancel)
            .map_err(|e| self.stage_error(e, EngineError::Load))?;
        self.logger.info(
            "schemas loaded",
            &[
                ("schemas", &schemas.len().to_string()),
                ("bank_entries", &bank.len().to_string()),
                ("elapsed_ms", &stage.elapsed().as_millis().to_string()),
            ],
        );

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let stage = Instant::now();
        let mut findings = ValidationResult::new();
        for schema in &schemas {
            findings.merge_prefixed(self.validator.validate_schema(schema), &schema.name);
        }
        findings.merge(self.validator.validate_property_bank(&bank));
        if !findings.is_valid() {
            let err = EngineError::Validation(SchemaError::Structural(findings));
            self.logger.error("schema validation failed", &[("error", &err.to_string())]);
            return Err(err);
        }
        self.logger.info(
            "schemas validated",
            &[("elapsed_ms", &stage.elapsed().as_millis().to_string())],
        );

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let stage = Instant::now();
        let resolved = self
            .resolver
            .resolve(cancel, &schemas, &bank)
            .map_err(|e| self.stage_error(e, EngineError::Resolution))?;
        self.logger.info(
            "schemas resolved",
            &[("elapsed_ms", &stage.elapsed().as_millis().to_string())],
        );

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let stage = Instant::now();
        self.registry
            .register_all(&resolved, &bank)
            .map_err(|e| self.stage_error(e, EngineError::Registration))?;
        self.logger.info(
            "schemas registered",
            &[
                ("schemas", &resolved.len().to_string()),
                ("elapsed_ms", &stage.elapsed().as_millis().to_string()),
                ("total_ms", &started.elapsed().as_millis().to_string()),
            ],
        );

        Ok(())
    }

    /// Fetches a resolved schema from the registry.
    pub fn get_schema(&self, name: &str) -> SchemaResult<Schema> {
        self.registry.get_schema(name)
    }

    /// Fetches a bank property from the registry.
    pub fn get_property(&self, name: &str) -> SchemaResult<Property> {
        self.registry.get_property(name)
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.registry.has_schema(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.registry.has_property(name)
    }

    /// All registered schema names, sorted.
    pub fn schema_names(&self) -> Vec<String> {
        self.registry.schema_names()
    }

    /// All registered bank property keys, sorted.
    pub fn property_names(&self) -> Vec<String> {
        self.registry.property_names()
    }

    fn stage_error(
        &self,
        err: SchemaError,
        wrap: fn(SchemaError) -> EngineError,
    ) -> EngineError {
        let wrapped = match err {
            SchemaError::Cancelled => EngineError::Cancelled,
            other => wrap(other),
        };
        self.logger.error("schema pipeline failed", &[("error", &wrapped.to_string())]);
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaError;
    use crate::schema::registry::InMemoryRegistry;
    use crate::schema::types::{PropertyBank, PropertySpec};
    use std::sync::Arc;

    /// Source backed by fixed in-memory definitions.
    struct FixedSource {
        schemas: Vec<Schema>,
        bank: PropertyBank,
    }

    impl SchemaSource for FixedSource {
        fn load(&self, cancel: &CancellationToken) -> SchemaResult<(Vec<Schema>, PropertyBank)> {
            if cancel.is_cancelled() {
                return Err(SchemaError::Cancelled);
            }
            Ok((self.schemas.clone(), self.bank.clone()))
        }
    }

    /// Source that always fails with a storage error.
    struct BrokenSource;

    impl SchemaSource for BrokenSource {
        fn load(&self, _cancel: &CancellationToken) -> SchemaResult<(Vec<Schema>, PropertyBank)> {
            Err(SchemaError::storage("schemas", "permission denied"))
        }
    }

    fn engine_with(schemas: Vec<Schema>, bank: PropertyBank) -> SchemaEngine {
        SchemaEngine::new(
            Box::new(FixedSource { schemas, bank }),
            Box::new(Arc::new(InMemoryRegistry::new())),
        )
    }

    #[test]
    fn full_pipeline_registers_resolved_schemas() {
        let engine = engine_with(
            vec![
                Schema::root("base", vec![Property::required("title", PropertySpec::string())]),
                Schema::new(
                    "meeting",
                    Some("base".into()),
                    vec![],
                    vec![Property::required("date", PropertySpec::date())],
                ),
            ],
            PropertyBank::default(),
        );

        engine.load(&CancellationToken::new()).unwrap();

        assert!(engine.has_schema("meeting"));
        let meeting = engine.get_schema("meeting").unwrap();
        assert_eq!(meeting.resolved_properties.len(), 2);
        assert_eq!(engine.schema_names(), vec!["base", "meeting"]);
    }

    #[test]
    fn load_stage_failure_is_labelled() {
        let engine = SchemaEngine::new(
            Box::new(BrokenSource),
            Box::new(Arc::new(InMemoryRegistry::new())),
        );
        let err = engine.load(&CancellationToken::new()).unwrap_err();
        assert!(err.to_string().starts_with("schema loading failed"));
    }

    #[test]
    fn validation_stage_accumulates_across_schemas() {
        let engine = engine_with(
            vec![
                Schema::new("a", Some("a".into()), vec![], vec![]),
                Schema::root("b c", vec![]),
            ],
            PropertyBank::default(),
        );
        let err = engine.load(&CancellationToken::new()).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("schema validation failed"));
        assert!(text.contains("a.extends"));
        assert!(text.contains("b c"));
    }

    #[test]
    fn resolution_stage_failure_is_labelled() {
        let engine = engine_with(
            vec![
                Schema::new("a", Some("b".into()), vec![], vec![]),
                Schema::new("b", Some("a".into()), vec![], vec![]),
            ],
            PropertyBank::default(),
        );
        let err = engine.load(&CancellationToken::new()).unwrap_err();
        assert!(err.to_string().starts_with("schema resolution failed"));
    }

    #[test]
    fn cancelled_before_start() {
        let engine = engine_with(vec![], PropertyBank::default());
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            engine.load(&token),
            Err(EngineError::Cancelled)
        ));
    }

    #[test]
    fn accessors_before_load_miss() {
        let engine = engine_with(vec![], PropertyBank::default());
        assert!(!engine.has_schema("anything"));
        assert!(matches!(
            engine.get_schema("anything"),
            Err(SchemaError::SchemaNotFound(_))
        ));
    }

    #[test]
    fn reload_replaces_contents() {
        let registry = Arc::new(InMemoryRegistry::new());

        let first = SchemaEngine::new(
            Box::new(FixedSource {
                schemas: vec![Schema::root("old", vec![])],
                bank: PropertyBank::default(),
            }),
            Box::new(registry.clone()),
        );
        first.load(&CancellationToken::new()).unwrap();
        assert!(registry.has_schema("old"));

        let second = SchemaEngine::new(
            Box::new(FixedSource {
                schemas: vec![Schema::root("new", vec![])],
                bank: PropertyBank::default(),
            }),
            Box::new(registry.clone()),
        );
        second.load(&CancellationToken::new()).unwrap();
        assert!(!registry.has_schema("old"));
        assert!(registry.has_schema("new"));
    }
}
