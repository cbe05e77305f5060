//! Command implementations
//!
//! Every command builds the same stack: config, filesystem loader, in-memory
//! registry, engine. `check` persists the registry index when one is
//! configured; the inspection commands run the pipeline and then print from
//! the registry as JSON on stdout.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::schema::{FsSchemaLoader, InMemoryRegistry, SchemaEngine};

use super::args::{Command, PropertyAction, SchemaAction};
use super::errors::CliError;

/// Engine plus the registry handle the engine was built over. The handle
/// stays accessible for index persistence after a run.
struct Stack {
    engine: SchemaEngine,
    registry: Arc<InMemoryRegistry>,
    config: Config,
}

fn build_stack(config_path: &Path) -> Result<Stack, CliError> {
    let config = Config::load(config_path)?;
    let loader = FsSchemaLoader::new(config.schemas_path(), config.property_bank_path());
    let registry = Arc::new(InMemoryRegistry::new());
    let engine = SchemaEngine::new(Box::new(loader), Box::new(registry.clone()));
    Ok(Stack {
        engine,
        registry,
        config,
    })
}

pub fn run(config_path: &Path, command: Command) -> Result<(), CliError> {
    let stack = build_stack(config_path)?;
    let cancel = CancellationToken::new();
    stack.engine.load(&cancel)?;

    match command {
        Command::Check => {
            if let Some(index_path) = stack.config.registry_index_path() {
                stack.registry.save_index(&index_path)?;
            }
            let names = stack.engine.schema_names();
            println!(
                "ok: {} schema(s), {} bank propert{}",
                names.len(),
                stack.engine.property_names().len(),
                if stack.engine.property_names().len() == 1 { "y" } else { "ies" },
            );
        }
        Command::Schema { action } => match action {
            SchemaAction::List => {
                for name in stack.engine.schema_names() {
                    println!("{name}");
                }
            }
            SchemaAction::Show { name } => {
                let schema = stack.engine.get_schema(&name)?;
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
        },
        Command::Property { action } => match action {
            PropertyAction::Show { name } => {
                let property = stack.engine.get_property(&name)?;
                println!("{}", serde_json::to_string_pretty(&property)?);
            }
        },
    }

    Ok(())
}
