//! Inheritance flattening and `$ref` substitution
//!
//! The resolver takes raw schemas plus a property bank and produces new
//! schemas whose `resolved_properties` hold the complete, flattened,
//! self-contained property set. Inputs are never mutated; the output is a
//! fresh collection. Cycle detection runs over the whole graph before any
//! flattening so a broken vault fails with a full cycle path instead of a
//! stack overflow.

use std::collections::{HashMap, HashSet};

use tokio_util::sync::CancellationToken;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Property, PropertyBank, Schema};

/// Pure, stateless resolver. Construct once and reuse.
#[derive(Debug, Default)]
pub struct SchemaResolver;

impl SchemaResolver {
    pub fn new() -> Self {
        SchemaResolver
    }

    /// Resolves every schema in `schemas` against the others and `bank`.
    ///
    /// Fails fast on the first cycle or unresolved `$ref`. A parent name
    /// that matches no schema in the set is treated as absent, so the child
    /// resolves as a root. Checks `cancel` before each schema.
    pub fn resolve(
        &self,
        cancel: &CancellationToken,
        schemas: &[Schema],
        bank: &PropertyBank,
    ) -> SchemaResult<Vec<Schema>> {
        if cancel.is_cancelled() {
            return Err(SchemaError::Cancelled);
        }

        let by_name: HashMap<&str, &Schema> =
            schemas.iter().map(|s| (s.name.as_str(), s)).collect();

        // parent edges, restricted to parents that exist in the set
        let graph: HashMap<&str, &str> = schemas
            .iter()
            .filter_map(|s| {
                s.extends
                    .as_deref()
                    .filter(|p| by_name.contains_key(p))
                    .map(|p| (s.name.as_str(), p))
            })
            .collect();

        detect_cycles(&graph)?;

        // Parent-first resolution order, memoized across the set.
        let mut resolved: HashMap<String, Vec<Property>> = HashMap::new();
        let mut output = Vec::with_capacity(schemas.len());

        for schema in schemas {
            if cancel.is_cancelled() {
                return Err(SchemaError::Cancelled);
            }
            let properties =
                resolve_one(schema, &by_name, &graph, bank, &mut resolved)?;
            let mut copy = schema.clone();
            copy.resolved_properties = properties;
            output.push(copy);
        }

        Ok(output)
    }
}

/// Walks every node with a DFS, reporting the first cycle as a full path.
fn detect_cycles(graph: &HashMap<&str, &str>) -> SchemaResult<()> {
    let mut done: HashSet<&str> = HashSet::new();

    for &start in graph.keys() {
        if done.contains(start) {
            continue;
        }
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut node = start;

        loop {
            if on_path.contains(node) {
                // Trim the lead-in so the path starts at the cycle entry.
                let entry = path.iter().position(|&n| n == node).unwrap_or(0);
                let mut cycle: Vec<&str> = path[entry..].to_vec();
                cycle.push(node);
                return Err(SchemaError::CircularInheritance {
                    schema: node.to_string(),
                    cycle: cycle.join(" → "),
                });
            }
            if done.contains(node) {
                break;
            }
            path.push(node);
            on_path.insert(node);
            match graph.get(node) {
                Some(&parent) => node = parent,
                None => break,
            }
        }
        done.extend(path);
    }

    Ok(())
}

/// Resolves a single schema, recursing into its parent first. `memo` holds
/// already-flattened property sets keyed by schema name.
fn resolve_one(
    schema: &Schema,
    by_name: &HashMap<&str, &Schema>,
    graph: &HashMap<&str, &str>,
    bank: &PropertyBank,
    memo: &mut HashMap<String, Vec<Property>>,
) -> SchemaResult<Vec<Property>> {
    if let Some(properties) = memo.get(&schema.name) {
        return Ok(properties.clone());
    }

    let mut properties: Vec<Property> = match graph.get(schema.name.as_str()) {
        Some(&parent_name) => {
            let parent = by_name[parent_name];
            resolve_one(parent, by_name, graph, bank, memo)?
        }
        None => Vec::new(),
    };

    // Inherited properties named in `excludes` are dropped.
    if !schema.excludes.is_empty() {
        let excluded: HashSet<&str> = schema.excludes.iter().map(String::as_str).collect();
        properties.retain(|p| !excluded.contains(p.name.as_str()));
    }

    // A declared property replaces an inherited one of the same name wholesale.
    for declared in &schema.properties {
        properties.retain(|p| p.name != declared.name);
        properties.push(declared.clone());
    }

    // Substitute bank specs for `$ref` properties. The referencing property
    // keeps its own name, required, and array flags; only the spec comes
    // from the bank.
    for property in &mut properties {
        if let Some(key) = property.reference.take() {
            let entry = bank.get(&key).ok_or_else(|| SchemaError::UnresolvedReference {
                schema: schema.name.clone(),
                property: property.name.clone(),
                key: key.clone(),
            })?;
            property.spec = entry.spec.clone();
        }
    }

    memo.insert(schema.name.clone(), properties.clone());
    Ok(properties)
}
