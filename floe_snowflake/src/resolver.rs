//! Semantic view resolution.
//!
//! Given a semantic/analytical view, find the base tables it depends on.
//! Three retrieval strategies are tried in order, each failure feeding the
//! next: the structured model definition (newer platform versions), the
//! legacy YAML definition plus a structural scan, and finally the
//! object-dependency catalog. Exhausting all three is not an error — it
//! yields [`ResolutionOutcome::Unresolved`] and the analysis moves on to
//! the next view.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use floe_core::sources::MetadataSource;
use floe_core::QualifiedName;

/// Which strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStrategy {
    /// The structured semantic model definition.
    ModelDefinition,
    /// The legacy YAML definition, scanned structurally.
    LegacyYaml,
    /// The platform's object-dependency catalog.
    DependencyCatalog,
}

/// The outcome of resolving one semantic view. Created fresh per call;
/// nothing here is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// Base tables were recovered.
    Resolved {
        /// The tables the view depends on.
        tables: BTreeSet<QualifiedName>,
        /// Which strategy recovered them.
        strategy: ResolutionStrategy,
    },
    /// Every strategy failed or came back empty.
    Unresolved {
        /// The last failure in the chain.
        reason: String,
    },
}

/// Resolve the base tables of one semantic view through the fallback
/// chain. Any capability error, timeouts included, counts as a strategy
/// failure and triggers the next strategy.
pub async fn resolve_view_tables(
    source: &dyn MetadataSource,
    view: &QualifiedName,
) -> ResolutionOutcome {
    let mut last_failure;

    // Strategy 1: structured model definition.
    match source.semantic_model_definition(view).await {
        Ok(model) => {
            let tables = tables_from_model(&model);
            if !tables.is_empty() {
                return ResolutionOutcome::Resolved {
                    tables,
                    strategy: ResolutionStrategy::ModelDefinition,
                };
            }
            last_failure = format!("semantic model definition for {view} listed no base tables");
        }
        Err(e) => last_failure = format!("semantic model definition unavailable: {e:#}"),
    }
    debug!("{last_failure}; falling back to legacy YAML");

    // Strategy 2: legacy YAML plus structural scan.
    match source.semantic_view_yaml(view).await {
        Ok(yaml) => {
            let tables = tables_from_yaml(&yaml);
            if !tables.is_empty() {
                return cross_check_catalog(source, view, tables).await;
            }
            last_failure = format!("no table references found in YAML for {view}");
        }
        Err(e) => last_failure = format!("could not read YAML from {view}: {e:#}"),
    }
    debug!("{last_failure}; falling back to dependency catalog");

    // Strategy 3: dependency catalog.
    match source.object_dependencies(view).await {
        Ok(tables) if !tables.is_empty() => ResolutionOutcome::Resolved {
            tables,
            strategy: ResolutionStrategy::DependencyCatalog,
        },
        Ok(_) => ResolutionOutcome::Unresolved {
            reason: format!("dependency catalog lists no dependencies for {view}"),
        },
        Err(e) => ResolutionOutcome::Unresolved {
            reason: format!("dependency catalog query failed: {e:#}"),
        },
    }
}

/// The YAML scan is best-effort; when it finds tables, the dependency
/// catalog is consulted as the structurally reliable source. A non-empty
/// catalog answer that disagrees wins, loudly. A failed or empty catalog
/// leaves the YAML result in place.
async fn cross_check_catalog(
    source: &dyn MetadataSource,
    view: &QualifiedName,
    yaml_tables: BTreeSet<QualifiedName>,
) -> ResolutionOutcome {
    match source.object_dependencies(view).await {
        Ok(catalog_tables) if !catalog_tables.is_empty() && catalog_tables != yaml_tables => {
            warn!(
                "YAML scan of {view} found {} table(s) but the dependency catalog lists {}; \
                 using the catalog",
                yaml_tables.len(),
                catalog_tables.len()
            );
            ResolutionOutcome::Resolved {
                tables: catalog_tables,
                strategy: ResolutionStrategy::DependencyCatalog,
            }
        }
        _ => ResolutionOutcome::Resolved {
            tables: yaml_tables,
            strategy: ResolutionStrategy::LegacyYaml,
        },
    }
}

/// Pull base tables out of a structured semantic model definition.
///
/// The model carries a `tables` array whose entries name their physical
/// table either as a `base_table` object (`database`/`schema`/`table`
/// fields) or as a dotted string.
fn tables_from_model(model: &JsonValue) -> BTreeSet<QualifiedName> {
    let mut tables = BTreeSet::new();
    let Some(entries) = model.get("tables").and_then(JsonValue::as_array) else {
        return tables;
    };
    for entry in entries {
        match entry.get("base_table") {
            Some(JsonValue::Object(base)) => {
                let database = base.get("database").and_then(JsonValue::as_str);
                let schema = base.get("schema").and_then(JsonValue::as_str);
                let table = base.get("table").and_then(JsonValue::as_str);
                if let (Some(database), Some(schema), Some(table)) = (database, schema, table) {
                    tables.insert(QualifiedName::new(format!("{database}.{schema}.{table}")));
                }
            }
            Some(JsonValue::String(name)) if !name.is_empty() => {
                tables.insert(QualifiedName::new(name.as_str()));
            }
            _ => (),
        }
    }
    tables
}

lazy_static! {
    // Fully-qualified identifiers after a `table:` or `from:` key. A
    // structural scan, not YAML validation: partial or non-standard YAML
    // yields whatever subset matches, possibly nothing.
    static ref TABLE_REF: Regex = Regex::new(
        r"(?i)(?:table|from):\s*([A-Za-z_][A-Za-z0-9_$]*\.[A-Za-z_][A-Za-z0-9_$]*\.[A-Za-z_][A-Za-z0-9_$]*)"
    )
    .unwrap();
}

/// Scan semantic view YAML for table references.
pub(crate) fn tables_from_yaml(yaml: &str) -> BTreeSet<QualifiedName> {
    TABLE_REF
        .captures_iter(yaml)
        .map(|captures| QualifiedName::new(&captures[1]))
        .collect()
}
