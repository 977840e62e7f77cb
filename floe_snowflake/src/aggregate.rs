//! Aggregation of tool descriptors and resolutions into one required set.
//!
//! [`aggregate`] is the pure merge: descriptors route into their category,
//! resolved tables land with their derived parents, and the agent itself
//! plus the configured warehouse are always included. [`AgentAnalyzer`]
//! wraps it with normalization and concurrent view resolution for callers
//! holding a raw spec.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use tracing::debug;

use floe_core::sources::{GrantsReader, MetadataSource};
use floe_core::summary::{readiness, ReadinessReport};
use floe_core::{diff, AnalysisWarning, MissingAccessSet, QualifiedName, RequiredAccessSet};

use crate::consts;
use crate::resolver::{resolve_view_tables, ResolutionOutcome};
use crate::spec::{normalize, RawAgentSpec, ToolDescriptor, ToolKind};

/// Caller-supplied analysis settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Warehouse every generated role is granted USAGE on.
    pub default_warehouse: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            default_warehouse: consts::DEFAULT_WAREHOUSE.to_owned(),
        }
    }
}

/// Everything one analysis produced: the required surface, the per-view
/// resolution outcomes, and whatever was skipped along the way.
#[derive(Debug, Clone)]
pub struct AgentAnalysis {
    /// The complete access surface the agent needs.
    pub required: RequiredAccessSet,
    /// Resolution outcome per semantic view referenced by the agent.
    pub resolutions: BTreeMap<QualifiedName, ResolutionOutcome>,
    /// Recoverable degradations recorded during the analysis.
    pub warnings: Vec<AnalysisWarning>,
}

/// Merge tool descriptors and per-view resolutions into a
/// [`RequiredAccessSet`].
///
/// Unresolved views still contribute their own SELECT grant; what they do
/// not contribute is tables nobody actually resolved.
pub fn aggregate(
    agent: &QualifiedName,
    tools: &[ToolDescriptor],
    resolutions: &BTreeMap<QualifiedName, ResolutionOutcome>,
    config: &AnalyzerConfig,
) -> RequiredAccessSet {
    let mut required = RequiredAccessSet::default();
    required.add_agent(agent.clone());
    required.add_warehouse(QualifiedName::new(config.default_warehouse.as_str()));

    for tool in tools {
        match tool.kind {
            ToolKind::Analyst => required.add_view(tool.target.clone()),
            ToolKind::Search => required.add_search_service(tool.target.clone()),
            ToolKind::Procedure => required.add_procedure(tool.target.clone()),
            ToolKind::Generic => {
                // No resolvable object behind it, nothing to grant.
                debug!("ignoring generic tool {}", tool.target);
            }
        }
    }

    for outcome in resolutions.values() {
        if let ResolutionOutcome::Resolved { tables, .. } = outcome {
            for table in tables {
                required.add_table(table.clone());
            }
        }
    }

    required
}

/// Normalizes an agent's spec, resolves its semantic views, and aggregates
/// the required access surface.
pub struct AgentAnalyzer<S> {
    source: S,
    config: AnalyzerConfig,
}

impl<S: MetadataSource> AgentAnalyzer<S> {
    /// Build an analyzer over the given metadata capability.
    pub fn new(source: S, config: AnalyzerConfig) -> Self {
        Self { source, config }
    }

    /// Analyze one agent: its fully-qualified identifier plus its raw spec.
    ///
    /// Independent views resolve concurrently; each unresolved view is
    /// recorded and the rest of the analysis continues.
    pub async fn required_access(
        &self,
        agent: &QualifiedName,
        spec: RawAgentSpec,
    ) -> AgentAnalysis {
        let normalized = normalize(spec);
        let mut warnings = normalized.warnings;

        let views: BTreeSet<QualifiedName> = normalized
            .tools
            .iter()
            .filter(|tool| tool.kind == ToolKind::Analyst)
            .map(|tool| tool.target.clone())
            .collect();

        let mut resolutions = BTreeMap::new();
        let mut inflight = views
            .iter()
            .map(|view| async move { (view.clone(), resolve_view_tables(&self.source, view).await) })
            .collect::<FuturesUnordered<_>>();
        while let Some((view, outcome)) = inflight.next().await {
            if let ResolutionOutcome::Unresolved { reason } = &outcome {
                warnings.push(AnalysisWarning::ResolutionFailure {
                    view: view.clone(),
                    reason: reason.clone(),
                });
            }
            resolutions.insert(view, outcome);
        }

        let required = aggregate(agent, &normalized.tools, &resolutions, &self.config);
        AgentAnalysis {
            required,
            resolutions,
            warnings,
        }
    }

    /// Analyze an agent and diff the result against a role's current
    /// grants, read through the injected [`GrantsReader`].
    pub async fn assess_role(
        &self,
        agent: &QualifiedName,
        spec: RawAgentSpec,
        grants: &dyn GrantsReader,
        role: &str,
    ) -> Result<RoleAssessment> {
        let analysis = self.required_access(agent, spec).await;
        let existing = grants
            .existing_grants(role)
            .await
            .with_context(|| format!("failed to read grants for role {role}"))?;
        let missing = diff(&analysis.required, &existing);
        let report = readiness(&existing, &missing);
        Ok(RoleAssessment {
            analysis,
            missing,
            report,
        })
    }
}

/// One agent's analysis diffed against one role.
#[derive(Debug, Clone)]
pub struct RoleAssessment {
    /// The agent-side analysis the diff consumed.
    pub analysis: AgentAnalysis,
    /// What the role still needs.
    pub missing: MissingAccessSet,
    /// The condensed verdict.
    pub report: ReadinessReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    use maplit::btreeset;

    use crate::resolver::ResolutionStrategy;

    fn descriptor(kind: ToolKind, target: &str) -> ToolDescriptor {
        ToolDescriptor {
            kind,
            target: QualifiedName::new(target),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn agent_and_default_warehouse_are_always_required() {
        let required = aggregate(
            &QualifiedName::new("DB.SCH.MY_AGENT"),
            &[],
            &BTreeMap::new(),
            &AnalyzerConfig::default(),
        );

        assert!(required.agents.contains(&QualifiedName::new("DB.SCH.MY_AGENT")));
        assert!(required
            .warehouses
            .contains(&QualifiedName::new(consts::DEFAULT_WAREHOUSE)));
        // The agent's own schema and database come along by closure.
        assert!(required.schemas.contains(&QualifiedName::new("DB.SCH")));
        assert!(required.databases.contains(&QualifiedName::new("DB")));
    }

    #[test]
    fn descriptors_route_into_their_categories() {
        let tools = vec![
            descriptor(ToolKind::Analyst, "DB.A.V1"),
            descriptor(ToolKind::Search, "DB.B.SVC"),
            descriptor(ToolKind::Procedure, "DB.C.PROC"),
            descriptor(ToolKind::Generic, "watchamacallit"),
        ];

        let required = aggregate(
            &QualifiedName::new("DB.SCH.AG"),
            &tools,
            &BTreeMap::new(),
            &AnalyzerConfig::default(),
        );

        assert!(required.views.contains(&QualifiedName::new("DB.A.V1")));
        assert!(required
            .search_services
            .contains(&QualifiedName::new("DB.B.SVC")));
        assert!(required.procedures.contains(&QualifiedName::new("DB.C.PROC")));
        // Generic tools contribute nothing.
        assert_eq!(required.procedures.len(), 1);
        assert!(required.schemas.contains(&QualifiedName::new("DB.B")));
    }

    #[test]
    fn resolved_tables_land_with_parents() {
        let tools = vec![descriptor(ToolKind::Analyst, "DB.SCH.V1")];
        let resolutions = BTreeMap::from([(
            QualifiedName::new("DB.SCH.V1"),
            ResolutionOutcome::Resolved {
                tables: btreeset! {QualifiedName::new("OTHER_DB.RAW.BASE")},
                strategy: ResolutionStrategy::LegacyYaml,
            },
        )]);

        let required = aggregate(
            &QualifiedName::new("DB.SCH.AG"),
            &tools,
            &resolutions,
            &AnalyzerConfig::default(),
        );

        assert!(required
            .tables
            .contains(&QualifiedName::new("OTHER_DB.RAW.BASE")));
        assert!(required.schemas.contains(&QualifiedName::new("OTHER_DB.RAW")));
        assert!(required.databases.contains(&QualifiedName::new("OTHER_DB")));
    }

    #[test]
    fn unresolved_views_contribute_no_tables() {
        let tools = vec![descriptor(ToolKind::Analyst, "DB.SCH.V1")];
        let resolutions = BTreeMap::from([(
            QualifiedName::new("DB.SCH.V1"),
            ResolutionOutcome::Unresolved {
                reason: "all strategies failed".to_owned(),
            },
        )]);

        let required = aggregate(
            &QualifiedName::new("DB.SCH.AG"),
            &tools,
            &resolutions,
            &AnalyzerConfig::default(),
        );

        // The view itself still needs SELECT; no tables were fabricated.
        assert!(required.views.contains(&QualifiedName::new("DB.SCH.V1")));
        assert!(required.tables.is_empty());
    }
}
