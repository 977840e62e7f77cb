//! Readiness summary over a computed diff.
//!
//! A condensed view for callers that want to show a verdict without walking
//! the sets themselves: per-category counts, a 0-4 score, and the issues
//! holding the role back.

use serde::{Deserialize, Serialize};

use crate::access::{ExistingAccessSet, MissingAccessSet};

/// How many readiness checks exist. One point each for agent access,
/// warehouse access, database/schema access, and table/view access.
pub const READINESS_CHECKS: u8 = 4;

/// A role's readiness for the agent whose diff produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    /// Points earned, out of [`READINESS_CHECKS`].
    pub score: u8,
    /// Warehouses the role can use.
    pub warehouse_count: usize,
    /// Databases the role can use.
    pub database_count: usize,
    /// Tables and views the role can read.
    pub table_count: usize,
    /// Whether every required agent grant is in place.
    pub has_agent_access: bool,
    /// Human-readable descriptions of each failed check.
    pub issues: Vec<String>,
}

impl ReadinessReport {
    /// Whether every check passed.
    pub fn is_ready(&self) -> bool {
        self.score == READINESS_CHECKS
    }
}

/// Summarize a role's standing from its grants and the diff against an
/// agent's requirements.
pub fn readiness(existing: &ExistingAccessSet, missing: &MissingAccessSet) -> ReadinessReport {
    let warehouse_count = existing.warehouses.len();
    let database_count = existing.databases.len();
    let table_count = existing.tables.len() + existing.views.len();
    let has_agent_access = missing.agents.is_empty();

    let mut score = 0;
    let mut issues = Vec::new();

    if has_agent_access {
        score += 1;
    } else {
        issues.push("Missing USAGE on the agent".to_owned());
    }

    if warehouse_count > 0 && missing.warehouses.is_empty() {
        score += 1;
    } else {
        issues.push("No warehouse USAGE privileges".to_owned());
    }

    if database_count > 0 && missing.databases.is_empty() && missing.schemas.is_empty() {
        score += 1;
    } else {
        issues.push("No database or schema access".to_owned());
    }

    if table_count > 0 && missing.tables.is_empty() && missing.views.is_empty() {
        score += 1;
    } else {
        issues.push("No SELECT privileges on tables/views".to_owned());
    }

    ReadinessReport {
        score,
        warehouse_count,
        database_count,
        table_count,
        has_agent_access,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::access::{AccessCategory, AccessSet, InheritedVia};
    use crate::qual::QualifiedName;

    #[test]
    fn empty_grants_score_zero() {
        let mut missing = AccessSet::default();
        missing.add_agent(QualifiedName::new("DB.SCH.MY_AGENT"));
        missing.add_table(QualifiedName::new("DB.SCH.BASE"));
        missing.add_warehouse(QualifiedName::new("COMPUTE_WH"));

        let report = readiness(&ExistingAccessSet::default(), &missing);
        assert_eq!(report.score, 0);
        assert!(!report.is_ready());
        assert_eq!(report.issues.len(), 4);
    }

    #[test]
    fn satisfied_role_is_fully_ready() {
        let mut existing = ExistingAccessSet::default();
        existing.grant(
            AccessCategory::Agents,
            QualifiedName::new("DB.SCH.MY_AGENT"),
            InheritedVia::Direct,
        );
        existing.grant(
            AccessCategory::Warehouses,
            QualifiedName::new("COMPUTE_WH"),
            InheritedVia::Direct,
        );
        existing.grant(
            AccessCategory::Databases,
            QualifiedName::new("DB"),
            InheritedVia::Direct,
        );
        existing.grant(
            AccessCategory::Tables,
            QualifiedName::new("DB.SCH.BASE"),
            InheritedVia::ViaHierarchy,
        );

        let report = readiness(&existing, &AccessSet::default());
        assert!(report.is_ready());
        assert!(report.issues.is_empty());
        assert_eq!(report.table_count, 1);
    }
}
