//! Grant script rendering.
//!
//! Turns an access surface into SQL text, never executing any of it. Two
//! modes: a fresh-role script that creates a dedicated role and grants it a
//! full [`RequiredAccessSet`], and an incremental script that closes the
//! gap a [`MissingAccessSet`] describes for an existing role. Output order
//! is fixed and every category is emitted in lexical order on the
//! canonical name, so the same input always renders the same script.

use std::fmt;

use floe_core::{AccessCategory, AccessSet, MissingAccessSet, RequiredAccessSet};

/// Statement emission order: dependencies before dependents, reads last
/// before the warehouse.
const RENDER_ORDER: [AccessCategory; 8] = [
    AccessCategory::Agents,
    AccessCategory::Databases,
    AccessCategory::Schemas,
    AccessCategory::Views,
    AccessCategory::Tables,
    AccessCategory::SearchServices,
    AccessCategory::Procedures,
    AccessCategory::Warehouses,
];

/// Privilege and object keyword for grants in one category.
fn grant_clause(category: AccessCategory) -> (&'static str, &'static str) {
    match category {
        AccessCategory::Databases => ("USAGE", "DATABASE"),
        AccessCategory::Schemas => ("USAGE", "SCHEMA"),
        AccessCategory::Tables => ("SELECT", "TABLE"),
        AccessCategory::Views => ("SELECT", "VIEW"),
        AccessCategory::SearchServices => ("USAGE", "CORTEX SEARCH SERVICE"),
        AccessCategory::Procedures => ("USAGE", "PROCEDURE"),
        AccessCategory::Agents => ("USAGE", "AGENT"),
        AccessCategory::Warehouses => ("USAGE", "WAREHOUSE"),
    }
}

fn category_heading(category: AccessCategory) -> &'static str {
    match category {
        AccessCategory::Databases => "-- Database usage",
        AccessCategory::Schemas => "-- Schema usage",
        AccessCategory::Tables => "-- Base table reads",
        AccessCategory::Views => "-- Semantic view reads",
        AccessCategory::SearchServices => "-- Search service usage",
        AccessCategory::Procedures => "-- Procedure usage",
        AccessCategory::Agents => "-- Agent usage",
        AccessCategory::Warehouses => "-- Warehouse usage",
    }
}

/// A rendered script: SQL lines, statements and comments alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlScript {
    lines: Vec<String>,
}

impl SqlScript {
    /// The script's lines in emission order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The full script text.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// How many GRANT statements the script carries.
    pub fn grant_count(&self) -> usize {
        self.lines.iter().filter(|l| l.starts_with("GRANT ")).count()
    }

    fn push<T: Into<String>>(&mut self, line: T) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }
}

impl fmt::Display for SqlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

const BANNER: &str =
    "-- ================================================================================";

/// Render a full script that creates a dedicated role and grants it
/// everything in `required`.
///
/// The role and warehouse names land in `SET` variables at the top, as
/// placeholders for the reviewer to adjust; warehouses already present in
/// the required set are granted by name as well.
pub fn render_fresh_role(
    required: &RequiredAccessSet,
    role_name: &str,
    warehouse: &str,
) -> SqlScript {
    let grantee = "ROLE IDENTIFIER($AGENT_ROLE_NAME)";
    let mut script = SqlScript::default();

    script.push(BANNER);
    script.push("-- Least-privilege grant script generated by Floe");
    script.push("-- Review and adjust the placeholder variables below before running.");
    script.push(BANNER);
    script.push(format!("SET AGENT_ROLE_NAME = '{role_name}';"));
    script.push(format!("SET WAREHOUSE_NAME = '{warehouse}';"));
    script.blank();

    script.push("-- Create a dedicated role for the agent's permissions.");
    script.push("USE ROLE SECURITYADMIN;");
    script.push("CREATE ROLE IF NOT EXISTS IDENTIFIER($AGENT_ROLE_NAME);");
    script.push("GRANT ROLE IDENTIFIER($AGENT_ROLE_NAME) TO ROLE SYSADMIN;");
    script.blank();

    let warehouse_canonical = warehouse.to_uppercase();
    for category in RENDER_ORDER {
        let names = required.category(category);
        let placeholder_warehouse = category == AccessCategory::Warehouses;
        if names.is_empty() && !placeholder_warehouse {
            continue;
        }
        let (privilege, keyword) = grant_clause(category);
        script.push(category_heading(category));
        if placeholder_warehouse {
            script.push(format!(
                "GRANT USAGE ON WAREHOUSE IDENTIFIER($WAREHOUSE_NAME) TO {grantee};"
            ));
        }
        for name in names {
            if placeholder_warehouse && name.canonical() == warehouse_canonical {
                // Already granted through the placeholder variable.
                continue;
            }
            script.push(format!(
                "GRANT {privilege} ON {keyword} {name} TO {grantee};"
            ));
        }
        script.blank();
    }

    script.push(BANNER);
    script.push("SELECT 'Setup complete for role ' || $AGENT_ROLE_NAME AS \"Status\";");
    script.push(BANNER);
    script
}

/// Render the statements that close the gap for an existing role.
///
/// An empty missing set renders a single informational statement and no
/// grants at all; that is the contract, not an error.
pub fn render_incremental(missing: &MissingAccessSet, role_name: &str) -> SqlScript {
    let mut script = SqlScript::default();
    script.push(format!("-- Remediation script for role {role_name}"));

    if missing.is_empty() {
        script.push(format!(
            "SELECT 'No additional grants required for role {role_name}' AS \"Status\";"
        ));
        return script;
    }
    script.blank();

    for category in RENDER_ORDER {
        let names = missing.category(category);
        if names.is_empty() {
            continue;
        }
        let (privilege, keyword) = grant_clause(category);
        script.push(category_heading(category));
        for name in names {
            script.push(format!(
                "GRANT {privilege} ON {keyword} {name} TO ROLE {role_name};"
            ));
        }
        script.blank();
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;

    use floe_core::QualifiedName;

    fn grant_lines(script: &SqlScript) -> Vec<&String> {
        script
            .lines()
            .iter()
            .filter(|l| l.starts_with("GRANT "))
            .collect()
    }

    fn required_fixture() -> AccessSet {
        let mut required = AccessSet::default();
        required.add_agent(QualifiedName::new("DB.SCH.MY_AGENT"));
        required.add_view(QualifiedName::new("DB.SCH.V1"));
        required.add_table(QualifiedName::new("DB.SCH.BASE"));
        required.add_search_service(QualifiedName::new("DB.SVC_SCH.SEARCH"));
        required.add_procedure(QualifiedName::new("DB.SCH.DO_THING"));
        required.add_warehouse(QualifiedName::new("COMPUTE_WH"));
        required
    }

    #[test]
    fn fresh_role_statements_come_in_dependency_order() {
        let script = render_fresh_role(&required_fixture(), "MY_AGENT_USER_ROLE", "COMPUTE_WH");
        let grants = grant_lines(&script);

        let order: Vec<&str> = grants
            .iter()
            .filter_map(|l| l.split_whitespace().nth(3))
            .collect();
        assert_eq!(
            order,
            vec![
                "TO", // the new role granted to SYSADMIN
                "AGENT",
                "DATABASE",
                "SCHEMA",
                "SCHEMA",
                "VIEW",
                "TABLE",
                "CORTEX",
                "PROCEDURE",
                "WAREHOUSE",
            ]
        );
    }

    #[test]
    fn schemas_render_sorted_for_reproducibility() {
        let script = render_fresh_role(&required_fixture(), "R", "COMPUTE_WH");
        let schema_lines: Vec<&String> = script
            .lines()
            .iter()
            .filter(|l| l.starts_with("GRANT USAGE ON SCHEMA"))
            .collect();
        let mut sorted = schema_lines.clone();
        sorted.sort();
        assert_eq!(schema_lines, sorted);
    }

    #[test]
    fn rendering_twice_is_identical() {
        let required = required_fixture();
        assert_eq!(
            render_fresh_role(&required, "R", "WH").text(),
            render_fresh_role(&required, "R", "WH").text()
        );
    }

    #[test]
    fn fresh_role_uses_one_casing_for_identifiers() {
        let mut required = AccessSet::default();
        required.add_table(QualifiedName::new("db.sch.Mixed"));
        let script = render_fresh_role(&required, "R", "WH");

        assert!(script
            .lines()
            .iter()
            .any(|l| l.contains("GRANT SELECT ON TABLE DB.SCH.MIXED")));
        assert!(!script.text().contains("db.sch.Mixed"));
    }

    #[test]
    fn set_warehouse_is_not_granted_twice() {
        let script = render_fresh_role(&required_fixture(), "R", "compute_wh");
        let warehouse_grants: Vec<&String> = script
            .lines()
            .iter()
            .filter(|l| l.contains("ON WAREHOUSE"))
            .collect();
        assert_eq!(warehouse_grants.len(), 1);
    }

    #[test]
    fn incremental_mode_grants_directly_to_the_role() {
        let mut missing = AccessSet::default();
        missing.schemas.insert(QualifiedName::new("DB.SCH"));
        missing.tables.insert(QualifiedName::new("DB.SCH.BASE"));

        let script = render_incremental(&missing, "ANALYST_ROLE");
        assert!(script
            .lines()
            .iter()
            .any(|l| l == "GRANT USAGE ON SCHEMA DB.SCH TO ROLE ANALYST_ROLE;"));
        assert!(script
            .lines()
            .iter()
            .any(|l| l == "GRANT SELECT ON TABLE DB.SCH.BASE TO ROLE ANALYST_ROLE;"));
        assert!(!script.text().contains("IDENTIFIER("));
    }

    #[test]
    fn zero_missing_renders_status_only() {
        let script = render_incremental(&AccessSet::default(), "READY_ROLE");
        assert_eq!(script.grant_count(), 0);
        assert!(script
            .lines()
            .iter()
            .any(|l| l.contains("No additional grants required for role READY_ROLE")));
    }
}
