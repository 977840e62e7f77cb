//! Snowflake permission engine
//!
//! The Snowflake-specific half of Floe: normalizes Cortex agent specs into
//! tool descriptors, resolves the base tables behind each semantic view
//! through a fallback chain of metadata strategies, aggregates everything
//! into a required access surface, and renders the grant SQL that closes
//! the gap for a role. The SQL is only ever produced here; running it is
//! the caller's business.
//!
//! ```
//! use floe_core::{diff, ExistingAccessSet, QualifiedName};
//! use floe_snowflake::{aggregate, render_incremental, AnalyzerConfig};
//! use std::collections::BTreeMap;
//!
//! let required = aggregate(
//!     &QualifiedName::new("DB.SCH.MY_AGENT"),
//!     &[],
//!     &BTreeMap::new(),
//!     &AnalyzerConfig::default(),
//! );
//! let missing = diff(&required, &ExistingAccessSet::default());
//! let script = render_incremental(&missing, "MY_AGENT_USER_ROLE");
//! ```

mod consts;

pub mod aggregate;
pub mod render;
pub mod resolver;
pub mod spec;

pub use aggregate::{aggregate, AgentAnalysis, AgentAnalyzer, AnalyzerConfig, RoleAssessment};
pub use consts::{ANALYST_TOOL_TYPE, DEFAULT_WAREHOUSE, GENERIC_TOOL_TYPE, SEARCH_TOOL_TYPE};
pub use render::{render_fresh_role, render_incremental, SqlScript};
pub use resolver::{resolve_view_tables, ResolutionOutcome, ResolutionStrategy};
pub use spec::{normalize, NormalizedSpec, RawAgentSpec, ToolDescriptor, ToolKind};
