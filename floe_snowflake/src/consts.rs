//! Snowflake spec-shape and dialect constants.

/// Type tag for Cortex Analyst text-to-SQL tools.
pub const ANALYST_TOOL_TYPE: &str = "cortex_analyst_text_to_sql";
/// Type tag for Cortex Search tools.
pub const SEARCH_TOOL_TYPE: &str = "cortex_search";
/// Type tag for generic (procedure-backed) tools.
pub const GENERIC_TOOL_TYPE: &str = "generic";

/// Where a spec may keep its tools list, probed after the top-level `tools`
/// key, in priority order.
pub(crate) const SPEC_WRAPPER_KEYS: [&str; 2] = ["definition", "spec"];

/// Keys a tool entry may wrap its actual payload under, in priority order.
pub(crate) const ENTRY_WRAPPER_KEYS: [&str; 3] = ["tool_spec", "definition", "spec"];

pub(crate) const TOOLS_KEY: &str = "tools";
pub(crate) const TOOL_RESOURCES_KEY: &str = "tool_resources";

/// Keys that may carry an Analyst tool's semantic view pointer.
pub(crate) const ANALYST_TARGET_KEYS: [&str; 2] = ["semantic_model", "semantic_view"];
/// Keys that may carry a Search tool's service pointer.
pub(crate) const SEARCH_TARGET_KEYS: [&str; 2] = ["search_service", "service"];
/// Keys probed in a `tool_resources` entry for a Search tool. Resource
/// entries use `name` for the service identifier, tool entries do not.
pub(crate) const SEARCH_RESOURCE_KEYS: [&str; 3] = ["search_service", "service", "name"];
/// Keys that may carry a generic tool's procedure pointer.
pub(crate) const PROCEDURE_TARGET_KEYS: [&str; 1] = ["procedure"];

/// Warehouse granted when the caller does not configure one.
pub const DEFAULT_WAREHOUSE: &str = "COMPUTE_WH";
