//! Agent spec normalization.
//!
//! Agent specs arrive in more than one shape: JSON text or an
//! already-structured value, tools at the top level or tucked under a
//! `definition`/`spec` wrapper, payloads inline or wrapped in `tool_spec`,
//! and resource pointers either on the tool entry or in a separate
//! `tool_resources` map keyed by tool name. This module flattens all of
//! that into an ordered list of [`ToolDescriptor`]s, recording (never
//! throwing on) whatever it cannot recognize.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use floe_core::{AnalysisWarning, QualifiedName};

use crate::consts;

/// An agent spec as it arrives at the boundary: JSON text or a value
/// somebody already decoded.
#[derive(Debug, Clone)]
pub enum RawAgentSpec {
    /// A JSON-encoded spec, as `DESCRIBE AGENT` returns it.
    Text(String),
    /// An already-structured spec.
    Structured(JsonValue),
}

impl From<&str> for RawAgentSpec {
    fn from(text: &str) -> Self {
        RawAgentSpec::Text(text.to_owned())
    }
}

impl From<String> for RawAgentSpec {
    fn from(text: String) -> Self {
        RawAgentSpec::Text(text)
    }
}

impl From<JsonValue> for RawAgentSpec {
    fn from(value: JsonValue) -> Self {
        RawAgentSpec::Structured(value)
    }
}

/// The recognized tool categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    /// Cortex Analyst text-to-SQL, backed by a semantic view.
    Analyst,
    /// Cortex Search, backed by a search service.
    Search,
    /// A generic tool with no resolvable object reference.
    Generic,
    /// A generic tool backed by a stored procedure.
    Procedure,
}

/// One referenced capability of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Which category of tool this is.
    pub kind: ToolKind,
    /// The object the tool points at, verbatim as the spec carried it.
    pub target: QualifiedName,
    /// The tool's payload, retained for downstream resolution.
    pub raw: JsonValue,
}

/// The result of normalizing one agent spec.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSpec {
    /// Recognized tools, in spec order.
    pub tools: Vec<ToolDescriptor>,
    /// Everything that had to be skipped on the way.
    pub warnings: Vec<AnalysisWarning>,
}

/// Normalize a raw agent spec into typed tool descriptors.
///
/// Malformed JSON degrades to an empty tool list with a recorded
/// [`AnalysisWarning::ParseError`]; unrecognized tool entries are skipped
/// and recorded individually. Neither aborts the analysis.
pub fn normalize(spec: RawAgentSpec) -> NormalizedSpec {
    // Decode-if-text happens exactly once, here at the boundary.
    let root = match spec {
        RawAgentSpec::Structured(value) => value,
        RawAgentSpec::Text(text) => match serde_json::from_str::<JsonValue>(&text) {
            Ok(value) => value,
            Err(e) => {
                return NormalizedSpec {
                    tools: vec![],
                    warnings: vec![AnalysisWarning::ParseError {
                        detail: describe_decode_error(&text, &e),
                    }],
                }
            }
        },
    };

    let mut result = NormalizedSpec::default();
    let entries: Cow<'_, [JsonValue]> = match locate_tools(&root) {
        None => {
            debug!("agent spec carries no tools list");
            return result;
        }
        Some(JsonValue::Array(entries)) => Cow::Borrowed(entries.as_slice()),
        // DESCRIBE-style output carries the tools list as a JSON-encoded
        // string inside the already-decoded spec.
        Some(JsonValue::String(text)) => match serde_json::from_str::<JsonValue>(text) {
            Ok(JsonValue::Array(entries)) => Cow::Owned(entries),
            Ok(other) => {
                result.warnings.push(AnalysisWarning::ParseError {
                    detail: format!("tools text decoded to a non-list: {}", snippet(&other)),
                });
                return result;
            }
            Err(e) => {
                result.warnings.push(AnalysisWarning::ParseError {
                    detail: describe_decode_error(text, &e),
                });
                return result;
            }
        },
        Some(other) => {
            result.warnings.push(AnalysisWarning::ParseError {
                detail: format!("tools is not a list: {}", snippet(other)),
            });
            return result;
        }
    };
    let resources = locate_tool_resources(&root);

    for entry in entries.iter() {
        let payload = unwrap_entry(entry);
        match classify(payload, resources) {
            Some(descriptor) => result.tools.push(descriptor),
            None => result.warnings.push(AnalysisWarning::UnknownToolShape {
                entry: snippet(entry),
            }),
        }
    }
    result
}

/// Find the tools value: top-level `tools` first, then under the known
/// wrappers in priority order. The caller decides whether the value is a
/// usable list.
fn locate_tools(root: &JsonValue) -> Option<&JsonValue> {
    if let Some(tools) = root.get(consts::TOOLS_KEY) {
        return Some(tools);
    }
    consts::SPEC_WRAPPER_KEYS
        .iter()
        .find_map(|wrapper| root.get(*wrapper).and_then(|inner| inner.get(consts::TOOLS_KEY)))
}

/// Find the `tool_resources` map, looking in the same places as the tools
/// list.
fn locate_tool_resources(root: &JsonValue) -> Option<&Map<String, JsonValue>> {
    if let Some(resources) = root
        .get(consts::TOOL_RESOURCES_KEY)
        .and_then(JsonValue::as_object)
    {
        return Some(resources);
    }
    consts::SPEC_WRAPPER_KEYS.iter().find_map(|wrapper| {
        root.get(*wrapper)
            .and_then(|inner| inner.get(consts::TOOL_RESOURCES_KEY))
            .and_then(JsonValue::as_object)
    })
}

/// A tool entry may wrap its payload; take the first recognized wrapper,
/// or the entry itself.
fn unwrap_entry(entry: &JsonValue) -> &JsonValue {
    consts::ENTRY_WRAPPER_KEYS
        .iter()
        .find_map(|wrapper| entry.get(*wrapper).filter(|inner| inner.is_object()))
        .unwrap_or(entry)
}

fn classify(
    payload: &JsonValue,
    resources: Option<&Map<String, JsonValue>>,
) -> Option<ToolDescriptor> {
    let type_tag = payload
        .get("type")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let name = payload
        .get("name")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let resource_entry = resources.and_then(|map| map.get(name));

    // An explicit type tag wins outright; name patterns only classify
    // entries that carry no tag at all.
    let kind = match type_tag {
        t if t == consts::ANALYST_TOOL_TYPE => ToolKind::Analyst,
        t if t == consts::SEARCH_TOOL_TYPE => ToolKind::Search,
        t if t == consts::GENERIC_TOOL_TYPE => ToolKind::Generic,
        "" => {
            let name_lower = name.to_lowercase();
            if name_lower.contains("analyst") {
                ToolKind::Analyst
            } else if name_lower.contains("search") {
                ToolKind::Search
            } else {
                return None;
            }
        }
        _ => return None,
    };

    let (kind, target) = match kind {
        ToolKind::Analyst => (
            ToolKind::Analyst,
            string_field(payload, &consts::ANALYST_TARGET_KEYS)
                .or_else(|| resource_entry.and_then(|r| string_field(r, &consts::ANALYST_TARGET_KEYS))),
        ),
        ToolKind::Search => (
            ToolKind::Search,
            string_field(payload, &consts::SEARCH_TARGET_KEYS)
                .or_else(|| resource_entry.and_then(|r| string_field(r, &consts::SEARCH_RESOURCE_KEYS))),
        ),
        ToolKind::Generic | ToolKind::Procedure => {
            let procedure = string_field(payload, &consts::PROCEDURE_TARGET_KEYS).or_else(|| {
                resource_entry.and_then(|r| string_field(r, &consts::PROCEDURE_TARGET_KEYS))
            });
            match procedure {
                Some(procedure) => (ToolKind::Procedure, Some(procedure)),
                // A generic tool with no object reference stays unclassified:
                // the aggregator ignores it, but it is still a recognized shape.
                None if !name.is_empty() => (ToolKind::Generic, Some(name)),
                None => return None,
            }
        }
    };

    target.map(|target| ToolDescriptor {
        kind,
        target: QualifiedName::new(target),
        raw: payload.clone(),
    })
}

/// Probe the given keys in order; first non-empty string wins.
fn string_field<'a>(value: &'a JsonValue, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(JsonValue::as_str))
        .filter(|s| !s.is_empty())
}

/// Name the offending fragment of undecodable spec text.
fn describe_decode_error(text: &str, error: &serde_json::Error) -> String {
    let line = text
        .lines()
        .nth(error.line().saturating_sub(1))
        .unwrap_or("")
        .trim();
    let fragment: String = line.chars().take(60).collect();
    format!("{error} near `{fragment}`")
}

fn snippet(entry: &JsonValue) -> String {
    let rendered = entry.to_string();
    if rendered.len() > 120 {
        let cut: String = rendered.chars().take(120).collect();
        format!("{cut}...")
    } else {
        rendered
    }
}
