//! Consumed capability traits.
//!
//! The engine never talks to a warehouse itself. Metadata reads and grant
//! snapshots are injected through these traits, and any error a capability
//! surfaces (timeouts included) is just a strategy failure to the caller.
//! Implementations against a live platform, with whatever session and retry
//! handling they need, live outside this crate.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::access::ExistingAccessSet;
use crate::qual::QualifiedName;

/// Read-only metadata lookups for semantic/analytical views.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the structured semantic model definition for a view. Available
    /// on newer platform versions; older ones return an error here.
    async fn semantic_model_definition(&self, view: &QualifiedName) -> Result<JsonValue>;

    /// Fetch the raw YAML definition of a semantic view, the legacy path.
    async fn semantic_view_yaml(&self, view: &QualifiedName) -> Result<String>;

    /// Query the platform's object-dependency catalog for the base objects
    /// a view depends on.
    async fn object_dependencies(&self, view: &QualifiedName) -> Result<BTreeSet<QualifiedName>>;
}

/// Supplier of a role's current grants.
#[async_trait]
pub trait GrantsReader: Send + Sync {
    /// Read the named role's grants into an [`ExistingAccessSet`]. A role
    /// with no visible grants yields an empty set; distinguishing "none"
    /// from "could not read" is the implementation's concern.
    async fn existing_grants(&self, role: &str) -> Result<ExistingAccessSet>;
}
