//! Required, existing, and missing access surfaces.
//!
//! The required and missing sides share one shape, [`AccessSet`]: eight
//! categories of unique, case-insensitively deduplicated object names. The
//! existing side additionally records how each grant reached the role, so
//! reporting layers can distinguish "has it" from "how".

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::qual::QualifiedName;

/// The object categories an access surface is partitioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessCategory {
    /// Database USAGE.
    Databases,
    /// Schema USAGE.
    Schemas,
    /// Table SELECT.
    Tables,
    /// Semantic/analytical view SELECT.
    Views,
    /// Search service USAGE.
    SearchServices,
    /// Stored procedure USAGE.
    Procedures,
    /// Agent USAGE.
    Agents,
    /// Warehouse USAGE.
    Warehouses,
}

impl AccessCategory {
    /// All categories, in the renderer's emission order.
    pub const ALL: [AccessCategory; 8] = [
        AccessCategory::Databases,
        AccessCategory::Schemas,
        AccessCategory::Tables,
        AccessCategory::Views,
        AccessCategory::SearchServices,
        AccessCategory::Procedures,
        AccessCategory::Agents,
        AccessCategory::Warehouses,
    ];
}

/// How an existing grant reached the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InheritedVia {
    /// Granted directly to the role.
    Direct,
    /// Inherited from the account's default/public role.
    ViaDefaultRole,
    /// Inherited through the role hierarchy.
    ViaHierarchy,
}

/// One complete access surface: unique object names per category.
///
/// Used both for the access an agent requires ([`RequiredAccessSet`]) and
/// for the gap a diff reports ([`MissingAccessSet`]). `BTreeSet` keeps each
/// category sorted on the canonical name, so iteration order is stable for
/// rendering and golden-file comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSet {
    /// Databases needing USAGE.
    pub databases: BTreeSet<QualifiedName>,
    /// Schemas needing USAGE.
    pub schemas: BTreeSet<QualifiedName>,
    /// Tables needing SELECT.
    pub tables: BTreeSet<QualifiedName>,
    /// Semantic/analytical views needing SELECT.
    pub views: BTreeSet<QualifiedName>,
    /// Search services needing USAGE.
    pub search_services: BTreeSet<QualifiedName>,
    /// Stored procedures needing USAGE.
    pub procedures: BTreeSet<QualifiedName>,
    /// Agents needing USAGE.
    pub agents: BTreeSet<QualifiedName>,
    /// Warehouses needing USAGE.
    pub warehouses: BTreeSet<QualifiedName>,
}

/// The complete access surface an agent needs.
pub type RequiredAccessSet = AccessSet;

/// The per-category gap between required and existing access. Empty in
/// every category means the role is already satisfied.
pub type MissingAccessSet = AccessSet;

impl AccessSet {
    /// A read-only view of one category.
    pub fn category(&self, category: AccessCategory) -> &BTreeSet<QualifiedName> {
        match category {
            AccessCategory::Databases => &self.databases,
            AccessCategory::Schemas => &self.schemas,
            AccessCategory::Tables => &self.tables,
            AccessCategory::Views => &self.views,
            AccessCategory::SearchServices => &self.search_services,
            AccessCategory::Procedures => &self.procedures,
            AccessCategory::Agents => &self.agents,
            AccessCategory::Warehouses => &self.warehouses,
        }
    }

    /// A mutable view of one category.
    pub fn category_mut(&mut self, category: AccessCategory) -> &mut BTreeSet<QualifiedName> {
        match category {
            AccessCategory::Databases => &mut self.databases,
            AccessCategory::Schemas => &mut self.schemas,
            AccessCategory::Tables => &mut self.tables,
            AccessCategory::Views => &mut self.views,
            AccessCategory::SearchServices => &mut self.search_services,
            AccessCategory::Procedures => &mut self.procedures,
            AccessCategory::Agents => &mut self.agents,
            AccessCategory::Warehouses => &mut self.warehouses,
        }
    }

    /// Add a table, deriving its parent schema and database.
    pub fn add_table(&mut self, table: QualifiedName) {
        self.add_parents(&table);
        self.tables.insert(table);
    }

    /// Add a semantic/analytical view, deriving its parent schema and
    /// database.
    pub fn add_view(&mut self, view: QualifiedName) {
        self.add_parents(&view);
        self.views.insert(view);
    }

    /// Add a search service, deriving its parent schema and database.
    pub fn add_search_service(&mut self, service: QualifiedName) {
        self.add_parents(&service);
        self.search_services.insert(service);
    }

    /// Add a stored procedure, deriving its parent schema and database.
    pub fn add_procedure(&mut self, procedure: QualifiedName) {
        self.add_parents(&procedure);
        self.procedures.insert(procedure);
    }

    /// Add an agent, deriving its parent schema and database.
    pub fn add_agent(&mut self, agent: QualifiedName) {
        self.add_parents(&agent);
        self.agents.insert(agent);
    }

    /// Add a warehouse. Warehouses are account-level objects and have no
    /// parents to derive.
    pub fn add_warehouse(&mut self, warehouse: QualifiedName) {
        self.warehouses.insert(warehouse);
    }

    // The closure property: a qualified name implies USAGE on its schema
    // and database. Single-part names carry no parent information.
    fn add_parents(&mut self, name: &QualifiedName) {
        if let Some(schema) = name.schema() {
            self.schemas.insert(schema);
        }
        if let Some(database) = name.database() {
            self.databases.insert(database);
        }
    }

    /// Total entries across all categories. Zero is the single condition
    /// meaning "fully satisfied" when this set is a diff result.
    pub fn total(&self) -> usize {
        AccessCategory::ALL
            .iter()
            .map(|c| self.category(*c).len())
            .sum()
    }

    /// Whether every category is empty.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// A role's current grants, read externally and consumed read-only by the
/// diff engine. Each entry records how the grant reached the role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingAccessSet {
    /// Databases with USAGE.
    pub databases: BTreeMap<QualifiedName, InheritedVia>,
    /// Schemas with USAGE.
    pub schemas: BTreeMap<QualifiedName, InheritedVia>,
    /// Tables with SELECT.
    pub tables: BTreeMap<QualifiedName, InheritedVia>,
    /// Views with SELECT.
    pub views: BTreeMap<QualifiedName, InheritedVia>,
    /// Search services with USAGE.
    pub search_services: BTreeMap<QualifiedName, InheritedVia>,
    /// Stored procedures with USAGE.
    pub procedures: BTreeMap<QualifiedName, InheritedVia>,
    /// Agents with USAGE.
    pub agents: BTreeMap<QualifiedName, InheritedVia>,
    /// Warehouses with USAGE.
    pub warehouses: BTreeMap<QualifiedName, InheritedVia>,
}

impl ExistingAccessSet {
    /// A read-only view of one category.
    pub fn category(&self, category: AccessCategory) -> &BTreeMap<QualifiedName, InheritedVia> {
        match category {
            AccessCategory::Databases => &self.databases,
            AccessCategory::Schemas => &self.schemas,
            AccessCategory::Tables => &self.tables,
            AccessCategory::Views => &self.views,
            AccessCategory::SearchServices => &self.search_services,
            AccessCategory::Procedures => &self.procedures,
            AccessCategory::Agents => &self.agents,
            AccessCategory::Warehouses => &self.warehouses,
        }
    }

    /// Record a grant in the given category.
    pub fn grant(&mut self, category: AccessCategory, name: QualifiedName, via: InheritedVia) {
        let entries = match category {
            AccessCategory::Databases => &mut self.databases,
            AccessCategory::Schemas => &mut self.schemas,
            AccessCategory::Tables => &mut self.tables,
            AccessCategory::Views => &mut self.views,
            AccessCategory::SearchServices => &mut self.search_services,
            AccessCategory::Procedures => &mut self.procedures,
            AccessCategory::Agents => &mut self.agents,
            AccessCategory::Warehouses => &mut self.warehouses,
        };
        entries.insert(name, via);
    }

    /// Total grants across all categories.
    pub fn total(&self) -> usize {
        AccessCategory::ALL
            .iter()
            .map(|c| self.category(*c).len())
            .sum()
    }

    /// Whether the role holds no grants at all.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
