//! Qualified object names
//!
//! Dotted warehouse identifiers (`DATABASE.SCHEMA.OBJECT`). The text a name
//! arrived with is preserved, but equality, ordering, and hashing all use the
//! uppercase canonical form, so `db.sch.t` and `DB.SCH.T` are the same entry
//! in any set keyed on a `QualifiedName`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A dotted, possibly multi-part object identifier.
#[derive(Debug, Clone, Default)]
pub struct QualifiedName {
    verbatim: String,
    canonical: String,
}

impl QualifiedName {
    /// Wrap the given name, keeping the original text alongside its
    /// uppercase canonical form.
    pub fn new<T: Into<String>>(name: T) -> Self {
        let verbatim = name.into();
        let canonical = verbatim.to_uppercase();
        Self {
            verbatim,
            canonical,
        }
    }

    /// The name exactly as it was supplied.
    pub fn verbatim(&self) -> &str {
        &self.verbatim
    }

    /// The uppercase form used for comparison and for rendering SQL.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Dot-separated parts of the original text.
    pub fn parts(&self) -> Vec<&str> {
        self.verbatim.split('.').collect()
    }

    /// Number of dotted parts.
    pub fn depth(&self) -> usize {
        self.parts().len()
    }

    /// Whether this is a three-part `database.schema.object` name.
    pub fn is_fully_qualified(&self) -> bool {
        self.depth() == 3
    }

    /// The parent database of a qualified name. `None` for bare,
    /// single-part names, whose database is not knowable from the text.
    pub fn database(&self) -> Option<QualifiedName> {
        let parts = self.parts();
        if parts.len() >= 2 {
            Some(QualifiedName::new(parts[0]))
        } else {
            None
        }
    }

    /// The parent `database.schema` of a qualified name. `None` for bare,
    /// single-part names.
    pub fn schema(&self) -> Option<QualifiedName> {
        let parts = self.parts();
        if parts.len() >= 2 {
            Some(QualifiedName::new(format!("{}.{}", parts[0], parts[1])))
        } else {
            None
        }
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for QualifiedName {}

impl PartialOrd for QualifiedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QualifiedName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        QualifiedName::new(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        QualifiedName::new(name)
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.verbatim)
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(QualifiedName::new(name))
    }
}
