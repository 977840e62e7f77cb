//!
//! Floe core
//!
//! The platform-agnostic half of the Floe permission engine: qualified
//! names, typed access surfaces, the diff engine, and the capability traits
//! the platform-specific crates implement against.
#![deny(missing_docs)]

pub use access::{
    AccessCategory, AccessSet, ExistingAccessSet, InheritedVia, MissingAccessSet,
    RequiredAccessSet,
};
pub use diff::diff;
pub use qual::QualifiedName;
pub use warnings::AnalysisWarning;

pub mod access;
pub mod diff;
pub mod logging;
pub mod qual;
pub mod sources;
pub mod summary;
pub mod warnings;
