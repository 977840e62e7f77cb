//! Recoverable degradation records.
//!
//! Nothing in the engine is fatal. A malformed spec, an unrecognized tool
//! entry, or an exhausted resolution chain shrinks the required set and
//! leaves one of these behind so a human can see what was skipped. The one
//! thing the engine never does is fabricate an identifier it could not
//! actually resolve.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::qual::QualifiedName;

/// A non-fatal condition recorded during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisWarning {
    /// The agent spec text was not valid JSON. The analysis degrades to an
    /// empty tool list.
    ParseError {
        /// Decoder message naming the offending fragment.
        detail: String,
    },
    /// A tool entry matched none of the recognized shapes and was skipped.
    UnknownToolShape {
        /// A short rendering of the entry that was skipped.
        entry: String,
    },
    /// A semantic view's fallback chain was exhausted without recovering
    /// any tables. Other views are unaffected.
    ResolutionFailure {
        /// The view that could not be resolved.
        view: QualifiedName,
        /// The last failure in the chain.
        reason: String,
    },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::ParseError { detail } => {
                write!(f, "could not parse agent spec: {detail}")
            }
            AnalysisWarning::UnknownToolShape { entry } => {
                write!(f, "unrecognized tool entry skipped: {entry}")
            }
            AnalysisWarning::ResolutionFailure { view, reason } => {
                write!(f, "no tables found for {view}: {reason}")
            }
        }
    }
}
