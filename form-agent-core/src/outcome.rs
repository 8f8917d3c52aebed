//! # outcome: the tagged text-or-failure value passed between every stage
//!
//! Extraction, the LLM client and the orchestrator all hand back an [`Outcome`]
//! instead of raising errors. A `Failed` value is terminal: nothing downstream
//! may feed its reason into another prompt.
//!
//! Failure reasons are human-readable and, apart from the fixed
//! unsupported-type message, begin with [`ERROR_MARKER`].

use std::fmt;

use serde::{Serialize, Serializer};

/// Prefix carried by failure reasons produced in this workspace.
pub const ERROR_MARKER: &str = "Error";

/// Either usable text or the reason it could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Text(String),
    Failed(String),
}

impl Outcome {
    pub fn text(text: impl Into<String>) -> Self {
        Outcome::Text(text.into())
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Outcome::Failed(reason.into())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Text that may be placed into a prompt: present and not blank.
    pub fn usable_text(&self) -> Option<&str> {
        match self {
            Outcome::Text(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }

    /// The carried string, whichever variant this is.
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Text(s) | Outcome::Failed(s) => s,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
