//! Uploaded documents and the closed set of kinds the extractor understands.

use serde::Serialize;

use crate::outcome::Outcome;

/// Declared content kind of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Image,
    Pdf,
    Text,
    /// Anything else, keeping the extension it was declared with.
    Unsupported(String),
}

impl DocumentKind {
    /// Map a file extension (without the dot) onto a kind. Case-insensitive.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => DocumentKind::Image,
            "pdf" => DocumentKind::Pdf,
            "txt" => DocumentKind::Text,
            other => DocumentKind::Unsupported(other.to_string()),
        }
    }

    /// Kind for a file name, using everything after the last dot.
    pub fn from_file_name(name: &str) -> Self {
        Self::from_extension(&extension(name))
    }

    /// The extension-like tag this kind was declared as.
    pub fn tag(&self) -> &str {
        match self {
            DocumentKind::Image => "image",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "txt",
            DocumentKind::Unsupported(ext) => ext,
        }
    }
}

/// Lowercased text after the last dot of a file name, or empty.
pub fn extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// One extracted upload, immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub name: String,
    pub kind: DocumentKind,
    pub text: Outcome,
}

impl Document {
    pub fn new(name: impl Into<String>, kind: DocumentKind, text: Outcome) -> Self {
        Self {
            name: name.into(),
            kind,
            text,
        }
    }
}
