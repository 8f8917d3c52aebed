//! Tesseract OCR backend.
//!
//! Shells out to the `tesseract` binary; the image bytes are staged in a
//! temporary file because tesseract reads from a path.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::contract::{OcrEngine, OcrError};

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "eng";

pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self::with_language(DEFAULT_LANGUAGE)
    }

    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let mut staged = NamedTempFile::new()?;
        staged.write_all(image)?;
        staged.flush()?;

        debug!(
            path = %staged.path().display(),
            bytes = image.len(),
            language = %self.language,
            "Running tesseract"
        );

        let output = Command::new("tesseract")
            .arg(staged.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::OcrFailed(format!(
                    "tesseract failed: {}",
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable("tesseract not found (install tesseract-ocr)".into()),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}
