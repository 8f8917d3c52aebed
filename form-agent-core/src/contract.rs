//! # contract: the seams between analysis logic and the outside world
//!
//! This module defines the traits the orchestrator and the extractor depend on,
//! so that remote models, OCR engines and pacing policies can be swapped for
//! real implementations or deterministic test doubles.
//!
//! ## Interface & Extensibility
//! - Implement [`LlmClient`] for a new hosted model (see the CLI crate's Gemini client).
//! - Implement [`OcrEngine`] for a new OCR backend (see [`crate::ocr::TesseractOcr`]).
//! - Implement [`Pacer`] for a new rate-limit policy (see [`crate::pacing`]).
//!
//! ## Error Handling
//! - [`LlmClient::complete`] is infallible in its signature: every transport or
//!   decoding failure must come back as [`Outcome::Failed`].
//! - [`OcrEngine::recognize`] returns a typed [`OcrError`]; the extractor turns it
//!   into an outcome.
//!
//! ## Mocking & Testing
//! - All traits are annotated for `mockall`; the mocks are exported behind the
//!   default `test-export-mocks` feature so dependent crates can use them too.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::outcome::Outcome;

/// One round trip to a remote language model: prompt in, completion out.
///
/// No conversation state, no streaming, no retries. Implementations convert
/// every failure into [`Outcome::Failed`] with a reason starting with
/// [`crate::outcome::ERROR_MARKER`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Outcome;
}

/// Errors an OCR backend can report.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR backend not available: {0}")]
    BackendNotAvailable(String),
    #[error("{0}")]
    OcrFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns raw image bytes into recognised text.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Pacing policy applied between consecutive remote calls.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait as long as the policy requires before the next call may be made.
    async fn pause(&self);
}
