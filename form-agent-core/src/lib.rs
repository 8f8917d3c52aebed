#![doc = "form-agent-core: core logic library for form-agent."]

//! This crate contains the document extraction adapter, the contracts for
//! remote models and OCR engines, and the analysis orchestrator.
//! Network clients are not included here.
//!
//! # Usage
//! Add this as a dependency for extraction, prompting and orchestration code;
//! supply an [`contract::LlmClient`] implementation from the calling crate.

pub mod analysis;
pub mod contract;
pub mod document;
pub mod extract;
pub mod ocr;
pub mod outcome;
pub mod pacing;
pub mod prompts;

pub use analysis::{AnalysisRejected, FormAnalyst, HolisticResult, IntermediaryResult};
pub use document::{Document, DocumentKind};
pub use extract::Extractor;
pub use outcome::Outcome;
