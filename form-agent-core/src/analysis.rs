//! # analysis: the Analysis Orchestrator
//!
//! [`FormAnalyst`] answers questions, summarises, and runs the two-phase
//! holistic comparison over several documents. It holds no cache and no
//! mutable state; callers may memoise around it.
//!
//! # Pipeline (holistic)
//!   1. Reject empty input or any unusable context before any remote call.
//!   2. Phase 1: one fact-extraction call per document, strictly in input
//!      order, with the [`Pacer`] consulted between consecutive calls.
//!   3. Phase 2: one synthesis call over every phase-1 answer.
//!
//! # Error Handling
//! Nothing here returns `Err` for a runtime failure. Invalid single contexts
//! give an [`Outcome::Failed`]; invalid holistic input gives an
//! [`AnalysisRejected`]. Model output is stored byte-for-byte.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::contract::{LlmClient, Pacer};
use crate::outcome::Outcome;
use crate::pacing::Pacing;
use crate::prompts;

pub const DEFAULT_SUMMARY_LENGTH: usize = 150;

pub const INVALID_QA_CONTEXT: &str = "Error: Invalid context for Q&A.";
pub const INVALID_SUMMARY_CONTEXT: &str = "Error: Invalid context for summarization.";
pub const INVALID_HOLISTIC_CONTEXTS: &str = "Invalid contexts for holistic analysis.";

/// Phase-1 answer for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntermediaryResult {
    /// Positional label, "Document N".
    pub form: String,
    pub answer: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolisticResult {
    pub holistic_prompt: String,
    pub intermediary_results: Vec<IntermediaryResult>,
    pub final_synthesis: Outcome,
    /// Always empty; no structured extraction is performed.
    pub structured_data: BTreeMap<String, serde_json::Value>,
}

/// Holistic analysis refused before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{error}")]
pub struct AnalysisRejected {
    pub error: String,
}

impl AnalysisRejected {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub struct FormAnalyst<C, P = Pacing> {
    client: C,
    pacer: P,
}

impl<C: LlmClient> FormAnalyst<C, Pacing> {
    /// Analyst with the default one-second pause between phase-1 calls.
    pub fn new(client: C) -> Self {
        Self::with_pacer(client, Pacing::default())
    }
}

impl<C: LlmClient, P: Pacer> FormAnalyst<C, P> {
    pub fn with_pacer(client: C, pacer: P) -> Self {
        Self { client, pacer }
    }

    pub async fn answer_question(&self, context: &Outcome, question: &str) -> Outcome {
        let Some(context) = context.usable_text() else {
            warn!("[QA] Refusing to query with an unusable context");
            return Outcome::failed(INVALID_QA_CONTEXT);
        };
        info!(question = %question, "[QA] Asking question");
        let prompt = prompts::question_prompt(context, question);
        debug!(prompt = %prompt, "[QA] Prompt built");
        self.client.complete(&prompt).await
    }

    /// `max_length` is passed to the model as guidance and never enforced here.
    pub async fn generate_summary(&self, context: &Outcome, max_length: usize) -> Outcome {
        let Some(context) = context.usable_text() else {
            warn!("[SUMMARY] Refusing to summarise an unusable context");
            return Outcome::failed(INVALID_SUMMARY_CONTEXT);
        };
        info!(max_length, "[SUMMARY] Generating summary");
        let prompt = prompts::summary_prompt(context, max_length);
        debug!(prompt = %prompt, "[SUMMARY] Prompt built");
        self.client.complete(&prompt).await
    }

    pub async fn holistic_analysis(
        &self,
        contexts: &[Outcome],
        prompt: &str,
    ) -> Result<HolisticResult, AnalysisRejected> {
        let Some(texts) = contexts
            .iter()
            .map(Outcome::usable_text)
            .collect::<Option<Vec<&str>>>()
            .filter(|texts| !texts.is_empty())
        else {
            error!(
                documents = contexts.len(),
                "[HOLISTIC][ERROR] Rejecting empty or unusable contexts"
            );
            return Err(AnalysisRejected::new(INVALID_HOLISTIC_CONTEXTS));
        };

        info!(documents = texts.len(), "[HOLISTIC] Starting phase 1 (per-document facts)");
        let mut intermediary_results = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }
            let label = prompts::document_label(index);
            let q_prompt = prompts::fact_extraction_prompt(&label, text, prompt);
            let answer = self.client.complete(&q_prompt).await;
            if answer.is_failed() {
                error!(form = %label, reason = %answer, "[HOLISTIC][ERROR] Fact extraction failed");
            } else {
                info!(form = %label, "[HOLISTIC] Fact extraction succeeded");
            }
            intermediary_results.push(IntermediaryResult {
                form: label,
                answer,
            });
        }

        let final_synthesis = self.synthesize(&intermediary_results, prompt).await;

        Ok(HolisticResult {
            holistic_prompt: prompt.to_string(),
            intermediary_results,
            final_synthesis,
            structured_data: BTreeMap::new(),
        })
    }

    async fn synthesize(&self, results: &[IntermediaryResult], prompt: &str) -> Outcome {
        let facts: Vec<(String, &str)> = results
            .iter()
            .map(|r| {
                let text = match &r.answer {
                    Outcome::Text(text) => text.as_str(),
                    Outcome::Failed(_) => prompts::NO_FACTS_PLACEHOLDER,
                };
                (r.form.clone(), text)
            })
            .collect();

        info!(documents = facts.len(), "[HOLISTIC] Starting phase 2 (synthesis)");
        let combined = prompts::synthesis_prompt(&facts, prompt);
        debug!(prompt = %combined, "[HOLISTIC] Synthesis prompt built");
        self.client.complete(&combined).await
    }
}
