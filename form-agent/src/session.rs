//! # session: the in-memory working set of one user session
//!
//! A [`Session`] holds the extracted documents (in upload order), the most
//! recent Q&A / summary / holistic results, and an optional [`AnalysisCache`].
//! All analysis goes through the [`FormAnalyst`]; the cache only skips calls
//! whose answer is already known, so a session without one behaves the same,
//! just with more remote calls.
//!
//! Nothing is persisted; dropping the session discards everything.

use form_agent_core::analysis::DEFAULT_SUMMARY_LENGTH;
use form_agent_core::contract::{LlmClient, OcrEngine, Pacer};
use form_agent_core::document::extension;
use form_agent_core::ocr::TesseractOcr;
use form_agent_core::pacing::Pacing;
use form_agent_core::{
    AnalysisRejected, Document, DocumentKind, Extractor, FormAnalyst, HolisticResult, Outcome,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::{holistic_key, qa_key, summary_key, AnalysisCache};
use crate::report::SessionReport;

pub const MIN_HOLISTIC_FORMS: usize = 2;

/// The current single-form Q&A result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaResult {
    pub question: String,
    pub answer: Outcome,
    pub form: String,
}

impl Default for QaResult {
    fn default() -> Self {
        Self {
            question: String::new(),
            answer: Outcome::text(""),
            form: String::new(),
        }
    }
}

/// The current summary and the form it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    pub form: String,
    pub summary: Outcome,
}

impl Default for SummaryResult {
    fn default() -> Self {
        Self {
            form: String::new(),
            summary: Outcome::text(""),
        }
    }
}

pub struct Session<C, P = Pacing, O = TesseractOcr> {
    analyst: FormAnalyst<C, P>,
    extractor: Extractor<O>,
    forms: Vec<Document>,
    cache: Option<AnalysisCache>,
    summary_max_length: usize,
    qa_result: QaResult,
    summary_result: SummaryResult,
    holistic_result: Option<Result<HolisticResult, AnalysisRejected>>,
}

impl<C: LlmClient, P: Pacer, O: OcrEngine> Session<C, P, O> {
    pub fn new(analyst: FormAnalyst<C, P>, extractor: Extractor<O>) -> Self {
        Self {
            analyst,
            extractor,
            forms: Vec::new(),
            cache: Some(AnalysisCache::new()),
            summary_max_length: DEFAULT_SUMMARY_LENGTH,
            qa_result: QaResult::default(),
            summary_result: SummaryResult::default(),
            holistic_result: None,
        }
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn with_summary_max_length(mut self, max_length: usize) -> Self {
        self.summary_max_length = max_length;
        self
    }

    pub fn cache(&self) -> Option<&AnalysisCache> {
        self.cache.as_ref()
    }

    /// Extract an upload and keep it when extraction succeeded.
    ///
    /// A name that is already loaded is not extracted again.
    pub fn load_form(&mut self, name: &str, content: &[u8]) -> Outcome {
        if let Some(existing) = self.form(name) {
            info!(form = %name, "[SESSION] Form already loaded, skipping extraction");
            return existing.text.clone();
        }

        let ext = extension(name);
        if matches!(ext.as_str(), "doc" | "docx") {
            warn!(form = %name, "[SESSION] Word documents are not extracted");
            return Outcome::failed(format!(
                "Error: File type .{ext} not supported for automated extraction."
            ));
        }

        let kind = DocumentKind::from_extension(&ext);
        let text = self.extractor.extract(content, &kind);
        if text.is_failed() {
            error!(form = %name, reason = %text, "[SESSION][ERROR] Form could not be processed");
            return text;
        }

        info!(form = %name, chars = text.as_str().chars().count(), "[SESSION] Form processed");
        self.forms.push(Document::new(name, kind, text.clone()));
        text
    }

    pub fn forms(&self) -> &[Document] {
        &self.forms
    }

    pub fn form(&self, name: &str) -> Option<&Document> {
        self.forms.iter().find(|d| d.name == name)
    }

    pub async fn ask(&mut self, form: &str, question: &str) -> Outcome {
        let key = qa_key(form, question);
        let cached = self.cache.as_ref().and_then(|c| c.answer(&key)).cloned();

        let answer = match cached {
            Some(answer) => {
                info!(form = %form, "[SESSION] Answer served from cache");
                answer
            }
            None => {
                let answer = match self.form(form) {
                    None => Outcome::failed(format!("Error: Form {form} is not loaded.")),
                    Some(doc) if doc.text.usable_text().is_none() => {
                        Outcome::failed(format!("Error: No usable text extracted from {form}."))
                    }
                    Some(doc) => self.analyst.answer_question(&doc.text, question).await,
                };
                if let Some(cache) = self.cache.as_mut() {
                    cache.store_answer(key, &answer);
                }
                answer
            }
        };

        self.qa_result = QaResult {
            question: question.to_string(),
            answer: answer.clone(),
            form: form.to_string(),
        };
        answer
    }

    pub async fn summarize(&mut self, form: &str) -> Outcome {
        let key = summary_key(form);
        let cached = self.cache.as_ref().and_then(|c| c.summary(&key)).cloned();

        let summary = match cached {
            Some(summary) => {
                info!(form = %form, "[SESSION] Summary served from cache");
                summary
            }
            None => {
                let summary = match self.form(form) {
                    None => Outcome::failed(format!("Error: Form {form} is not loaded.")),
                    Some(doc) if doc.text.usable_text().is_none() => {
                        Outcome::failed(format!("Error: No usable text extracted from {form}."))
                    }
                    Some(doc) => {
                        self.analyst
                            .generate_summary(&doc.text, self.summary_max_length)
                            .await
                    }
                };
                if let Some(cache) = self.cache.as_mut() {
                    cache.store_summary(key, &summary);
                }
                summary
            }
        };

        self.summary_result = SummaryResult {
            form: form.to_string(),
            summary: summary.clone(),
        };
        summary
    }

    /// Holistic analysis over the named forms, in the order given. Repeated
    /// names count once.
    ///
    /// Needs at least two loaded forms and a non-blank prompt; otherwise it is
    /// rejected without touching the model or the current result.
    pub async fn holistic<S: AsRef<str>>(
        &mut self,
        forms: &[S],
        prompt: &str,
    ) -> Result<HolisticResult, AnalysisRejected> {
        let mut distinct: Vec<&str> = Vec::with_capacity(forms.len());
        for name in forms {
            if !distinct.contains(&name.as_ref()) {
                distinct.push(name.as_ref());
            }
        }
        if distinct.len() < MIN_HOLISTIC_FORMS {
            warn!(selected = distinct.len(), "[SESSION] Too few forms for holistic analysis");
            return Err(AnalysisRejected::new(
                "Please select at least two forms to perform a Holistic Analysis.",
            ));
        }
        if prompt.trim().is_empty() {
            return Err(AnalysisRejected::new("A holistic prompt is required."));
        }

        let mut contexts = Vec::with_capacity(distinct.len());
        for name in &distinct {
            match self.form(name) {
                Some(doc) => contexts.push(doc.text.clone()),
                None => return Err(AnalysisRejected::new(format!("Form {name} is not loaded."))),
            }
        }

        let key = holistic_key(distinct.as_slice(), prompt);
        let cached = self.cache.as_ref().and_then(|c| c.holistic(&key)).cloned();
        let result = match cached {
            Some(result) => {
                info!("[SESSION] Holistic result served from cache");
                Ok(result)
            }
            None => {
                let result = self.analyst.holistic_analysis(&contexts, prompt).await;
                if let (Some(cache), Ok(done)) = (self.cache.as_mut(), result.as_ref()) {
                    cache.store_holistic(key, done);
                }
                result
            }
        };

        self.holistic_result = Some(result.clone());
        result
    }

    pub fn qa_result(&self) -> &QaResult {
        &self.qa_result
    }

    pub fn summary_result(&self) -> &SummaryResult {
        &self.summary_result
    }

    pub fn holistic_result(&self) -> Option<&Result<HolisticResult, AnalysisRejected>> {
        self.holistic_result.as_ref()
    }

    pub fn report(&self) -> SessionReport {
        SessionReport::build(
            &self.forms,
            &self.qa_result,
            &self.summary_result,
            self.holistic_result.as_ref(),
        )
    }
}
