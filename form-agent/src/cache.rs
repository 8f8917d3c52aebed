//! Memoisation around the orchestrator, owned by the session.
//!
//! Keys are typed so that a form name containing the separator can never
//! collide with another (form, question) pair. The holistic key sorts the
//! form set, so the same selection in a different order hits the same entry.
//! Failures are never stored; asking again reaches the model again.

use std::collections::HashMap;

use form_agent_core::{HolisticResult, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QaKey {
    form: String,
    question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummaryKey {
    form: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HolisticKey {
    forms: Vec<String>,
    prompt: String,
}

pub fn qa_key(form: &str, question: &str) -> QaKey {
    QaKey {
        form: form.to_string(),
        question: question.to_string(),
    }
}

pub fn summary_key(form: &str) -> SummaryKey {
    SummaryKey {
        form: form.to_string(),
    }
}

pub fn holistic_key<S: AsRef<str>>(forms: &[S], prompt: &str) -> HolisticKey {
    let mut forms: Vec<String> = forms.iter().map(|f| f.as_ref().to_string()).collect();
    forms.sort();
    HolisticKey {
        forms,
        prompt: prompt.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct AnalysisCache {
    answers: HashMap<QaKey, Outcome>,
    summaries: HashMap<SummaryKey, Outcome>,
    holistic: HashMap<HolisticKey, HolisticResult>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, key: &QaKey) -> Option<&Outcome> {
        self.answers.get(key)
    }

    pub fn store_answer(&mut self, key: QaKey, answer: &Outcome) {
        if !answer.is_failed() {
            self.answers.insert(key, answer.clone());
        }
    }

    pub fn summary(&self, key: &SummaryKey) -> Option<&Outcome> {
        self.summaries.get(key)
    }

    pub fn store_summary(&mut self, key: SummaryKey, summary: &Outcome) {
        if !summary.is_failed() {
            self.summaries.insert(key, summary.clone());
        }
    }

    pub fn holistic(&self, key: &HolisticKey) -> Option<&HolisticResult> {
        self.holistic.get(key)
    }

    pub fn store_holistic(&mut self, key: HolisticKey, result: &HolisticResult) {
        if !result.final_synthesis.is_failed() {
            self.holistic.insert(key, result.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len() + self.summaries.len() + self.holistic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
