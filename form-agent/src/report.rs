//! JSON report of a session: what was loaded and the latest result of each
//! analysis. Written by the CLI's `--report` flag.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use form_agent_core::document::extension;
use form_agent_core::{AnalysisRejected, Document, HolisticResult, Outcome};
use serde::Serialize;
use tracing::info;

use crate::session::{QaResult, SummaryResult};

pub const DEFAULT_REPORT_FILE: &str = "intelligent_form_report.json";
pub const NO_RESULT: &str = "No result generated.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormReport {
    pub text_length: usize,
    pub status: &'static str,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HolisticReport {
    Message(String),
    Completed {
        final_synthesis: Outcome,
        structured_data: BTreeMap<String, serde_json::Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub forms_data: BTreeMap<String, FormReport>,
    pub single_form_qa_result: QaResult,
    pub form_summary_result: SummaryResult,
    pub holistic_analysis_result: HolisticReport,
}

impl SessionReport {
    pub fn build(
        forms: &[Document],
        qa: &QaResult,
        summary: &SummaryResult,
        holistic: Option<&Result<HolisticResult, AnalysisRejected>>,
    ) -> Self {
        let forms_data = forms
            .iter()
            .map(|doc| {
                let report = FormReport {
                    text_length: doc.text.as_str().chars().count(),
                    status: if doc.text.is_failed() { "Error" } else { "Processed" },
                    file_type: extension(&doc.name),
                };
                (doc.name.clone(), report)
            })
            .collect();

        let holistic_analysis_result = match holistic {
            None => HolisticReport::Message(NO_RESULT.to_string()),
            Some(Err(rejected)) => HolisticReport::Message(format!("Error: {}", rejected.error)),
            Some(Ok(result)) => HolisticReport::Completed {
                final_synthesis: result.final_synthesis.clone(),
                structured_data: result.structured_data.clone(),
            },
        };

        Self {
            forms_data,
            single_form_qa_result: qa.clone(),
            form_summary_result: summary.clone(),
            holistic_analysis_result,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialise session report")
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(report_path = %path.display(), forms = self.forms_data.len(), "Report written");
        Ok(())
    }
}
