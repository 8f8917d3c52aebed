/// `load_config` module: Loads a static YAML config into the typed [`AppConfig`].
///
/// Secrets never live in this file; the Gemini key is read from the
/// environment when the client is built (see [`crate::gemini`]).
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics,
/// and are surfaced at the CLI boundary.
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use form_agent_core::analysis::DEFAULT_SUMMARY_LENGTH;
use form_agent_core::ocr::DEFAULT_LANGUAGE;
use form_agent_core::pacing::{FixedDelay, MinInterval, Pacing};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::gemini::GeminiConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: GeminiConfig,
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub ocr: OcrSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisSection {
    #[serde(default = "default_summary_max_length")]
    pub summary_max_length: usize,
    #[serde(default)]
    pub pacing: PacingSection,
}

fn default_summary_max_length() -> usize {
    DEFAULT_SUMMARY_LENGTH
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            summary_max_length: default_summary_max_length(),
            pacing: PacingSection::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingKind {
    #[default]
    Fixed,
    MinInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PacingSection {
    #[serde(default)]
    pub kind: PacingKind,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for PacingSection {
    fn default() -> Self {
        Self {
            kind: PacingKind::default(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl PacingSection {
    pub fn build(&self) -> Pacing {
        let interval = Duration::from_millis(self.interval_ms);
        match self.kind {
            PacingKind::Fixed => Pacing::Fixed(FixedDelay(interval)),
            PacingKind::MinInterval => Pacing::MinInterval(MinInterval::new(interval)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OcrSection {
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

impl AppConfig {
    pub fn trace_loaded(&self) {
        info!(
            model = %self.llm.model,
            pacing = ?self.analysis.pacing.kind,
            interval_ms = self.analysis.pacing.interval_ms,
            "Loaded Config"
        );
        debug!(config = ?self, "Config loaded (full debug)");
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file means "all defaults".
    if config_content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    let config: AppConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config.trace_loaded();
    Ok(config)
}
