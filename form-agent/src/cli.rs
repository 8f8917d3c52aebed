///
/// This module implements the CLI interface for form-agent: command parsing,
/// argument validation, and the async entrypoint used by `main` and tests.
///
/// All extraction and orchestration logic lives in the [`form-agent-core`] crate;
/// this module only wires files, config, the Gemini client and the session together.
///
/// ## How To Use
/// - For command-line users: run the `form-agent` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`form-agent-core`]: ../../form-agent-core/
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use form_agent_core::contract::{LlmClient, OcrEngine, Pacer};
use form_agent_core::ocr::TesseractOcr;
use form_agent_core::{DocumentKind, Extractor, FormAnalyst, Outcome};

use crate::gemini::GeminiClient;
use crate::load_config::{load_config, AppConfig};
use crate::report::{SessionReport, DEFAULT_REPORT_FILE};
use crate::session::{QaResult, Session, SummaryResult};

/// CLI for form-agent: extract text from forms and analyse them with a hosted LLM.
#[derive(Parser)]
#[clap(
    name = "form-agent",
    version,
    about = "Extract text from forms (PDF/TXT/images) and answer, summarise or compare them with Gemini"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write a JSON session report when the command finishes
    /// (defaults to intelligent_form_report.json when no path is given)
    #[clap(long, global = true, num_args = 0..=1, default_missing_value = DEFAULT_REPORT_FILE)]
    pub report: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract and print the text of each file (no API key needed)
    Extract {
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },
    /// Answer one or more questions from a single form
    Ask {
        #[clap(long)]
        file: PathBuf,
        #[clap(long = "question", required = true)]
        questions: Vec<String>,
    },
    /// Summarise a single form
    Summarize {
        #[clap(long)]
        file: PathBuf,
        /// Advisory length hint passed to the model
        #[clap(long)]
        max_length: Option<usize>,
    },
    /// Holistic analysis across two or more forms
    Compare {
        #[clap(long = "file", required = true, num_args = 1)]
        files: Vec<PathBuf>,
        #[clap(long)]
        prompt: String,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    let ocr = TesseractOcr::with_language(config.ocr.language.clone());
    tracing::debug!(language = ocr.language(), "OCR backend configured");

    match cli.command {
        Commands::Extract { files } => {
            tracing::info!(command = "extract", files = files.len(), "Starting extraction");
            extract_files(&files, ocr, cli.report.as_deref())
        }
        Commands::Ask { file, questions } => {
            let mut session = build_session(&config, ocr)?;
            let form = load_into(&mut session, &file)?;
            let mut failures = 0;
            for question in &questions {
                let answer = session.ask(&form, question).await;
                println!("Q: {question}");
                failures += print_outcome(&format!("A ({form})"), &answer);
            }
            finish(&session.report(), cli.report.as_deref(), failures)
        }
        Commands::Summarize { file, max_length } => {
            let mut session = build_session(&config, ocr)?;
            if let Some(max_length) = max_length {
                session = session.with_summary_max_length(max_length);
            }
            let form = load_into(&mut session, &file)?;
            let summary = session.summarize(&form).await;
            let failures = print_outcome(&format!("Summary of {form}"), &summary);
            finish(&session.report(), cli.report.as_deref(), failures)
        }
        Commands::Compare { files, prompt } => {
            let mut session = build_session(&config, ocr)?;
            let mut names = Vec::new();
            for file in &files {
                // Forms that fail extraction are reported and left out.
                match load_into(&mut session, file) {
                    Ok(name) => names.push(name),
                    Err(e) => eprintln!("{e}"),
                }
            }
            match session.holistic(names.as_slice(), &prompt).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    let failures = usize::from(result.final_synthesis.is_failed());
                    finish(&session.report(), cli.report.as_deref(), failures)
                }
                Err(rejected) => {
                    eprintln!("Analysis Error: {}", rejected.error);
                    finish(&session.report(), cli.report.as_deref(), 1)
                }
            }
        }
    }
}

fn build_session(config: &AppConfig, ocr: TesseractOcr) -> Result<Session<GeminiClient>> {
    // The only hard failure: without credentials nothing can run.
    let client = GeminiClient::new_from_env(&config.llm)
        .context("Failed to initialize Intelligent Form Agent")?;
    let analyst = FormAnalyst::with_pacer(client, config.analysis.pacing.build());
    Ok(Session::new(analyst, Extractor::with_ocr(ocr))
        .with_summary_max_length(config.analysis.summary_max_length))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_into<C: LlmClient, P: Pacer, O: OcrEngine>(
    session: &mut Session<C, P, O>,
    path: &Path,
) -> Result<String> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = file_name(path);
    match session.load_form(&name, &content) {
        Outcome::Failed(reason) => anyhow::bail!("Error processing {name}: {reason}"),
        Outcome::Text(text) => {
            eprintln!(
                "Successfully processed {name}. Extracted {} characters.",
                text.chars().count()
            );
            Ok(name)
        }
    }
}

fn extract_files<O: OcrEngine>(files: &[PathBuf], ocr: O, report: Option<&Path>) -> Result<()> {
    let extractor = Extractor::with_ocr(ocr);
    let mut documents = Vec::new();
    let mut failures = 0;
    for path in files {
        let name = file_name(path);
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = ?e, path = %path.display(), "Failed to read file");
                failures += print_outcome(
                    &name,
                    &Outcome::failed(format!("Error reading {}: {e}", path.display())),
                );
                continue;
            }
        };
        let kind = DocumentKind::from_file_name(&name);
        let text = extractor.extract(&content, &kind);
        failures += print_outcome(&name, &text);
        documents.push(form_agent_core::Document::new(name, kind, text));
    }
    let report_data = SessionReport::build(
        &documents,
        &QaResult::default(),
        &SummaryResult::default(),
        None,
    );
    finish(&report_data, report, failures)
}

/// Print an outcome under a heading; returns 1 for a failure, 0 otherwise.
fn print_outcome(heading: &str, outcome: &Outcome) -> usize {
    match outcome {
        Outcome::Text(text) => {
            println!("== {heading} ==\n{text}");
            0
        }
        Outcome::Failed(reason) => {
            eprintln!("== {heading} ==\n{reason}");
            1
        }
    }
}

fn finish(report_data: &SessionReport, report: Option<&Path>, failures: usize) -> Result<()> {
    if let Some(path) = report {
        report_data.write_to(path)?;
    }
    if failures > 0 {
        anyhow::bail!("{failures} operation(s) failed");
    }
    Ok(())
}
