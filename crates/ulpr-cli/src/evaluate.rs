//! The `ulpr` command: score one lesson plan.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use ulpr_core::report::round_points;
use ulpr_core::response::truncate_chars;
use ulpr_core::{format_markdown_report, MarkdownOptions};
use ulpr_runtime::{build_evaluator, read_lesson_text, BackendKind, Evaluation, RuntimeConfig};

use crate::logging::LoggingArgs;

/// Lesson characters handed to the report excerpt.
const LESSON_EXCERPT_CHARS: usize = 3000;

/// Report characters echoed to the console.
const PREVIEW_CHARS: usize = 3000;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Ollama,
    Hf,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Ollama => BackendKind::Ollama,
            BackendArg::Hf => BackendKind::Hf,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ulpr", version, about = "Unified Lesson Plan Evaluator (ULPR)")]
pub struct EvaluateCli {
    /// Path to lesson plan text/markdown OR raw text
    #[arg(long)]
    pub lesson: String,

    /// Model backend [default: ollama]
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Model name (ollama: llama3.1). For hf the generation server decides
    /// the model and this name is only recorded
    #[arg(long)]
    pub model: Option<String>,

    /// Write Markdown report to this path
    #[arg(long)]
    pub md_out: Option<PathBuf>,

    /// Write raw model JSON to this path
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Write the scored breakdown as JSON to this path
    #[arg(long)]
    pub scorecard_out: Option<PathBuf>,

    /// Ollama chat endpoint [default: http://localhost:11434/api/chat]
    #[arg(long)]
    pub ollama_url: Option<String>,

    /// Hugging Face generate endpoint [default: http://localhost:8080/generate]
    #[arg(long)]
    pub hf_url: Option<String>,

    /// YAML configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

impl EvaluateCli {
    /// Configuration from `--config` (or defaults) with flags applied.
    pub fn resolve_config(&self) -> Result<RuntimeConfig> {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RuntimeConfig::default(),
        };

        if let Some(backend) = self.backend {
            config.backend = backend.into();
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(url) = &self.ollama_url {
            config.ollama.url = url.clone();
        }
        if let Some(url) = &self.hf_url {
            config.hf.url = url.clone();
        }
        Ok(config)
    }

    /// Whether to ask the backend for a health check before querying it.
    pub fn checks_backend_first(&self) -> bool {
        self.logging.verbose
    }
}

/// First `max` characters, with an ellipsis line when cut.
pub fn preview(text: &str, max: usize) -> String {
    let mut shown = truncate_chars(text, max);
    if text.chars().count() > max {
        shown.push_str("\n…\n");
    }
    shown
}

/// Render the report, write every requested file and print the summary.
/// Returns the Markdown report.
pub fn emit(cli: &EvaluateCli, evaluation: &Evaluation, lesson_text: &str) -> Result<String> {
    let scorecard = &evaluation.scorecard;
    let excerpt = truncate_chars(lesson_text, LESSON_EXCERPT_CHARS);
    let report_md = format_markdown_report(scorecard, &excerpt, &MarkdownOptions::default());

    println!("\nULPR Total: {} / 100\n", round_points(scorecard.totals.total));

    if let Some(path) = &cli.json_out {
        let json = serde_json::to_string_pretty(&Value::Object(evaluation.model_json.clone()))?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Saved JSON → {}", path.display());
    }

    if let Some(path) = &cli.md_out {
        fs::write(path, &report_md).with_context(|| format!("writing {}", path.display()))?;
        println!("Saved Markdown report → {}", path.display());
    }

    if let Some(path) = &cli.scorecard_out {
        let json = serde_json::to_string_pretty(scorecard)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Saved scorecard → {}", path.display());
    }

    println!("\n=== Report Preview ===\n");
    println!("{}", preview(&report_md, PREVIEW_CHARS));

    Ok(report_md)
}

/// Run one evaluation end to end.
pub async fn run(cli: EvaluateCli) -> Result<()> {
    let lesson_text = read_lesson_text(&cli.lesson)
        .with_context(|| format!("reading lesson {}", cli.lesson))?;

    let config = cli.resolve_config()?;
    let evaluator = build_evaluator(&config)?;

    if cli.checks_backend_first() && !evaluator.backend_reachable().await {
        tracing::warn!(
            backend = evaluator.backend_name(),
            "backend did not answer its health check, trying anyway"
        );
    }

    eprintln!("→ Querying model…");
    let evaluation = evaluator.evaluate(&lesson_text).await?;

    emit(&cli, &evaluation, &lesson_text)?;
    Ok(())
}
