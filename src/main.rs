// SPDX-License-Identifier: PMPL-1.0-or-later
//! css-techniques CLI - WCAG CSS technique evaluator

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use css_techniques::config::{load_config, Configuration};
use css_techniques::report::{render, OutputFormat};
use css_techniques::stylesheet::load_stylesheets;
use css_techniques::{DomContext, EvaluationInput, MappedDom, TechniqueRegistry, TechniqueRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Evaluate stylesheets against WCAG CSS techniques
#[derive(Parser)]
#[command(name = "css-techniques")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the enabled techniques against a set of stylesheets
    Check {
        /// JSON file with one parsed stylesheet or an array of them
        stylesheets: PathBuf,

        /// Mapped DOM as JSON (enables element techniques)
        #[arg(long, conflicts_with = "html")]
        dom: Option<PathBuf>,

        /// HTML page to map into a DOM (enables element techniques)
        #[arg(long)]
        html: Option<PathBuf>,

        #[command(flatten)]
        selection: Selection,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the technique catalog and which techniques are enabled
    List {
        #[command(flatten)]
        selection: Selection,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Technique selection shared by every command
#[derive(clap::Args)]
struct Selection {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(long, default_value = ".css-techniques.yml")]
    config: PathBuf,

    /// WCAG principle to check (repeatable)
    #[arg(long = "principle")]
    principles: Vec<String>,

    /// WCAG conformance level to check (repeatable)
    #[arg(long = "level")]
    levels: Vec<String>,

    /// Technique code or mapping to check (repeatable)
    #[arg(long = "technique")]
    techniques: Vec<String>,
}

impl Selection {
    /// File configuration with command-line lists taking precedence
    fn resolve(self) -> anyhow::Result<Configuration> {
        let file = load_config(&self.config)
            .with_context(|| format!("reading configuration {}", self.config.display()))?;
        Ok(file.merge(Configuration {
            principles: self.principles,
            levels: self.levels,
            techniques: self.techniques,
        }))
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("css_techniques=debug")
    } else {
        EnvFilter::new("css_techniques=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { stylesheets, dom, html, selection, format, output, verbose } => {
            init_logging(verbose);
            let config = selection.resolve()?;

            let sheets = load_stylesheets(&stylesheets)
                .with_context(|| format!("reading stylesheets {}", stylesheets.display()))?;
            let mut input = EvaluationInput::new(sheets);
            if let Some(dom) = load_dom(dom.as_deref(), html.as_deref())? {
                input = input.with_dom(dom);
            }

            let mut runner = TechniqueRunner::new(Some(&config));
            let report = runner.execute(input).await;
            write_output(&render(&report, format.into()), output.as_deref())?;

            if report.has_failures() {
                std::process::exit(1);
            }
        }

        Commands::List { selection, verbose } => {
            init_logging(verbose);
            let config = selection.resolve()?;

            let mut registry = TechniqueRegistry::with_defaults();
            registry.configure(&config);
            for entry in registry.entries() {
                let criteria: Vec<String> = entry
                    .descriptor
                    .success_criteria
                    .iter()
                    .map(|sc| format!("{} {}", sc.name, sc.level))
                    .collect();
                println!(
                    "{} {:<10} {:<8} {}  [{}]",
                    if entry.enabled { "+" } else { "-" },
                    entry.code,
                    entry.mapping,
                    entry.descriptor.name,
                    criteria.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Load a mapped DOM from JSON, or map one from an HTML page
fn load_dom(json: Option<&Path>, html: Option<&Path>) -> anyhow::Result<Option<Arc<dyn DomContext>>> {
    let dom = match (json, html) {
        (Some(path), _) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading DOM map {}", path.display()))?;
            let dom = MappedDom::from_json(&content)?;
            if let Err(e) = dom.validate() {
                warn!(error = %e, "DOM map is incomplete");
            }
            dom
        }
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading HTML page {}", path.display()))?;
            MappedDom::from_html(&content)
        }
        (None, None) => return Ok(None),
    };
    Ok(Some(Arc::new(dom)))
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
