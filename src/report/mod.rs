// SPDX-License-Identifier: PMPL-1.0-or-later
//! Run report and its renderings.
//!
//! Supports multiple output formats:
//! - Text: per-technique outcome with the failing/warning evidence
//! - JSON: the report itself, for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use crate::technique::{EvaluationResult, Tally, TechniqueState, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Report type tag
pub const REPORT_TYPE: &str = "css-techniques";

/// Result of one orchestrator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "type")]
    pub kind: String,
    /// One increment per executed technique, by outcome
    pub metadata: Tally,
    /// Post-run state keyed by technique code
    pub assertions: BTreeMap<String, TechniqueState>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            kind: REPORT_TYPE.to_string(),
            metadata: Tally::default(),
            assertions: BTreeMap::new(),
        }
    }
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a technique's final state and count its outcome
    pub fn add(&mut self, state: TechniqueState) {
        self.metadata.increment(state.outcome());
        self.assertions.insert(state.code.clone(), state);
    }

    pub fn get(&self, code: &str) -> Option<&TechniqueState> {
        self.assertions.get(code)
    }

    /// Whether some technique ended with a `failed` outcome
    pub fn has_failures(&self) -> bool {
        self.metadata.failed > 0
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render a report in the requested format
pub fn render(report: &Report, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report),
        OutputFormat::Sarif => render_sarif(report),
    }
}

fn render_text(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("=== CSS Techniques Report ===\n\n");

    if report.assertions.is_empty() {
        output.push_str("No techniques were executed.\n");
        return output;
    }

    let m = &report.metadata;
    output.push_str(&format!(
        "{} technique(s): {} passed, {} warning, {} failed, {} inapplicable\n\n",
        m.total(),
        m.passed,
        m.warning,
        m.failed,
        m.inapplicable
    ));

    for (code, state) in &report.assertions {
        output.push_str(&format!(
            "[{}] {} ({}) - {}\n",
            code,
            state.name,
            state.mapping,
            state.outcome().as_str().to_uppercase()
        ));
        if !state.metadata.description.is_empty() {
            output.push_str(&format!("  {}\n", state.metadata.description));
        }

        for result in flagged(&state.results) {
            output.push_str(&format!("  - {}: {}\n", result.verdict, result.description));
            if let Some(evidence) = result.evidence() {
                output.push_str(&format!(
                    "    {} {{ {}: {} }}",
                    evidence.selector.value, evidence.property.name, evidence.property.value
                ));
                if let Some(file) = &evidence.stylesheet_file {
                    output.push_str(&format!(" in {}", file));
                }
                output.push('\n');
            }
        }
        output.push('\n');
    }

    if report.has_failures() {
        output.push_str("RESULT: FAIL\n");
    } else if m.warning > 0 {
        output.push_str("RESULT: PASS WITH WARNINGS\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}

fn flagged(results: &[EvaluationResult]) -> impl Iterator<Item = &EvaluationResult> {
    results
        .iter()
        .filter(|r| matches!(r.verdict, Verdict::Failed | Verdict::Warning))
}

fn render_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize report: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    help_uri: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_column: Option<u32>,
}

fn render_sarif(report: &Report) -> String {
    let rules = report
        .assertions
        .values()
        .map(|state| SarifRule {
            id: state.code.clone(),
            name: state.name.clone(),
            short_description: SarifMessage {
                text: state.description.clone(),
            },
            help_uri: state.metadata.url.clone(),
        })
        .collect();

    let results = report
        .assertions
        .values()
        .flat_map(|state| flagged(&state.results).map(move |r| sarif_result(&state.code, r)))
        .collect();

    let sarif = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "css-techniques".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&sarif).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}

fn sarif_result(code: &str, result: &EvaluationResult) -> SarifResult {
    let level = match result.verdict {
        Verdict::Failed => "error",
        _ => "warning",
    };

    let mut locations = Vec::new();
    if let Some(evidence) = result.evidence() {
        if let Some(file) = &evidence.stylesheet_file {
            let start = evidence
                .property
                .position
                .as_ref()
                .or(evidence.selector.position.as_ref())
                .and_then(|p| p.start);
            locations.push(SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation { uri: file.clone() },
                    region: start.map(|l| SarifRegion {
                        start_line: l.line,
                        start_column: Some(l.column).filter(|c| *c > 0),
                    }),
                },
            });
        }
    }

    SarifResult {
        rule_id: code.to_string(),
        level: level.to_string(),
        message: SarifMessage {
            text: result.description.clone(),
        },
        locations,
    }
}
