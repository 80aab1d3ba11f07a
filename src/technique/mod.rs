// SPDX-License-Identifier: PMPL-1.0-or-later
//! The technique contract shared by every check.
//!
//! A technique is built once from an immutable [`Descriptor`], accumulates
//! [`EvaluationResult`]s while it executes, and hands out an independent
//! [`TechniqueState`] snapshot when asked for its final results. The live
//! instance is then [`reset`](Technique::reset) and reused for the next run.

pub mod outcome;

pub use outcome::{aggregate, Outcome};

use crate::dom::DomContext;
use crate::error::Result;
use crate::stylesheet::{Declaration, Position, RuleBlock, Stylesheet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-finding classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
    Warning,
    Inapplicable,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Passed => "passed",
            Verdict::Failed => "failed",
            Verdict::Warning => "warning",
            Verdict::Inapplicable => "inapplicable",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WCAG principle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principle {
    Perceivable,
    Operable,
    Understandable,
    Robust,
}

impl Principle {
    pub const ALL: [Principle; 4] = [
        Principle::Perceivable,
        Principle::Operable,
        Principle::Understandable,
        Principle::Robust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Principle::Perceivable => "Perceivable",
            Principle::Operable => "Operable",
            Principle::Understandable => "Understandable",
            Principle::Robust => "Robust",
        }
    }
}

/// WCAG conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level A - minimum conformance
    A,
    /// Level AA - standard conformance
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl WcagLevel {
    pub const ALL: [WcagLevel; 3] = [WcagLevel::A, WcagLevel::AA, WcagLevel::AAA];

    pub fn as_str(&self) -> &'static str {
        match self {
            WcagLevel::A => "A",
            WcagLevel::AA => "AA",
            WcagLevel::AAA => "AAA",
        }
    }
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External guideline a technique maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessCriterion {
    /// Criterion number, e.g. "1.4.4"
    pub name: String,
    pub level: WcagLevel,
    pub principle: Principle,
    pub url: String,
}

impl SuccessCriterion {
    pub fn new(name: &str, level: WcagLevel, principle: Principle, url: &str) -> Self {
        Self {
            name: name.to_string(),
            level,
            principle,
            url: url.to_string(),
        }
    }
}

/// Element/attribute a technique inspects (informational only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub element: String,
    pub attributes: Vec<String>,
}

impl Target {
    pub fn new(element: &str, attributes: &[&str]) -> Self {
        Self {
            element: element.to_string(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Static description of a technique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    pub code: String,
    /// Cross-reference into the W3C technique catalog
    pub mapping: String,
    pub description: String,
    pub target: Target,
    pub success_criteria: Vec<SuccessCriterion>,
    pub related: Vec<String>,
    pub url: Option<String>,
}

impl Descriptor {
    /// True if some success criterion has its principle in `principles` and
    /// its level in `levels`. Inputs are expected to be normalized already.
    pub fn has_principle_and_levels(&self, principles: &[String], levels: &[String]) -> bool {
        self.success_criteria.iter().any(|sc| {
            principles.iter().any(|p| p == sc.principle.as_str())
                && levels.iter().any(|l| l == sc.level.as_str())
        })
    }
}

/// Selector the verdict was reached on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorEvidence {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Property/value pair that triggered the verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEvidence {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Pointer back into the inspected input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet_file: Option<String>,
    pub selector: SelectorEvidence,
    pub property: PropertyEvidence,
}

impl Evidence {
    pub fn new(selector: impl Into<String>, property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            css_code: None,
            stylesheet_file: None,
            selector: SelectorEvidence {
                value: selector.into(),
                position: None,
            },
            property: PropertyEvidence {
                name: property.into(),
                value: value.into(),
                position: None,
            },
        }
    }

    /// Evidence pointing at `declaration` inside `block` of stylesheet `file`
    pub fn from_declaration(file: &str, block: RuleBlock<'_>, declaration: &Declaration) -> Self {
        Self {
            css_code: Some(block.to_css()),
            stylesheet_file: Some(file.to_string()),
            selector: SelectorEvidence {
                value: block.selector_text(),
                position: block.position().cloned(),
            },
            property: PropertyEvidence {
                name: declaration.property.clone(),
                value: declaration.value.clone(),
                position: declaration.position.clone(),
            },
        }
    }

    pub fn with_css_code(mut self, css_code: impl Into<String>) -> Self {
        self.css_code = Some(css_code.into());
        self
    }

    fn is_complete(&self) -> bool {
        !self.selector.value.is_empty() && !self.property.name.is_empty() && !self.property.value.is_empty()
    }
}

/// One finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub verdict: Verdict,
    pub description: String,
    #[serde(flatten)]
    evidence: Option<Evidence>,
}

impl EvaluationResult {
    pub fn new(verdict: Verdict, description: &str) -> Self {
        Self {
            verdict,
            description: description.to_string(),
            evidence: None,
        }
    }

    /// Attach evidence.
    ///
    /// Inapplicable results never carry evidence, and evidence lacking a
    /// selector, property name or property value is dropped as a whole.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        if self.verdict != Verdict::Inapplicable && evidence.is_complete() {
            self.evidence = Some(evidence);
        }
        self
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }
}

/// Verdict counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub passed: u32,
    pub warning: u32,
    pub failed: u32,
    pub inapplicable: u32,
}

impl Tally {
    pub fn increment(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Warning => self.warning += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::Inapplicable => self.inapplicable += 1,
        }
    }

    pub fn count(&self, verdict: Verdict) -> u32 {
        match verdict {
            Verdict::Passed => self.passed,
            Verdict::Warning => self.warning,
            Verdict::Failed => self.failed,
            Verdict::Inapplicable => self.inapplicable,
        }
    }

    pub fn total(&self) -> u32 {
        self.passed + self.warning + self.failed + self.inapplicable
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Run metadata of a technique snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechniqueMetadata {
    pub target: Target,
    #[serde(rename = "success-criteria")]
    pub success_criteria: Vec<SuccessCriterion>,
    pub related: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub tally: Tally,
    pub outcome: Option<Verdict>,
    pub description: String,
}

/// Post-run snapshot of a technique: descriptor, tally, results and outcome.
///
/// Owns all of its data; nothing is shared with the live technique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechniqueState {
    pub name: String,
    pub code: String,
    pub mapping: String,
    pub description: String,
    pub metadata: TechniqueMetadata,
    pub results: Vec<EvaluationResult>,
}

impl TechniqueState {
    /// Outcome of the run, `inapplicable` if it was never computed
    pub fn outcome(&self) -> Verdict {
        self.metadata.outcome.unwrap_or(Verdict::Inapplicable)
    }
}

/// Read-only input shared by every technique of a run
#[derive(Clone, Default)]
pub struct EvaluationInput {
    pub stylesheets: Vec<Stylesheet>,
    pub dom: Option<Arc<dyn DomContext>>,
}

impl EvaluationInput {
    pub fn new(stylesheets: Vec<Stylesheet>) -> Self {
        Self { stylesheets, dom: None }
    }

    pub fn with_dom(mut self, dom: Arc<dyn DomContext>) -> Self {
        self.dom = Some(dom);
        self
    }
}

/// Mutable state every technique owns: a private copy of its descriptor,
/// the verdict tally and the result buffer.
#[derive(Debug, Clone)]
pub struct TechniqueCore {
    descriptor: Descriptor,
    tally: Tally,
    results: Vec<EvaluationResult>,
    outcome: Option<Outcome>,
}

impl TechniqueCore {
    /// Build a fresh core around a copy of `descriptor`
    pub fn new(descriptor: &Descriptor) -> Self {
        Self {
            descriptor: descriptor.clone(),
            tally: Tally::default(),
            results: Vec::new(),
            outcome: None,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// Outcome computed by the last call to [`final_results`](Self::final_results)
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Record a finding
    pub fn fill(&mut self, result: EvaluationResult) {
        self.tally.increment(result.verdict);
        self.results.push(result);
    }

    /// Compute the outcome and return an owned snapshot
    pub fn final_results(&mut self) -> TechniqueState {
        let outcome = aggregate(&self.tally, &self.results);
        self.outcome = Some(outcome.clone());

        let d = &self.descriptor;
        TechniqueState {
            name: d.name.clone(),
            code: d.code.clone(),
            mapping: d.mapping.clone(),
            description: d.description.clone(),
            metadata: TechniqueMetadata {
                target: d.target.clone(),
                success_criteria: d.success_criteria.clone(),
                related: d.related.clone(),
                url: d.url.clone(),
                tally: self.tally,
                outcome: Some(outcome.verdict),
                description: outcome.description,
            },
            results: self.results.clone(),
        }
    }

    /// Zero the tally and clear the result buffer
    pub fn reset(&mut self) {
        self.tally = Tally::default();
        self.results.clear();
        self.outcome = None;
    }
}

/// Capability contract every technique implements
#[async_trait]
pub trait Technique: Send + Sync {
    fn core(&self) -> &TechniqueCore;

    fn core_mut(&mut self) -> &mut TechniqueCore;

    /// Run the check, appending results to the core as it goes.
    ///
    /// Must be callable again after [`reset`](Technique::reset).
    async fn execute(&mut self, input: &EvaluationInput) -> Result<()>;

    fn descriptor(&self) -> &Descriptor {
        self.core().descriptor()
    }

    fn code(&self) -> &str {
        &self.core().descriptor().code
    }

    fn technique_mapping(&self) -> &str {
        &self.core().descriptor().mapping
    }

    fn has_principle_and_levels(&self, principles: &[String], levels: &[String]) -> bool {
        self.core().descriptor().has_principle_and_levels(principles, levels)
    }

    /// Compute the outcome and return an independent snapshot
    fn final_results(&mut self) -> TechniqueState {
        self.core_mut().final_results()
    }

    fn reset(&mut self) {
        self.core_mut().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::{BlockKind, RuleNode};

    fn descriptor() -> Descriptor {
        Descriptor {
            name: "Test technique".to_string(),
            code: "QW-CSS-TX".to_string(),
            mapping: "C99".to_string(),
            description: "Used by unit tests".to_string(),
            target: Target::new("*", &["color"]),
            success_criteria: vec![
                SuccessCriterion::new("1.4.3", WcagLevel::AA, Principle::Perceivable, "https://example.org/1.4.3"),
                SuccessCriterion::new("2.2.2", WcagLevel::A, Principle::Operable, "https://example.org/2.2.2"),
            ],
            related: vec![],
            url: None,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_has_principle_and_levels_requires_same_criterion() {
        let d = descriptor();
        assert!(d.has_principle_and_levels(&strings(&["Perceivable"]), &strings(&["AA"])));
        assert!(d.has_principle_and_levels(&strings(&["Operable"]), &strings(&["A", "AAA"])));
        // Perceivable is only AA, Operable only A
        assert!(!d.has_principle_and_levels(&strings(&["Perceivable"]), &strings(&["A"])));
        assert!(!d.has_principle_and_levels(&strings(&["Robust"]), &strings(&["A", "AA", "AAA"])));
        assert!(!d.has_principle_and_levels(&[], &strings(&["AA"])));
    }

    #[test]
    fn test_partial_evidence_is_dropped() {
        let result = EvaluationResult::new(Verdict::Failed, "no selector")
            .with_evidence(Evidence::new("", "color", "red"));
        assert!(result.evidence().is_none());

        let result = EvaluationResult::new(Verdict::Failed, "complete")
            .with_evidence(Evidence::new("p", "color", "red"));
        assert!(result.evidence().is_some());
    }

    #[test]
    fn test_inapplicable_never_carries_evidence() {
        let result = EvaluationResult::new(Verdict::Inapplicable, "unknown")
            .with_evidence(Evidence::new("p", "font-size", "inherit"));
        assert!(result.evidence().is_none());
    }

    #[test]
    fn test_evidence_from_declaration() {
        let rule = RuleNode::new(["p"]).declare("font-size", "12px");
        let block = RuleBlock { kind: BlockKind::Rule, rule: &rule };
        let evidence = Evidence::from_declaration("site.css", block, &rule.declarations[0]);

        assert_eq!(evidence.stylesheet_file.as_deref(), Some("site.css"));
        assert_eq!(evidence.css_code.as_deref(), Some("p {\n  font-size: 12px;\n}"));
        assert_eq!(evidence.selector.value, "p");
        assert_eq!(evidence.property.value, "12px");
    }

    #[test]
    fn test_evidence_serializes_flat() {
        let result = EvaluationResult::new(Verdict::Warning, "uses px")
            .with_evidence(Evidence::new("p", "font-size", "12px").with_css_code("p {}"));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["verdict"], "warning");
        assert_eq!(json["cssCode"], "p {}");
        assert_eq!(json["selector"]["value"], "p");
        assert_eq!(json["property"]["name"], "font-size");
    }

    #[test]
    fn test_reset_clears_tally_and_results() {
        let mut core = TechniqueCore::new(&descriptor());
        core.fill(EvaluationResult::new(Verdict::Failed, "bad"));
        core.fill(EvaluationResult::new(Verdict::Passed, "good"));
        assert_eq!(core.tally().total(), 2);

        core.reset();
        assert!(core.tally().is_empty());
        assert!(core.results().is_empty());
        assert_eq!(core.descriptor().code, "QW-CSS-TX");
    }

    #[test]
    fn test_final_results_are_independent_snapshots() {
        let mut core = TechniqueCore::new(&descriptor());
        core.fill(EvaluationResult::new(Verdict::Warning, "first"));

        let mut first = core.final_results();
        let second = core.final_results();
        assert_eq!(first, second);

        first.results.clear();
        first.metadata.description.push_str(" mutated");
        assert_eq!(core.results().len(), 1);
        assert_eq!(core.final_results(), second);
    }

    #[test]
    fn test_snapshot_survives_reset() {
        let mut core = TechniqueCore::new(&descriptor());
        core.fill(EvaluationResult::new(Verdict::Failed, "bad"));
        let snapshot = core.final_results();
        core.reset();

        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.outcome(), Verdict::Failed);
        assert_eq!(snapshot.metadata.tally.failed, 1);
    }

    #[test]
    fn test_core_copies_descriptor() {
        let mut d = descriptor();
        let core = TechniqueCore::new(&d);
        d.success_criteria.clear();
        assert_eq!(core.descriptor().success_criteria.len(), 2);
    }
}
