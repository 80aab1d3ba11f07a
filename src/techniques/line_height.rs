// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T3 (C21): line spacing between 1.5 and 2.
//!
//! Percentages must fall in 150..=200 and unitless multipliers in 1.5..=2.
//! Other lengths (`20px`, `1.2em`) fix the spacing and fail; keywords such as
//! `normal` or `inherit` are not measurable and are inapplicable.

use crate::error::Result;
use crate::stylesheet::for_each_declaration;
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::sync::LazyLock;

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Specifying line spacing in CSS".to_string(),
    code: "QW-CSS-T3".to_string(),
    mapping: "C21".to_string(),
    description: "Many people with cognitive disabilities have trouble tracking lines of text when a block of text is single spaced. Providing spacing between 1.5 to 2 allows them to start a new line more easily once they have finished the previous one.".to_string(),
    target: Target::new("*", &["line-height"]),
    success_criteria: vec![SuccessCriterion::new(
        "1.4.8",
        WcagLevel::AAA,
        Principle::Perceivable,
        "https://www.w3.org/WAI/WCAG21/Understanding/visual-presentation",
    )],
    related: vec![],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/css/C21".to_string()),
});

const PASSED: &str = "Text block has line spacing between 150% and 200%";
const FAILED: &str = "Text block hasn't line spacing between 150% and 200%.";
const INAPPLICABLE: &str = "Text block line-height property isn't a number or percentage.";

pub struct LineHeightTechnique {
    core: TechniqueCore,
}

impl LineHeightTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for LineHeightTechnique {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(value: &str) -> (Verdict, &'static str) {
    let value = value.trim();
    let in_band = |ok: bool| if ok { (Verdict::Passed, PASSED) } else { (Verdict::Failed, FAILED) };

    if let Some(percent) = value.strip_suffix('%') {
        return match percent.trim().parse::<f64>() {
            Ok(n) => in_band((150.0..=200.0).contains(&n)),
            Err(_) => (Verdict::Inapplicable, INAPPLICABLE),
        };
    }
    if let Ok(n) = value.parse::<f64>() {
        return in_band((1.5..=2.0).contains(&n));
    }
    if value.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return (Verdict::Failed, FAILED);
    }
    (Verdict::Inapplicable, INAPPLICABLE)
}

#[async_trait]
impl Technique for LineHeightTechnique {
    fn core(&self) -> &TechniqueCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TechniqueCore {
        &mut self.core
    }

    async fn execute(&mut self, input: &EvaluationInput) -> Result<()> {
        for sheet in &input.stylesheets {
            let Some(ast) = sheet.parsed_mentioning("line-height") else {
                continue;
            };
            for_each_declaration(ast, |block, declaration| {
                if !block.has_selectors() || declaration.property != "line-height" {
                    return;
                }
                let (verdict, description) = classify(&declaration.value);
                self.core.fill(
                    EvaluationResult::new(verdict, description)
                        .with_evidence(Evidence::from_declaration(&sheet.file, block, declaration)),
                );
            });
        }
        Ok(())
    }
}
