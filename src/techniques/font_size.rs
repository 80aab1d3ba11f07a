// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T1 (C12, C13, C14): relative font sizes.
//!
//! `px` sizes do not scale with user text settings and are flagged as a
//! warning. Percentages, the `em` family (`em`, `rem`) and the named sizes
//! pass; anything else (`inherit`, `calc(...)`, `pt`) has an unknown metric.

use crate::error::Result;
use crate::stylesheet::for_each_declaration;
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::sync::LazyLock;

const NAMED_SIZES: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "smaller", "larger",
];

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Using \"percent, em, names\" for font sizes".to_string(),
    code: "QW-CSS-T1".to_string(),
    mapping: "C121314".to_string(),
    description: "This technique checks that all font-size attribute uses percent, em or names".to_string(),
    target: Target::new("*", &["font-size"]),
    success_criteria: vec![
        SuccessCriterion::new(
            "1.4.4",
            WcagLevel::AA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/resize-text",
        ),
        SuccessCriterion::new(
            "1.4.5",
            WcagLevel::AA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/images-of-text",
        ),
        SuccessCriterion::new(
            "1.4.8",
            WcagLevel::AAA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/visual-presentation",
        ),
        SuccessCriterion::new(
            "1.4.9",
            WcagLevel::AAA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/images-of-text-no-exception",
        ),
    ],
    related: vec!["C12".to_string(), "C13".to_string(), "C14".to_string()],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/css/C12".to_string()),
});

pub struct FontSizeTechnique {
    core: TechniqueCore,
}

impl FontSizeTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for FontSizeTechnique {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(value: &str) -> (Verdict, &'static str) {
    let value = value.trim();
    if value.contains("px") {
        (Verdict::Warning, "Element \"font-size\" style attribute uses \"px\"")
    } else if value.ends_with("em") || value.ends_with('%') || NAMED_SIZES.contains(&value) {
        (Verdict::Passed, "Element \"font-size\" style attribute doesn't use \"px\"")
    } else {
        (Verdict::Inapplicable, "Element has \"font-size\" style with unknown metric")
    }
}

#[async_trait]
impl Technique for FontSizeTechnique {
    fn core(&self) -> &TechniqueCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TechniqueCore {
        &mut self.core
    }

    async fn execute(&mut self, input: &EvaluationInput) -> Result<()> {
        for sheet in &input.stylesheets {
            let Some(ast) = sheet.parsed_mentioning("font-size") else {
                continue;
            };
            for_each_declaration(ast, |block, declaration| {
                if declaration.property != "font-size" {
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
