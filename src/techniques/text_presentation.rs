// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T4 (C22): CSS controls the visual presentation of text.

use crate::error::Result;
use crate::stylesheet::for_each_declaration;
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::sync::LazyLock;

/// Properties that style text instead of replacing it with images
const TEXT_PROPERTIES: &[&str] = &[
    "font-family",
    "text-align",
    "font-size",
    "font-style",
    "font-weight",
    "color",
    "line-height",
    "text-transform",
    "letter-spacing",
    "background-image",
];

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Using CSS to control visual presentation of text".to_string(),
    code: "QW-CSS-T4".to_string(),
    mapping: "C22".to_string(),
    description: "The objective of this technique is to demonstrate how CSS can be used to control the visual presentation of text.".to_string(),
    target: Target::new("*", TEXT_PROPERTIES),
    success_criteria: vec![
        SuccessCriterion::new(
            "1.3.1",
            WcagLevel::A,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/info-and-relationships",
        ),
        SuccessCriterion::new(
            "1.4.5",
            WcagLevel::AA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/images-of-text",
        ),
        SuccessCriterion::new(
            "1.4.9",
            WcagLevel::AAA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/images-of-text-no-exception",
        ),
    ],
    related: vec!["C8".to_string(), "C12".to_string(), "C13".to_string(), "C14".to_string()],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/css/C22".to_string()),
});

pub struct TextPresentationTechnique {
    core: TechniqueCore,
}

impl TextPresentationTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for TextPresentationTechnique {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Technique for TextPresentationTechnique {
    fn core(&self) -> &TechniqueCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TechniqueCore {
        &mut self.core
    }

    async fn execute(&mut self, input: &EvaluationInput) -> Result<()> {
        for sheet in &input.stylesheets {
            let Some(ast) = sheet.parsed() else {
                continue;
            };
            for_each_declaration(ast, |block, declaration| {
                let result = if TEXT_PROPERTIES.contains(&declaration.property.as_str()) {
                    EvaluationResult::new(
                        Verdict::Passed,
                        "Element uses CSS properties to control the visual presentation of text",
                    )
                    .with_evidence(Evidence::from_declaration(&sheet.file, block, declaration))
                } else {
                    EvaluationResult::new(
                        Verdict::Inapplicable,
                        "Element does not use CSS properties to control the visual presentation of text",
                    )
                };
                self.core.fill(result);
            });
        }
        Ok(())
    }
}
