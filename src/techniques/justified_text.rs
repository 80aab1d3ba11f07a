// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T9 (F88): justified text.
//!
//! Each rule is judged once on its last `text-align` and `text-justify`
//! declarations. `text-align: justify` fails unless `text-justify: none`
//! switches inter-word stretching off.

use crate::error::Result;
use crate::stylesheet::{for_each_block, Declaration};
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::sync::LazyLock;

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Failure of Success Criterion 1.4.8 due to using text that is justified (aligned to both the left and the right margins)".to_string(),
    code: "QW-CSS-T9".to_string(),
    mapping: "F88".to_string(),
    description: "This failure describes situations where blocks of text that are justified (aligned to both the left and the right margins) occurs in CSS, using the 'text-align' and 'text-justify' attributes.".to_string(),
    target: Target::new("*", &["text-align", "text-justify"]),
    success_criteria: vec![SuccessCriterion::new(
        "1.4.8",
        WcagLevel::AAA,
        Principle::Perceivable,
        "https://www.w3.org/WAI/WCAG21/Understanding/visual-presentation",
    )],
    related: vec!["C22".to_string()],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/failures/F88".to_string()),
});

pub struct JustifiedTextTechnique {
    core: TechniqueCore,
}

impl JustifiedTextTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for JustifiedTextTechnique {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Technique for JustifiedTextTechnique {
    fn core(&self) -> &TechniqueCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TechniqueCore {
        &mut self.core
    }

    async fn execute(&mut self, input: &EvaluationInput) -> Result<()> {
        for sheet in &input.stylesheets {
            let Some(ast) = sheet.parsed_mentioning("text-align") else {
                continue;
            };
            for_each_block(ast, |block| {
                if !block.has_selectors() {
                    return;
                }
                let align = block.find("text-align");
                let justify = block.find("text-justify");
                let evidence = |d: &Declaration| Evidence::from_declaration(&sheet.file, block, d);

                let result = match (align, justify) {
                    (Some(a), None) if a.value.trim() == "justify" => {
                        EvaluationResult::new(Verdict::Failed, "Element has the property text-align:justify")
                            .with_evidence(evidence(a))
                    }
                    (Some(a), None) => EvaluationResult::new(
                        Verdict::Passed,
                        "Element has the property text-align with its value different than justify",
                    )
                    .with_evidence(evidence(a)),
                    (Some(a), Some(j)) if a.value.trim() == "justify" => {
                        if j.value.trim() == "none" {
                            EvaluationResult::new(
                                Verdict::Passed,
                                "Element has the property text-align:justify but text-justify:none",
                            )
                            .with_evidence(evidence(j))
                        } else {
                            EvaluationResult::new(
                                Verdict::Failed,
                                "Element has the property text-align:justify and text-justify with value different than none",
                            )
                            .with_evidence(evidence(j))
                        }
                    }
                    _ => EvaluationResult::new(Verdict::Passed, "Element doesn't have justified text"),
                };
                self.core.fill(result);
            });
        }
        Ok(())
    }
}
