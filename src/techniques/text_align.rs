// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T2 (C19): text blocks aligned left or right.

use crate::error::Result;
use crate::stylesheet::for_each_block;
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::sync::LazyLock;

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Specifying alignment either to the left OR right in CSS".to_string(),
    code: "QW-CSS-T2".to_string(),
    mapping: "C19".to_string(),
    description: "This technique describes how to align blocks of text either left or right by setting the CSS text-align property.".to_string(),
    target: Target::new("*", &["text-align"]),
    success_criteria: vec![SuccessCriterion::new(
        "1.4.8",
        WcagLevel::AAA,
        Principle::Perceivable,
        "https://www.w3.org/WAI/WCAG21/Understanding/visual-presentation",
    )],
    related: vec![],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/css/C19".to_string()),
});

pub struct TextAlignTechnique {
    core: TechniqueCore,
}

impl TextAlignTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for TextAlignTechnique {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Technique for TextAlignTechnique {
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
            for_each_block(ast, |block| {
                // Empty blocks and selector-less at-rules hold no text
                if !block.has_selectors() || block.declarations().next().is_none() {
                    return;
                }

                let result = match block.find("text-align") {
                    Some(declaration) => {
                        let value = declaration.value.as_str();
                        let (verdict, description) = if value.contains("left") || value.contains("right") {
                            (Verdict::Passed, "Text block is aligned either left or right.")
                        } else {
                            (Verdict::Failed, "Text block is not aligned either left nor right.")
                        };
                        EvaluationResult::new(verdict, description)
                            .with_evidence(Evidence::from_declaration(&sheet.file, block, declaration))
                    }
                    None => EvaluationResult::new(Verdict::Failed, "Text block doesn't have alignment property."),
                };
                self.core.fill(result);
            });
        }
        Ok(())
    }
}
