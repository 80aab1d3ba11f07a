// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T5 (C24): percentage widths for text containers.
//!
//! Only rules whose first selector names a sectioning or grouping element
//! are inspected. A percentage still needs a human to confirm the layout
//! reflows, so it yields a warning rather than a pass.

use crate::error::Result;
use crate::stylesheet::for_each_declaration;
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::sync::LazyLock;

const SECTION_AND_GROUPING: &[&str] = &[
    "span", "article", "section", "nav", "aside", "hgroup", "header", "footer", "address", "p", "hr",
    "blockquote", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "dd", "dt", "dl",
    "figcaption",
];

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Using percentage values in CSS for container sizes".to_string(),
    code: "QW-CSS-T5".to_string(),
    mapping: "C24".to_string(),
    description: "The objective of this technique is to enable users to increase the size of text without having to scroll horizontally to read that text. To use this technique, an author specifies the width of text containers using percent values.".to_string(),
    target: Target::new("*", &["width"]),
    success_criteria: vec![SuccessCriterion::new(
        "1.4.8",
        WcagLevel::AAA,
        Principle::Perceivable,
        "https://www.w3.org/WAI/WCAG21/Techniques/css/C24",
    )],
    related: vec!["C20".to_string()],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/css/C20".to_string()),
});

pub struct ContainerWidthTechnique {
    core: TechniqueCore,
}

impl ContainerWidthTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for ContainerWidthTechnique {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Technique for ContainerWidthTechnique {
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
                if declaration.property != "width" {
                    return;
                }
                let is_container = block
                    .first_selector()
                    .is_some_and(|s| SECTION_AND_GROUPING.contains(&s.trim()));
                if !is_container {
                    return;
                }

                let result = if declaration.value.trim().ends_with('%') {
                    EvaluationResult::new(Verdict::Warning, "Element \"width\" style attribute uses \"%\"")
                        .with_evidence(Evidence::from_declaration(&sheet.file, block, declaration))
                } else {
                    EvaluationResult::new(Verdict::Failed, "Element \"width\" style attribute doesn't use \"%\"")
                };
                self.core.fill(result);
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::RuleNode;
    use crate::techniques::testing::{input, run};

    #[tokio::test]
    async fn test_percentage_width_is_a_warning() {
        let mut technique = ContainerWidthTechnique::new();
        let state = run(&mut technique, &input(vec![RuleNode::new(["div"]).declare("width", "80%")])).await;
        assert_eq!(state.outcome(), Verdict::Warning);
        assert!(state.results[0].evidence().is_some());
    }

    #[tokio::test]
    async fn test_fixed_width_fails_without_evidence() {
        let mut technique = ContainerWidthTechnique::new();
        let state = run(&mut technique, &input(vec![RuleNode::new(["article"]).declare("width", "960px")])).await;
        assert_eq!(state.outcome(), Verdict::Failed);
        assert!(state.results[0].evidence().is_none());
    }

    #[tokio::test]
    async fn test_non_container_selectors_are_ignored() {
        let mut technique = ContainerWidthTechnique::new();
        let state = run(
            &mut technique,
            &input(vec![
                RuleNode::new(["img"]).declare("width", "300px"),
                RuleNode::new([".sidebar", "div"]).declare("width", "200px"),
            ]),
        )
        .await;
        assert!(state.results.is_empty());
    }
}
