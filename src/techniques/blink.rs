// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T6 (F4): `text-decoration: blink`.
//!
//! Unlike the other stylesheet checks, finding nothing is a pass: a run
//! without any blinking declaration records one passed result.

use crate::error::Result;
use crate::stylesheet::for_each_declaration;
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::sync::LazyLock;

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Failure of Success Criterion 2.2.2 due to using text-decoration:blink without a mechanism to stop it in less than five seconds".to_string(),
    code: "QW-CSS-T6".to_string(),
    mapping: "F4".to_string(),
    description: "CSS defines the blink value for the text-decoration property. When used, it causes any text in elements with this property to blink at a predetermined rate. This cannot be interrupted by the user, nor can it be disabled as a user agent preference. The blinking continues as long as the page is displayed. Therefore, content that uses text-decoration:blink fails the Success Criterion because blinking can continue for more than three seconds.".to_string(),
    target: Target::new("*", &["text-decoration"]),
    success_criteria: vec![SuccessCriterion::new(
        "2.2.2",
        WcagLevel::A,
        Principle::Operable,
        "https://www.w3.org/WAI/WCAG21/Understanding/pause-stop-hide.html",
    )],
    related: vec!["SCR22".to_string()],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/failures/F4".to_string()),
});

pub struct BlinkTechnique {
    core: TechniqueCore,
}

impl BlinkTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for BlinkTechnique {
    fn default() -> Self {
        Self::new()
    }
}

fn blinks(value: &str) -> bool {
    value.split_whitespace().any(|token| token.eq_ignore_ascii_case("blink"))
}

#[async_trait]
impl Technique for BlinkTechnique {
    fn core(&self) -> &TechniqueCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TechniqueCore {
        &mut self.core
    }

    async fn execute(&mut self, input: &EvaluationInput) -> Result<()> {
        for sheet in &input.stylesheets {
            let Some(ast) = sheet.parsed_mentioning("text-decoration") else {
                continue;
            };
            for_each_declaration(ast, |block, declaration| {
                if !block.has_selectors() || declaration.property != "text-decoration" || !blinks(&declaration.value) {
                    return;
                }
                self.core.fill(
                    EvaluationResult::new(Verdict::Failed, "Element has the property text-decoration:blink.")
                        .with_evidence(Evidence::from_declaration(&sheet.file, block, declaration)),
                );
            });
        }

        if self.core.tally().failed == 0 {
            self.core.fill(EvaluationResult::new(
                Verdict::Passed,
                "Didn't find any text-decoration:blink properties",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::RuleNode;
    use crate::techniques::testing::{input, run};

    #[test]
    fn test_blink_token() {
        assert!(blinks("blink"));
        assert!(blinks("underline BLINK"));
        assert!(!blinks("underline"));
        assert!(!blinks("blinking"));
    }

    #[tokio::test]
    async fn test_blink_fails() {
        let mut technique = BlinkTechnique::new();
        let state = run(&mut technique, &input(vec![RuleNode::new(["div"]).declare("text-decoration", "blink")])).await;

        assert_eq!(state.outcome(), Verdict::Failed);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.metadata.description, "Element has the property text-decoration:blink.");
    }

    #[tokio::test]
    async fn test_no_blink_passes() {
        let mut technique = BlinkTechnique::new();
        let state = run(&mut technique, &input(vec![RuleNode::new(["a"]).declare("color", "blue")])).await;
        assert_eq!(state.outcome(), Verdict::Passed);
        assert_eq!(state.results.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_still_passes() {
        let mut technique = BlinkTechnique::new();
        let state = run(&mut technique, &EvaluationInput::default()).await;
        assert_eq!(state.outcome(), Verdict::Passed);
    }
}
