// SPDX-License-Identifier: PMPL-1.0-or-later
//! QW-CSS-T7 (F24): foreground and background colors specified together.
//!
//! Works on the mapped DOM. An element with a foreground color (`color`,
//! or the legacy `text` attribute) passes when it or one of its ancestors
//! sets a background (`background-color` / `bgcolor`); the nearest such
//! background counts as paired. Backgrounds never paired with any
//! foreground fail once every element has been visited.

use crate::dom::{DomContext, ElementId};
use crate::error::{Error, Result};
use crate::technique::{
    Descriptor, EvaluationInput, EvaluationResult, Evidence, Principle, SuccessCriterion, Target,
    Technique, TechniqueCore, Verdict, WcagLevel,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::warn;

const FOREGROUND: &[&str] = &["color", "text"];
const BACKGROUND: &[&str] = &["background-color", "bgcolor"];

static DESCRIPTOR: LazyLock<Descriptor> = LazyLock::new(|| Descriptor {
    name: "Failure of Success Criterion 1.4.3, 1.4.6 and 1.4.8 due to specifying foreground colors without specifying background colors or vice versa".to_string(),
    code: "QW-CSS-T7".to_string(),
    mapping: "F24".to_string(),
    description: "Users with vision loss or cognitive, language and learning challenges often prefer specific foreground and background color combinations. Many user agents let users choose the colors they would like to see without overriding all author-specified styles, which only works when authors set foreground and background colors together.".to_string(),
    target: Target::new("*", &["color", "background-color"]),
    success_criteria: vec![
        SuccessCriterion::new(
            "1.4.3",
            WcagLevel::AA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/contrast-minimum",
        ),
        SuccessCriterion::new(
            "1.4.6",
            WcagLevel::AAA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/contrast-enhanced",
        ),
        SuccessCriterion::new(
            "1.4.8",
            WcagLevel::AAA,
            Principle::Perceivable,
            "https://www.w3.org/WAI/WCAG21/Understanding/visual-presentation",
        ),
    ],
    related: vec!["C23".to_string(), "C25".to_string()],
    url: Some("https://www.w3.org/WAI/WCAG21/Techniques/failures/F24".to_string()),
});

pub struct ColorPairingTechnique {
    core: TechniqueCore,
}

impl ColorPairingTechnique {
    pub fn new() -> Self {
        Self {
            core: TechniqueCore::new(&DESCRIPTOR),
        }
    }
}

impl Default for ColorPairingTechnique {
    fn default() -> Self {
        Self::new()
    }
}

/// First of `properties` set on the element, with its value
fn first_style<'a>(
    dom: &'a dyn DomContext,
    id: &ElementId,
    properties: &[&'static str],
) -> Option<(&'static str, &'a str)> {
    properties
        .iter()
        .find_map(|&property| dom.style(id, property).map(|value| (property, value)))
}

/// Nearest element, starting at `id` itself, that sets a background
fn nearest_background(dom: &dyn DomContext, id: &ElementId, code: &str) -> Result<Option<ElementId>> {
    let mut visited = HashSet::new();
    let mut current = Some(id.clone());

    while let Some(element) = current {
        if !visited.insert(element.clone()) {
            return Err(Error::technique(code, format!("parent chain of element {} loops at {}", id, element)));
        }
        if first_style(dom, &element, BACKGROUND).is_some() {
            return Ok(Some(element));
        }
        current = dom.parent(&element);
        if let Some(parent) = &current {
            if dom.tag_name(parent).is_none() {
                warn!(element = %element, parent = %parent, "Parent element is not mapped");
                current = None;
            }
        }
    }
    Ok(None)
}

fn evidence(dom: &dyn DomContext, id: &ElementId, property: &str, value: &str) -> Evidence {
    let tag = dom.tag_name(id).unwrap_or_default();
    Evidence::new(tag, property, value).with_css_code(format!("{}: {}", property, value))
}

#[async_trait]
impl Technique for ColorPairingTechnique {
    fn core(&self) -> &TechniqueCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TechniqueCore {
        &mut self.core
    }

    async fn execute(&mut self, input: &EvaluationInput) -> Result<()> {
        let Some(dom) = input.dom.as_deref() else {
            return Ok(());
        };
        let code = self.core.descriptor().code.clone();

        // Background elements in first-seen order, and whether a foreground paired with them
        let mut backgrounds: Vec<ElementId> = Vec::new();
        let mut paired: HashMap<ElementId, bool> = HashMap::new();

        for id in dom.elements() {
            if let Some((property, value)) = first_style(dom, &id, FOREGROUND) {
                match nearest_background(dom, &id, &code)? {
                    Some(background) => {
                        self.core.fill(EvaluationResult::new(
                            Verdict::Passed,
                            "Element has color and background-color set",
                        ));
                        if paired.insert(background.clone(), true).is_none() {
                            backgrounds.push(background);
                        }
                    }
                    None => {
                        self.core.fill(
                            EvaluationResult::new(Verdict::Failed, "Element has color set but not background-color")
                                .with_evidence(evidence(dom, &id, property, value)),
                        );
                    }
                }
            } else if first_style(dom, &id, BACKGROUND).is_some() && !paired.contains_key(&id) {
                paired.insert(id.clone(), false);
                backgrounds.push(id);
            }
        }

        for id in backgrounds {
            if paired.get(&id).copied().unwrap_or(false) {
                continue;
            }
            let mut result = EvaluationResult::new(Verdict::Failed, "Element has background-color set but not color");
            if let Some((property, value)) = first_style(dom, &id, BACKGROUND) {
                result = result.with_evidence(evidence(dom, &id, property, value));
            }
            self.core.fill(result);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MappedDom, MappedElement};
    use std::sync::Arc;

    async fn run(dom: MappedDom) -> Result<Vec<EvaluationResult>> {
        let mut technique = ColorPairingTechnique::new();
        let input = EvaluationInput::default().with_dom(Arc::new(dom));
        technique.execute(&input).await?;
        Ok(technique.final_results().results)
    }

    #[tokio::test]
    async fn test_no_dom_is_a_no_op() {
        let mut technique = ColorPairingTechnique::new();
        technique.execute(&EvaluationInput::default()).await.unwrap();
        let state = technique.final_results();
        assert!(state.results.is_empty());
        assert_eq!(state.outcome(), Verdict::Inapplicable);
    }

    #[tokio::test]
    async fn test_color_with_ancestor_background_passes() {
        let dom = MappedDom::new()
            .with("0", MappedElement::new("body").with_style("background-color", "#fff"))
            .with("1", MappedElement::new("div").with_parent("0"))
            .with("2", MappedElement::new("p").with_parent("1").with_style("color", "#222"));

        let results = run(dom).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].verdict, Verdict::Passed);
    }

    #[tokio::test]
    async fn test_color_on_same_element_pairs() {
        let dom = MappedDom::new().with(
            "0",
            MappedElement::new("td").with_attribute("bgcolor", "black").with_style("bgcolor", "black").with_style("text", "white"),
        );
        let results = run(dom).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].verdict, Verdict::Passed);
    }

    #[tokio::test]
    async fn test_color_without_background_fails() {
        let dom = MappedDom::new()
            .with("0", MappedElement::new("body"))
            .with("1", MappedElement::new("span").with_parent("0").with_style("color", "red"));

        let results = run(dom).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].verdict, Verdict::Failed);
        let evidence = results[0].evidence().expect("failure carries evidence");
        assert_eq!(evidence.selector.value, "span");
        assert_eq!(evidence.property.name, "color");
        assert_eq!(evidence.css_code.as_deref(), Some("color: red"));
    }

    #[tokio::test]
    async fn test_unpaired_background_fails() {
        let dom = MappedDom::new()
            .with("0", MappedElement::new("body"))
            .with("1", MappedElement::new("div").with_parent("0").with_style("background-color", "navy"))
            .with("2", MappedElement::new("aside").with_parent("0").with_style("background-color", "gray"))
            .with("3", MappedElement::new("p").with_parent("2").with_style("color", "black"));

        let results = run(dom).await.unwrap();
        let failed: Vec<_> = results.iter().filter(|r| r.verdict == Verdict::Failed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].description, "Element has background-color set but not color");
        assert_eq!(failed[0].evidence().map(|e| e.selector.value.as_str()), Some("div"));
    }

    #[tokio::test]
    async fn test_parent_cycle_is_a_technique_error() {
        let dom = MappedDom::new()
            .with("1", MappedElement::new("p").with_parent("2").with_style("color", "red"))
            .with("2", MappedElement::new("div").with_parent("1"));

        let err = run(dom).await.unwrap_err();
        assert!(matches!(err, Error::Technique { ref code, .. } if code == "QW-CSS-T7"));
    }

    #[tokio::test]
    async fn test_dangling_parent_ends_the_walk() {
        let dom = MappedDom::new().with("1", MappedElement::new("p").with_parent("404").with_style("color", "red"));
        let results = run(dom).await.unwrap();
        assert_eq!(results[0].verdict, Verdict::Failed);
    }
}
