// SPDX-License-Identifier: PMPL-1.0-or-later
//! Built-in technique catalog.
//!
//! Each module focuses on one W3C technique or failure. Stylesheet
//! techniques walk the parsed AST of every stylesheet; element techniques
//! read the mapped DOM and do nothing without one.

pub mod blink;
pub mod color_pairing;
pub mod container_width;
pub mod font_size;
pub mod justified_text;
pub mod line_height;
pub mod text_align;
pub mod text_presentation;

use crate::technique::Technique;

/// Fresh instances of every built-in technique, in catalog order
pub fn all() -> Vec<Box<dyn Technique>> {
    vec![
        Box::new(font_size::FontSizeTechnique::new()),
        Box::new(text_align::TextAlignTechnique::new()),
        Box::new(line_height::LineHeightTechnique::new()),
        Box::new(text_presentation::TextPresentationTechnique::new()),
        Box::new(container_width::ContainerWidthTechnique::new()),
        Box::new(blink::BlinkTechnique::new()),
        Box::new(color_pairing::ColorPairingTechnique::new()),
        Box::new(justified_text::JustifiedTextTechnique::new()),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_codes_are_unique() {
        let techniques = all();
        let codes: HashSet<&str> = techniques.iter().map(|t| t.code()).collect();
        assert_eq!(codes.len(), techniques.len());
    }

    #[test]
    fn test_every_technique_has_success_criteria() {
        for technique in all() {
            assert!(
                !technique.descriptor().success_criteria.is_empty(),
                "{} has no success criteria",
                technique.code()
            );
            assert!(!technique.technique_mapping().is_empty());
        }
    }
}
