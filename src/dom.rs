// SPDX-License-Identifier: PMPL-1.0-or-later
//! Element/style access for element-oriented techniques.
//!
//! Techniques only see the [`DomContext`] trait. [`MappedDom`] is the
//! concrete, owned element map the page harness produces (one entry per
//! element with its styles and parent id); it can also be built from an
//! HTML document, reading inline `style` declarations and the legacy
//! `bgcolor` / `text` presentational attributes.

use crate::error::{Error, Result};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Attribute carrying the element id through rendered markup
const ID_ATTRIBUTE: &str = "data-css-techniques-id";

/// Stable per-element identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of a rendered page
pub trait DomContext: Send + Sync {
    /// All element ids in document order
    fn elements(&self) -> Vec<ElementId>;

    /// Elements matching a CSS selector list, in document order
    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>>;

    fn tag_name(&self, id: &ElementId) -> Option<&str>;

    fn attribute(&self, id: &ElementId, name: &str) -> Option<&str>;

    /// Resolved value of a style property on the element itself
    fn style(&self, id: &ElementId, property: &str) -> Option<&str>;

    fn parent(&self, id: &ElementId) -> Option<ElementId>;
}

/// One element of a [`MappedDom`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedElement {
    /// Lowercase tag name
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
}

impl MappedElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(ElementId::new(parent));
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }
}

/// Owned element map keyed by element id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappedDom {
    elements: BTreeMap<ElementId, MappedElement>,
    /// HTML the map was built from, while the map still matches it
    #[serde(skip)]
    source: Option<String>,
}

impl MappedDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON element map written by the page harness
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Map every element of an HTML document.
    ///
    /// Ids are assigned in document order starting at `"0"` for `<html>`.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut dom = MappedDom::new();
        let mut ids = HashMap::new();

        for (index, element) in document_elements(&document).enumerate() {
            let id = ElementId::new(index.to_string());
            let value = element.value();

            let mut mapped = MappedElement::new(value.name());
            for (name, attr) in value.attrs() {
                mapped.attributes.insert(name.to_string(), attr.to_string());
            }
            if let Some(style) = value.attr("style") {
                mapped.styles.extend(parse_inline_style(style));
            }
            for legacy in ["bgcolor", "text"] {
                if let Some(attr) = value.attr(legacy) {
                    mapped.styles.entry(legacy.to_string()).or_insert_with(|| attr.to_string());
                }
            }
            mapped.parent = element.parent().and_then(|p| ids.get(&p.id()).cloned());

            ids.insert(element.id(), id.clone());
            dom.insert(id, mapped);
        }

        dom.source = Some(html.to_string());
        dom
    }

    pub fn insert(&mut self, id: ElementId, element: MappedElement) {
        self.elements.insert(id, element);
        self.source = None;
    }

    /// Builder-style insert
    pub fn with(mut self, id: &str, element: MappedElement) -> Self {
        self.insert(ElementId::new(id), element);
        self
    }

    pub fn get(&self, id: &ElementId) -> Option<&MappedElement> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Check that every parent reference resolves to a mapped element
    pub fn validate(&self) -> Result<()> {
        for (id, element) in &self.elements {
            if let Some(parent) = &element.parent {
                if !self.elements.contains_key(parent) {
                    return Err(Error::Dom(format!(
                        "element {} references missing parent {}",
                        id, parent
                    )));
                }
            }
        }
        Ok(())
    }

    /// Render the map as nested markup, each element tagged with its id.
    ///
    /// Children follow their parents; elements whose parent chain never
    /// reaches a root are left out.
    fn to_markup(&self) -> String {
        let mut children: HashMap<Option<&ElementId>, Vec<ElementId>> = HashMap::new();
        for (id, element) in &self.elements {
            let parent = element.parent.as_ref().filter(|parent| self.elements.contains_key(*parent));
            children.entry(parent).or_default().push(id.clone());
        }
        for siblings in children.values_mut() {
            siblings.sort_by(document_order);
        }

        let mut markup = String::new();
        for root in children.get(&None).into_iter().flatten() {
            self.write_element(root, &children, &mut markup);
        }
        markup
    }

    fn write_element(
        &self,
        id: &ElementId,
        children: &HashMap<Option<&ElementId>, Vec<ElementId>>,
        markup: &mut String,
    ) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        markup.push_str(&format!("<{} {}=\"{}\"", element.name, ID_ATTRIBUTE, escape_attribute(id.as_str())));
        for (name, value) in &element.attributes {
            if name != ID_ATTRIBUTE {
                markup.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
            }
        }
        markup.push('>');
        for child in children.get(&Some(id)).into_iter().flatten() {
            self.write_element(child, children, markup);
        }
        markup.push_str(&format!("</{}>", element.name));
    }
}

impl DomContext for MappedDom {
    fn elements(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.elements.keys().cloned().collect();
        ids.sort_by(document_order);
        ids
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| Error::Dom(format!("invalid selector {:?}: {}", selector, e)))?;

        let mut matched: Vec<ElementId> = match &self.source {
            // Same traversal as `from_html`, so positions are the ids
            Some(html) => {
                let document = Html::parse_document(html);
                let ids: HashMap<_, _> = document_elements(&document)
                    .enumerate()
                    .map(|(index, element)| (element.id(), ElementId::new(index.to_string())))
                    .collect();
                document
                    .select(&parsed)
                    .filter_map(|element| ids.get(&element.id()).cloned())
                    .collect()
            }
            None => {
                let document = Html::parse_document(&self.to_markup());
                document
                    .select(&parsed)
                    .filter_map(|element| element.value().attr(ID_ATTRIBUTE).map(ElementId::new))
                    .collect()
            }
        };
        matched.sort_by(document_order);
        matched.dedup();
        Ok(matched)
    }

    fn tag_name(&self, id: &ElementId) -> Option<&str> {
        self.elements.get(id).map(|el| el.name.as_str())
    }

    fn attribute(&self, id: &ElementId, name: &str) -> Option<&str> {
        self.elements.get(id)?.attributes.get(name).map(String::as_str)
    }

    fn style(&self, id: &ElementId, property: &str) -> Option<&str> {
        self.elements
            .get(id)?
            .styles
            .get(property)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn parent(&self, id: &ElementId) -> Option<ElementId> {
        self.elements.get(id)?.parent.clone()
    }
}

/// Numeric ids sort numerically, everything else lexically
fn document_order(a: &ElementId, b: &ElementId) -> Ordering {
    match (a.0.parse::<u64>(), b.0.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.0.cmp(&b.0),
    }
}

fn document_elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.root_element().descendants().filter_map(ElementRef::wrap)
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}

/// Property/value pairs declared by a `style` attribute
fn parse_inline_style(style: &str) -> BTreeMap<String, String> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let attribute = match StyleAttribute::parse(style, options) {
        Ok(attribute) => attribute,
        Err(e) => {
            warn!(style, error = %e, "Ignoring unparsable style attribute");
            return BTreeMap::new();
        }
    };

    let block = &attribute.declarations;
    block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
        .filter_map(|property| {
            let value = property.value_to_css_string(PrinterOptions::default()).ok()?;
            Some((property.property_id().name().to_string(), value))
        })
        .filter(|(_, value)| !value.is_empty())
        .collect()
}
