// SPDX-License-Identifier: PMPL-1.0-or-later
//! Stylesheet input and the parsed CSS AST techniques inspect.
//!
//! The AST mirrors the JSON shape emitted by the page harness: every node
//! carries a `type` tag, declaration-bearing nodes expose `declarations`,
//! and grouping nodes (media, supports, ...) nest further `rules`. Parsing
//! CSS text happens upstream; this crate only consumes the result.

pub mod walker;

pub use walker::{for_each_block, for_each_declaration, walk, BlockKind, RuleBlock, StyleVisitor};

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// One stylesheet handed to the techniques
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Stylesheet {
    /// Source file or URL the stylesheet came from
    #[serde(default)]
    pub file: String,
    /// Raw and parsed content; absent for stylesheets that failed to load
    #[serde(default)]
    pub content: Option<StylesheetContent>,
}

/// Raw source text plus its parsed AST
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StylesheetContent {
    /// Raw CSS text
    #[serde(default)]
    pub plain: String,
    /// Parsed AST root
    #[serde(default)]
    pub parsed: Option<CssNode>,
}

impl Stylesheet {
    /// Create a stylesheet from raw text and its parsed AST
    pub fn new(file: impl Into<String>, plain: impl Into<String>, parsed: CssNode) -> Self {
        Self {
            file: file.into(),
            content: Some(StylesheetContent {
                plain: plain.into(),
                parsed: Some(parsed),
            }),
        }
    }

    /// Parsed AST, provided the stylesheet has non-empty source text
    pub fn parsed(&self) -> Option<&CssNode> {
        let content = self.content.as_ref()?;
        if content.plain.is_empty() {
            return None;
        }
        content.parsed.as_ref()
    }

    /// Parsed AST, only if the raw source mentions `needle`.
    ///
    /// A substring test on the raw text is far cheaper than a full walk, so
    /// techniques interested in one property skip unrelated sheets this way.
    pub fn parsed_mentioning(&self, needle: &str) -> Option<&CssNode> {
        let content = self.content.as_ref()?;
        if content.plain.is_empty() || !content.plain.contains(needle) {
            return None;
        }
        content.parsed.as_ref()
    }
}

/// Stylesheet list as written by the page harness
#[derive(Deserialize)]
#[serde(untagged)]
enum StylesheetFile {
    Many(Vec<Stylesheet>),
    One(Stylesheet),
}

/// Read stylesheets from a JSON file holding one stylesheet or an array
pub fn load_stylesheets(path: &Path) -> Result<Vec<Stylesheet>> {
    let content = std::fs::read_to_string(path)?;
    let sheets = match serde_json::from_str(&content)? {
        StylesheetFile::Many(sheets) => sheets,
        StylesheetFile::One(sheet) => vec![sheet],
    };
    debug!(count = sheets.len(), path = %path.display(), "Loaded stylesheets");
    Ok(sheets)
}

/// Line/column pair (1-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// Source span of a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Position {
    /// Span starting and ending on the given locations
    pub fn span(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start: Some(Location { line: start.0, column: start.1 }),
            end: Some(Location { line: end.0, column: end.1 }),
            source: None,
        }
    }
}

/// `null` reads as the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A `property: value` pair inside a declaration block.
///
/// Comment entries inside a block deserialize with an empty property and are
/// skipped by the walker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default, deserialize_with = "null_as_default")]
    pub property: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            position: None,
        }
    }

    /// Both property and value are present
    pub fn is_complete(&self) -> bool {
        !self.property.is_empty() && !self.value.is_empty()
    }
}

/// Body shared by `rule`, `font-face` and `page` nodes
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleNode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub selectors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub position: Option<Position>,
}

impl RuleNode {
    /// Create a rule for the given selectors with no declarations
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            declarations: Vec::new(),
            position: None,
        }
    }

    /// Append a declaration
    pub fn declare(mut self, property: &str, value: &str) -> Self {
        self.declarations.push(Declaration::new(property, value));
        self
    }

    /// Set the source position
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Grouping node: `@media`, `@supports`, `@document`, `@host`, or any
/// other at-rule nesting further rules (`@layer`, `@container`, ...)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GroupNode {
    /// Group condition, e.g. the media query text
    #[serde(default, alias = "media", alias = "supports", alias = "document")]
    pub prelude: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<CssNode>,
    #[serde(default)]
    pub position: Option<Position>,
}

/// `@keyframes` block. Frames are kept opaque since no technique reads them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyframesNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keyframes: Vec<Value>,
}

/// Root body of a `stylesheet` node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StylesheetBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<CssNode>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A node of the parsed stylesheet.
///
/// Deserialization never fails on a single node: a tag without a dedicated
/// variant (or no tag at all) becomes a [`CssNode::Group`], and a node whose
/// body does not fit its tag becomes [`CssNode::Other`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum CssNode {
    Stylesheet { stylesheet: StylesheetBody },
    Rule(RuleNode),
    FontFace(RuleNode),
    Page(RuleNode),
    Media(GroupNode),
    Supports(GroupNode),
    Document(GroupNode),
    Host(GroupNode),
    Keyframes(KeyframesNode),
    Comment { comment: String },
    Import { import: String },
    /// Any other tag; its nested `rules`, if present, are still walked
    Group { kind: Option<String>, group: GroupNode },
    /// Malformed node with nothing to inspect
    Other { kind: Option<String> },
}

impl CssNode {
    /// Root node holding the given top-level rules
    pub fn stylesheet(rules: Vec<CssNode>) -> Self {
        CssNode::Stylesheet {
            stylesheet: StylesheetBody { rules, source: None },
        }
    }

    /// `@media` group holding the given rules
    pub fn media(query: &str, rules: Vec<CssNode>) -> Self {
        CssNode::Media(GroupNode {
            prelude: Some(query.to_string()),
            rules,
            position: None,
        })
    }

    fn from_tagged(kind: Option<&str>, value: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            Some("stylesheet") => CssNode::Stylesheet {
                stylesheet: match value.get("stylesheet") {
                    Some(body) if !body.is_null() => serde_json::from_value(body.clone())?,
                    _ => StylesheetBody::default(),
                },
            },
            Some("rule") => CssNode::Rule(serde_json::from_value(value)?),
            Some("font-face") => CssNode::FontFace(serde_json::from_value(value)?),
            Some("page") => CssNode::Page(serde_json::from_value(value)?),
            Some("media") => CssNode::Media(serde_json::from_value(value)?),
            Some("supports") => CssNode::Supports(serde_json::from_value(value)?),
            Some("document") => CssNode::Document(serde_json::from_value(value)?),
            Some("host") => CssNode::Host(serde_json::from_value(value)?),
            Some("keyframes") => CssNode::Keyframes(serde_json::from_value(value)?),
            Some("comment") => CssNode::Comment { comment: text_field(&value, "comment") },
            Some("import") => CssNode::Import { import: text_field(&value, "import") },
            other => CssNode::Group {
                kind: other.map(str::to_string),
                group: serde_json::from_value(value)?,
            },
        })
    }
}

fn text_field(value: &Value, field: &str) -> String {
    value.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

impl From<Value> for CssNode {
    fn from(value: Value) -> Self {
        let kind = value.get("type").and_then(Value::as_str).map(str::to_string);
        if !value.is_object() {
            warn!("Skipping CSS node that is not an object");
            return CssNode::Other { kind };
        }
        match CssNode::from_tagged(kind.as_deref(), value) {
            Ok(node) => node,
            Err(e) => {
                warn!(kind = ?kind, error = %e, "Skipping malformed CSS node");
                CssNode::Other { kind }
            }
        }
    }
}

impl From<RuleNode> for CssNode {
    fn from(rule: RuleNode) -> Self {
        CssNode::Rule(rule)
    }
}
