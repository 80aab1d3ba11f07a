// SPDX-License-Identifier: PMPL-1.0-or-later
//! Recursive traversal over a parsed stylesheet.
//!
//! Declaration-bearing nodes (`rule`, `font-face`, `page`) are handed to a
//! [`StyleVisitor`] exactly once, depth-first in document order. Comments,
//! imports and `@keyframes` blocks are skipped: keyframe declarations only
//! apply while an animation runs, so they are not default styling. Every
//! other node is treated as a group and its nested rules are descended.

use super::{CssNode, Declaration, Position, RuleNode};

/// Kind of declaration-bearing node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Rule,
    FontFace,
    Page,
}

/// A declaration-bearing node as seen by a visitor
#[derive(Debug, Clone, Copy)]
pub struct RuleBlock<'a> {
    pub kind: BlockKind,
    pub rule: &'a RuleNode,
}

impl<'a> RuleBlock<'a> {
    /// Selectors joined with commas, e.g. `"h1,h2"`
    pub fn selector_text(&self) -> String {
        self.rule.selectors.join(",")
    }

    /// First selector, if any
    pub fn first_selector(&self) -> Option<&'a str> {
        self.rule.selectors.first().map(String::as_str)
    }

    pub fn has_selectors(&self) -> bool {
        !self.rule.selectors.is_empty()
    }

    pub fn position(&self) -> Option<&'a Position> {
        self.rule.position.as_ref()
    }

    /// Declarations with both a property and a value
    pub fn declarations(&self) -> impl Iterator<Item = &'a Declaration> {
        self.rule.declarations.iter().filter(|d| d.is_complete())
    }

    /// Last complete declaration of `property`, if any
    pub fn find(&self, property: &str) -> Option<&'a Declaration> {
        self.declarations().filter(|d| d.property == property).last()
    }

    /// Render the block back to CSS text
    pub fn to_css(&self) -> String {
        let head = match self.kind {
            BlockKind::Rule => self.rule.selectors.join(",\n"),
            BlockKind::FontFace => "@font-face".to_string(),
            BlockKind::Page if self.has_selectors() => {
                format!("@page {}", self.rule.selectors.join(", "))
            }
            BlockKind::Page => "@page".to_string(),
        };

        let mut css = format!("{} {{\n", head);
        for declaration in self.declarations() {
            css.push_str(&format!("  {}: {};\n", declaration.property, declaration.value));
        }
        css.push('}');
        css
    }
}

/// Callbacks invoked while walking a stylesheet
pub trait StyleVisitor {
    /// Called once per declaration-bearing node.
    ///
    /// The default forwards every complete declaration to
    /// [`visit_declaration`](StyleVisitor::visit_declaration); override it to
    /// inspect a block as a whole.
    fn visit_block(&mut self, block: RuleBlock<'_>) {
        for declaration in block.declarations() {
            self.visit_declaration(block, declaration);
        }
    }

    /// Called once per complete declaration
    fn visit_declaration(&mut self, _block: RuleBlock<'_>, _declaration: &Declaration) {}
}

/// Walk `node` and everything nested below it
pub fn walk<V: StyleVisitor + ?Sized>(node: &CssNode, visitor: &mut V) {
    match node {
        CssNode::Comment { .. } | CssNode::Keyframes(_) | CssNode::Import { .. } => {}
        CssNode::Rule(rule) => visitor.visit_block(RuleBlock { kind: BlockKind::Rule, rule }),
        CssNode::FontFace(rule) => visitor.visit_block(RuleBlock { kind: BlockKind::FontFace, rule }),
        CssNode::Page(rule) => visitor.visit_block(RuleBlock { kind: BlockKind::Page, rule }),
        CssNode::Stylesheet { stylesheet } => {
            for child in &stylesheet.rules {
                walk(child, visitor);
            }
        }
        CssNode::Media(group)
        | CssNode::Supports(group)
        | CssNode::Document(group)
        | CssNode::Host(group)
        | CssNode::Group { group, .. } => {
            for child in &group.rules {
                walk(child, visitor);
            }
        }
        CssNode::Other { .. } => {}
    }
}

struct BlockFn<F>(F);

impl<F> StyleVisitor for BlockFn<F>
where
    F: FnMut(RuleBlock<'_>),
{
    fn visit_block(&mut self, block: RuleBlock<'_>) {
        (self.0)(block);
    }
}

struct DeclarationFn<F>(F);

impl<F> StyleVisitor for DeclarationFn<F>
where
    F: FnMut(RuleBlock<'_>, &Declaration),
{
    fn visit_declaration(&mut self, block: RuleBlock<'_>, declaration: &Declaration) {
        (self.0)(block, declaration);
    }
}

/// Call `f` for every declaration-bearing block under `node`
pub fn for_each_block<F>(node: &CssNode, f: F)
where
    F: FnMut(RuleBlock<'_>),
{
    walk(node, &mut BlockFn(f));
}

/// Call `f` for every complete declaration under `node`
pub fn for_each_declaration<F>(node: &CssNode, f: F)
where
    F: FnMut(RuleBlock<'_>, &Declaration),
{
    walk(node, &mut DeclarationFn(f));
}
