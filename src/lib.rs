// SPDX-License-Identifier: PMPL-1.0-or-later
//! css-techniques - WCAG CSS technique evaluator
//!
//! Runs a catalog of accessibility techniques against parsed stylesheets
//! (and, for element checks, a mapped DOM) and collects their verdicts into
//! one report.
//!
//! ## Flow
//!
//! A [`Configuration`] selects techniques by principle, level or code. The
//! [`TechniqueRunner`] executes every enabled technique concurrently
//! against a shared read-only [`EvaluationInput`], then folds each
//! technique's final state into a [`Report`] and resets it for the next run.
//!
//! ## Techniques
//!
//! - **QW-CSS-T1** (C12/C13/C14): relative font sizes
//! - **QW-CSS-T2** (C19): left or right text alignment
//! - **QW-CSS-T3** (C21): line spacing between 1.5 and 2
//! - **QW-CSS-T4** (C22): CSS-styled text presentation
//! - **QW-CSS-T5** (C24): percentage container widths
//! - **QW-CSS-T6** (F4): `text-decoration: blink`
//! - **QW-CSS-T7** (F24): foreground/background color pairing
//! - **QW-CSS-T9** (F88): justified text

pub mod config;
pub mod dom;
pub mod error;
pub mod registry;
pub mod report;
pub mod runner;
pub mod stylesheet;
pub mod technique;
pub mod techniques;

pub use config::Configuration;
pub use dom::{DomContext, ElementId, MappedDom};
pub use error::{Error, Result};
pub use registry::TechniqueRegistry;
pub use report::Report;
pub use runner::TechniqueRunner;
pub use stylesheet::Stylesheet;
pub use technique::{EvaluationInput, Technique, TechniqueState, Verdict};
