// SPDX-License-Identifier: PMPL-1.0-or-later
//! Technique selection configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Which techniques a run should execute.
///
/// Every list is optional; an empty configuration enables everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// WCAG principles, e.g. `perceivable`
    #[serde(default)]
    pub principles: Vec<String>,

    /// Conformance levels, e.g. `aa`
    #[serde(default)]
    pub levels: Vec<String>,

    /// Technique codes or catalog mappings, e.g. `QW-CSS-T1` or `C19`
    #[serde(default)]
    pub techniques: Vec<String>,
}

impl Configuration {
    pub fn is_empty(&self) -> bool {
        self.principles.is_empty() && self.levels.is_empty() && self.techniques.is_empty()
    }

    /// Trimmed copy with principles in title case and levels/techniques in
    /// upper case. Blank entries are dropped.
    pub fn normalized(&self) -> Self {
        Self {
            principles: normalize(&self.principles, title_case),
            levels: normalize(&self.levels, |s| s.to_uppercase()),
            techniques: normalize(&self.techniques, |s| s.to_uppercase()),
        }
    }

    /// Replace each list that is non-empty in `overrides`
    pub fn merge(mut self, overrides: Configuration) -> Self {
        if !overrides.principles.is_empty() {
            self.principles = overrides.principles;
        }
        if !overrides.levels.is_empty() {
            self.levels = overrides.levels;
        }
        if !overrides.techniques.is_empty() {
            self.techniques = overrides.techniques;
        }
        self
    }
}

fn normalize(values: &[String], f: impl Fn(&str) -> String) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(f)
        .collect()
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Load configuration from a YAML, TOML or JSON file.
///
/// A missing file yields the default configuration.
pub fn load_config(path: &Path) -> Result<Configuration> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Configuration::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config: Configuration = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };

    debug!(?config, "Loaded configuration");
    Ok(config)
}
