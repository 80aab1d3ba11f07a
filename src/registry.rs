// SPDX-License-Identifier: PMPL-1.0-or-later
//! Technique registry and configuration filter.
//!
//! The registry owns one live instance per technique, in registration
//! order, together with its enabled flag. [`TechniqueRegistry::configure`]
//! recomputes every flag from the all-enabled baseline:
//!
//! - principles given: enabled iff a success criterion matches one of the
//!   principles at one of the levels (all levels when none are given)
//! - only levels given: same match against all four principles
//! - techniques given alone: enabled iff the code or mapping is listed
//! - techniques given alongside principles/levels: a listed code or mapping
//!   re-enables the technique, it never disables one

use crate::config::Configuration;
use crate::technique::{Descriptor, Principle, Technique, WcagLevel};
use crate::techniques;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Live technique instance shared with the task executing it
pub type SharedTechnique = Arc<Mutex<Box<dyn Technique>>>;

/// One registered technique
pub struct RegistryEntry {
    pub code: String,
    pub mapping: String,
    /// Copy of the technique's descriptor, readable without locking
    pub descriptor: Descriptor,
    pub enabled: bool,
    pub technique: SharedTechnique,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("code", &self.code)
            .field("mapping", &self.mapping)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Ordered set of technique instances with enable flags
#[derive(Debug, Default)]
pub struct TechniqueRegistry {
    entries: Vec<RegistryEntry>,
}

impl TechniqueRegistry {
    /// Register the given techniques, all enabled
    pub fn new(techniques: Vec<Box<dyn Technique>>) -> Self {
        let entries = techniques
            .into_iter()
            .map(|technique| {
                let descriptor = technique.descriptor().clone();
                RegistryEntry {
                    code: descriptor.code.clone(),
                    mapping: descriptor.mapping.clone(),
                    descriptor,
                    enabled: true,
                    technique: Arc::new(Mutex::new(technique)),
                }
            })
            .collect();
        Self { entries }
    }

    /// Registry holding the built-in catalog
    pub fn with_defaults() -> Self {
        Self::new(techniques::all())
    }

    /// Recompute every enabled flag from `config`
    pub fn configure(&mut self, config: &Configuration) {
        self.reset_configuration();

        let config = config.normalized();
        let all_principles: Vec<String> = Principle::ALL.iter().map(|p| p.as_str().to_string()).collect();
        let all_levels: Vec<String> = WcagLevel::ALL.iter().map(|l| l.as_str().to_string()).collect();
        let filtered = !config.principles.is_empty() || !config.levels.is_empty();

        for entry in &mut self.entries {
            if !config.principles.is_empty() {
                let levels = if config.levels.is_empty() { &all_levels } else { &config.levels };
                entry.enabled = entry.descriptor.has_principle_and_levels(&config.principles, levels);
            } else if !config.levels.is_empty() {
                entry.enabled = entry.descriptor.has_principle_and_levels(&all_principles, &config.levels);
            }

            if !config.techniques.is_empty() {
                let listed = config.techniques.iter().any(|t| *t == entry.code || *t == entry.mapping);
                entry.enabled = if filtered { entry.enabled || listed } else { listed };
            }

            debug!(code = %entry.code, enabled = entry.enabled, "Configured technique");
        }
    }

    /// Enable every technique
    pub fn reset_configuration(&mut self) {
        for entry in &mut self.entries {
            entry.enabled = true;
        }
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get(code).is_some_and(|e| e.enabled)
    }

    /// Codes of enabled techniques in registration order
    pub fn enabled_codes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.code.as_str())
            .collect()
    }

    pub fn get(&self, code: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.code == code)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
