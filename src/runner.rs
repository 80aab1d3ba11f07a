// SPDX-License-Identifier: PMPL-1.0-or-later
//! Execution orchestrator.
//!
//! Every enabled technique runs as its own tokio task against the shared,
//! read-only input. Once all tasks have finished the runner collects each
//! technique's final state into the report and resets the live instance.
//! A technique that returns an error or panics is logged and reported with
//! whatever results it accumulated before the fault.

use crate::config::Configuration;
use crate::registry::TechniqueRegistry;
use crate::report::Report;
use crate::technique::EvaluationInput;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs the enabled techniques of a registry
#[derive(Debug)]
pub struct TechniqueRunner {
    registry: TechniqueRegistry,
}

impl Default for TechniqueRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TechniqueRunner {
    /// Runner over the built-in catalog, optionally configured
    pub fn new(config: Option<&Configuration>) -> Self {
        let mut runner = Self::with_registry(TechniqueRegistry::with_defaults());
        if let Some(config) = config {
            runner.configure(config);
        }
        runner
    }

    /// Runner over a custom registry
    pub fn with_registry(registry: TechniqueRegistry) -> Self {
        Self { registry }
    }

    /// Select techniques for subsequent runs
    pub fn configure(&mut self, config: &Configuration) {
        self.registry.configure(config);
    }

    pub fn reset_configuration(&mut self) {
        self.registry.reset_configuration();
    }

    pub fn registry(&self) -> &TechniqueRegistry {
        &self.registry
    }

    /// Run all enabled techniques and assemble the report
    pub async fn execute(&mut self, input: EvaluationInput) -> Report {
        let input = Arc::new(input);
        let enabled = self.registry.entries().iter().filter(|e| e.enabled);

        let mut handles = Vec::new();
        for entry in enabled {
            debug!(code = %entry.code, "Dispatching technique");
            let technique = Arc::clone(&entry.technique);
            let input = Arc::clone(&input);
            let handle = tokio::spawn(async move {
                let mut technique = technique.lock().await;
                technique.execute(&input).await
            });
            handles.push((entry, handle));
        }

        info!(
            techniques = handles.len(),
            stylesheets = input.stylesheets.len(),
            dom = input.dom.is_some(),
            "Running techniques"
        );

        let mut report = Report::new();
        for (entry, handle) in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(code = %entry.code, error = %e, "Technique failed, keeping partial results");
                }
                Err(e) => {
                    error!(code = %entry.code, error = %e, "Technique task aborted, keeping partial results");
                }
            }

            let mut technique = entry.technique.lock().await;
            let state = technique.final_results();
            technique.reset();

            debug!(code = %entry.code, outcome = %state.outcome(), "Technique finished");
            report.add(state);
        }

        info!(
            passed = report.metadata.passed,
            warning = report.metadata.warning,
            failed = report.metadata.failed,
            inapplicable = report.metadata.inapplicable,
            "Run complete"
        );

        report
    }
}
