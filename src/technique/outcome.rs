// SPDX-License-Identifier: PMPL-1.0-or-later
//! Reduces a technique's tally and results to one outcome.
//!
//! Precedence is fixed: any failure wins, then any warning, then any pass;
//! with none of those the technique is inapplicable. The representative
//! description is the first result carrying the winning verdict.

use super::{EvaluationResult, Tally, Verdict};
use serde::{Deserialize, Serialize};

/// Summary verdict of a technique run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub verdict: Verdict,
    pub description: String,
}

/// Compute the outcome of a run
pub fn aggregate(tally: &Tally, results: &[EvaluationResult]) -> Outcome {
    let verdict = if tally.failed > 0 {
        Verdict::Failed
    } else if tally.warning > 0 {
        Verdict::Warning
    } else if tally.passed > 0 {
        Verdict::Passed
    } else {
        Verdict::Inapplicable
    };

    let description = results
        .iter()
        .find(|r| r.verdict == verdict)
        .map(|r| r.description.clone())
        .unwrap_or_default();

    Outcome { verdict, description }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(passed: u32, warning: u32, failed: u32, inapplicable: u32) -> Tally {
        Tally { passed, warning, failed, inapplicable }
    }

    #[test]
    fn test_failed_wins_over_everything() {
        let outcome = aggregate(&tally(5, 3, 1, 2), &[]);
        assert_eq!(outcome.verdict, Verdict::Failed);
    }

    #[test]
    fn test_warning_wins_without_failures() {
        let outcome = aggregate(&tally(7, 1, 0, 4), &[]);
        assert_eq!(outcome.verdict, Verdict::Warning);
    }

    #[test]
    fn test_passed_without_failures_or_warnings() {
        let outcome = aggregate(&tally(1, 0, 0, 9), &[]);
        assert_eq!(outcome.verdict, Verdict::Passed);
    }

    #[test]
    fn test_all_zero_is_inapplicable() {
        let outcome = aggregate(&Tally::default(), &[]);
        assert_eq!(outcome.verdict, Verdict::Inapplicable);
        assert!(outcome.description.is_empty());
    }

    #[test]
    fn test_only_inapplicable_results() {
        let results = vec![EvaluationResult::new(Verdict::Inapplicable, "unknown metric")];
        let outcome = aggregate(&tally(0, 0, 0, 1), &results);
        assert_eq!(outcome.verdict, Verdict::Inapplicable);
        assert_eq!(outcome.description, "unknown metric");
    }

    #[test]
    fn test_description_is_first_matching_result() {
        let results = vec![
            EvaluationResult::new(Verdict::Passed, "fine"),
            EvaluationResult::new(Verdict::Failed, "first failure"),
            EvaluationResult::new(Verdict::Failed, "second failure"),
        ];
        let outcome = aggregate(&tally(1, 0, 2, 0), &results);
        assert_eq!(outcome.description, "first failure");
    }
}
