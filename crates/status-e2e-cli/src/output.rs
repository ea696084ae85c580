//! Console output for reports, catalogs and links

use console::{style, Term};
use status_e2e::{AssertionSummary, CaseOutcome, SuiteReport};

/// Writes results to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a line unless quiet
    pub fn line(&self, message: &str) {
        if !self.quiet {
            let _ = self.term.write_line(message);
        }
    }

    /// Print a line even in quiet mode
    pub fn always(&self, message: &str) {
        let _ = self.term.write_line(message);
    }

    /// Print a suite report. Failing cases are shown even in quiet mode.
    pub fn report(&self, report: &SuiteReport) {
        self.line(&format!(
            "Suite {} (group {}) run {}",
            report.suite, report.group, report.run_id
        ));
        for case in &report.cases {
            let failing = case.outcome.is_failure();
            if self.quiet && !failing {
                continue;
            }
            self.always(&format!(
                "  {} [{}] {} ({} ms, {})",
                self.label(&case.outcome),
                case.meta.testrail_id,
                case.meta.name,
                case.duration_ms,
                checks_label(&case.checks)
            ));
            for detail in outcome_details(&case.outcome) {
                self.always(&format!("      {detail}"));
            }
        }
        let summary = format!(
            "{} passed, {} failed, {} errored, {} skipped",
            report.passed_count(),
            report.failed_count(),
            report.errored_count(),
            report.skipped_count()
        );
        if report.all_passed() {
            self.line(&summary);
        } else {
            self.always(&summary);
        }
    }

    fn label(&self, outcome: &CaseOutcome) -> String {
        let text = format!("{:<7}", outcome.label());
        if !self.use_color {
            return text;
        }
        match outcome {
            CaseOutcome::Passed => style(text).green().bold().to_string(),
            CaseOutcome::Failed { .. } => style(text).red().bold().to_string(),
            CaseOutcome::Errored { .. } => style(text).magenta().bold().to_string(),
            CaseOutcome::Skipped { .. } => style(text).yellow().to_string(),
        }
    }
}

/// Numbered soft failures, fatal error and skip reason of an outcome
fn outcome_details(outcome: &CaseOutcome) -> Vec<String> {
    match outcome {
        CaseOutcome::Passed => Vec::new(),
        CaseOutcome::Failed { soft } => numbered(soft),
        CaseOutcome::Errored { fatal, soft } => {
            let mut lines = vec![format!("error: {fatal}")];
            lines.extend(numbered(soft));
            lines
        }
        CaseOutcome::Skipped { reason } => vec![format!("skipped: {reason}")],
    }
}

fn checks_label(checks: &AssertionSummary) -> String {
    match checks.failed {
        0 => format!("{} checks", checks.total),
        failed => format!("{failed} of {} checks failed", checks.total),
    }
}

fn numbered(messages: &[String]) -> Vec<String> {
    messages
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{}. {m}", i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_for_each_outcome() {
        assert!(outcome_details(&CaseOutcome::Passed).is_empty());
        assert_eq!(
            outcome_details(&CaseOutcome::Failed {
                soft: vec!["a".to_string(), "b".to_string()]
            }),
            vec!["1. a", "2. b"]
        );
        assert_eq!(
            outcome_details(&CaseOutcome::Errored {
                fatal: "boom".to_string(),
                soft: vec!["a".to_string()]
            }),
            vec!["error: boom", "1. a"]
        );
        assert_eq!(
            outcome_details(&CaseOutcome::Skipped {
                reason: "not ready".to_string()
            }),
            vec!["skipped: not ready"]
        );
    }

    #[test]
    fn test_checks_label() {
        assert_eq!(checks_label(&AssertionSummary::default()), "0 checks");
        let checks = AssertionSummary {
            total: 3,
            passed: 2,
            failed: 1,
        };
        assert_eq!(checks_label(&checks), "1 of 3 checks failed");
    }

    #[test]
    fn test_plain_label_is_padded() {
        let reporter = Reporter::new(false, false);
        assert_eq!(reporter.label(&CaseOutcome::Passed), "PASSED ");
    }
}
