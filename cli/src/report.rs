//! Scenario run results.

use serde::Serialize;

/// Outcome counters for one scenario run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub scenario: String,
    /// Steps executed, assertions included.
    pub steps_run: u64,
    /// Operations the ledger rejected.
    pub steps_rejected: u64,
    /// Assertions that held.
    pub assertions_passed: u64,
    /// Assertions that did not hold.
    pub assertions_failed: u64,
    /// One message per failed assertion.
    pub failures: Vec<String>,
}

impl ScenarioReport {
    /// Create an empty report.
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            ..Self::default()
        }
    }

    /// Record an operation the ledger accepted.
    pub fn record_success(&mut self) {
        self.steps_run += 1;
    }

    /// Record an operation the ledger rejected.
    pub fn record_rejection(&mut self) {
        self.steps_run += 1;
        self.steps_rejected += 1;
    }

    /// Record an assertion result.
    pub fn record_assertion(&mut self, step: usize, outcome: Result<(), String>) {
        self.steps_run += 1;
        match outcome {
            Ok(()) => self.assertions_passed += 1,
            Err(message) => {
                self.assertions_failed += 1;
                self.failures.push(format!("step {}: {}", step + 1, message));
            }
        }
    }

    /// Whether every assertion held.
    pub fn passed(&self) -> bool {
        self.assertions_failed == 0
    }

    /// Plain-text summary.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Scenario {}: {}\n  steps run:  {}\n  rejected:   {}\n  assertions: {} passed, {} failed",
            self.scenario,
            if self.passed() { "PASSED" } else { "FAILED" },
            self.steps_run,
            self.steps_rejected,
            self.assertions_passed,
            self.assertions_failed
        );
        for failure in &self.failures {
            out.push_str("\n  - ");
            out.push_str(failure);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = ScenarioReport::new("demo");
        report.record_success();
        report.record_rejection();
        report.record_assertion(2, Ok(()));
        assert!(report.passed());

        report.record_assertion(3, Err("balance was 5".to_string()));
        assert!(!report.passed());
        assert_eq!(report.steps_run, 4);
        assert_eq!(report.steps_rejected, 1);
        assert_eq!(report.failures, vec!["step 4: balance was 5".to_string()]);
    }

    #[test]
    fn test_render() {
        let mut report = ScenarioReport::new("demo");
        report.record_assertion(0, Err("nope".to_string()));
        let text = report.render();
        assert!(text.starts_with("Scenario demo: FAILED"));
        assert!(text.ends_with("- step 1: nope"));
    }
}
