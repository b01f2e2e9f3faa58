//! Report generation for scenario runs.

use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioReport;

/// A harness report combining every scenario run of one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessReport {
    /// Report title.
    pub title: String,
    /// Scenario outcomes in run order.
    pub scenarios: Vec<ScenarioReport>,
    /// Total scenarios run.
    pub total: usize,
    /// Scenarios in which every step passed.
    pub passed: usize,
    /// Scenarios with at least one failed step.
    pub failed: usize,
}

impl HarnessReport {
    /// Builds the summary over a set of scenario runs.
    #[must_use]
    pub fn new(title: impl Into<String>, scenarios: Vec<ScenarioReport>) -> Self {
        let total = scenarios.len();
        let passed = scenarios.iter().filter(|report| report.passed).count();
        Self {
            title: title.into(),
            total,
            passed,
            failed: total - passed,
            scenarios,
        }
    }

    /// True iff no scenario failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Total: {}\n", self.total));
        out.push_str(&format!("- Passed: {}\n", self.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.failed));

        out.push_str("| Scenario | Step | Detail | Status |\n");
        out.push_str("|----------|------|--------|--------|\n");
        for scenario in &self.scenarios {
            for step in &scenario.steps {
                let status = if step.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    scenario.scenario, step.label, step.detail, status
                ));
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn report_summarizes_scenarios() {
        let report = HarnessReport::new("tagheap scenarios", vec![Scenario::Reuse.run()]);
        assert_eq!(report.total, 1);
        assert_eq!(report.failed, 0);
        assert!(report.all_passed());

        let markdown = report.to_markdown();
        assert!(markdown.contains("# tagheap scenarios"));
        assert!(markdown.contains("| reuse |"));
        assert!(markdown.contains("PASS"));
    }

    #[test]
    fn report_json_round_trips() {
        let report = HarnessReport::new("round trip", vec![Scenario::Smoke.run()]);
        let json = report.to_json();
        let parsed: HarnessReport = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed.total, report.total);
        assert_eq!(parsed.scenarios[0].scenario, "smoke");
    }
}
