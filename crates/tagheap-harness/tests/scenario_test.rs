//! Every built-in scenario must pass end-to-end.

use tagheap_harness::{HarnessReport, Scenario};

#[test]
fn all_scenarios_pass() {
    for scenario in Scenario::ALL {
        let report = scenario.run();
        let failures: Vec<_> = report.steps.iter().filter(|step| !step.passed).collect();
        assert!(
            report.passed,
            "scenario `{}` failed: {failures:?}",
            report.scenario
        );
    }
}

#[test]
fn combined_report_is_clean() {
    let reports = Scenario::ALL.into_iter().map(Scenario::run).collect();
    let report = HarnessReport::new("full sweep", reports);
    assert_eq!(report.total, Scenario::ALL.len());
    assert!(report.all_passed(), "{}", report.to_markdown());
}

#[test]
fn final_dumps_show_the_permanent_root() {
    for scenario in Scenario::ALL {
        let report = scenario.run();
        assert!(
            report.final_dump.contains(" :: slab 0x10000"),
            "scenario `{}` dump is missing the root slab",
            report.scenario
        );
    }
}
