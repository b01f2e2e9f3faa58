//! Built-in scenarios: allocation/free call sequences with checked
//! outcomes.
//!
//! Each scenario runs against a fresh heap and records one `StepRecord`
//! per observable claim. Scenarios never abort: engine faults are folded
//! into failed steps so a report is always produced.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tagheap_core::Heap;
use tagheap_core::geometry::MAX_SLAB_ALLOC;

/// A named allocation/free sequence with checked outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Interleaved alloc/free/dump mirroring a small program's lifetime.
    Smoke,
    /// First-fit reuse of a freed region at the same address.
    Reuse,
    /// Chain growth into a second slab and its release when emptied.
    Spill,
    /// The slab ceiling and the oversized bypass around it.
    Oversized,
    /// A thousand allocations written, verified, and freed.
    Churn,
}

/// Raised by the CLI when a scenario name does not resolve.
#[derive(Debug, Error)]
#[error("unknown scenario `{0}` (try `list`)")]
pub struct UnknownScenario(pub String);

impl Scenario {
    /// Every scenario, in run order.
    pub const ALL: [Self; 5] = [
        Self::Smoke,
        Self::Reuse,
        Self::Spill,
        Self::Oversized,
        Self::Churn,
    ];

    /// CLI name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Reuse => "reuse",
            Self::Spill => "spill",
            Self::Oversized => "oversized",
            Self::Churn => "churn",
        }
    }

    /// One-line description for `list`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Smoke => "interleaved alloc/free with payload integrity checks",
            Self::Reuse => "freed region is reused at the same address",
            Self::Spill => "chain grows into a second slab and shrinks back",
            Self::Oversized => "slab ceiling routes to the oversized path",
            Self::Churn => "1000 x 256-byte allocations written and freed",
        }
    }

    /// Resolves a CLI name.
    pub fn from_name(name: &str) -> Result<Self, UnknownScenario> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == name)
            .ok_or_else(|| UnknownScenario(name.to_string()))
    }

    /// Runs the scenario against a fresh heap.
    #[must_use]
    pub fn run(self) -> ScenarioReport {
        let mut run = ScenarioRun::new(self.name());
        match self {
            Self::Smoke => run_smoke(&mut run),
            Self::Reuse => run_reuse(&mut run),
            Self::Spill => run_spill(&mut run),
            Self::Oversized => run_oversized(&mut run),
            Self::Churn => run_churn(&mut run),
        }
        run.finish()
    }
}

/// One checked claim inside a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// What the step claims.
    pub label: String,
    /// Observed detail (address, count, fault text).
    pub detail: String,
    /// Whether the claim held.
    pub passed: bool,
}

/// Outcome of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub scenario: String,
    /// Every checked step, in execution order.
    pub steps: Vec<StepRecord>,
    /// True iff every step passed.
    pub passed: bool,
    /// Rendered final heap dump.
    pub final_dump: String,
}

/// Execution state threaded through a scenario.
struct ScenarioRun {
    name: &'static str,
    heap: Heap,
    steps: Vec<StepRecord>,
}

impl ScenarioRun {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            heap: Heap::new(),
            steps: Vec::new(),
        }
    }

    fn check(&mut self, label: &str, passed: bool, detail: String) {
        self.steps.push(StepRecord {
            label: label.to_string(),
            detail,
            passed,
        });
    }

    /// Allocates and records the step; 0 stands in for failure.
    fn alloc(&mut self, label: &str, size: usize, align: usize) -> usize {
        match self.heap.allocate(size, align) {
            Ok(addr) => {
                self.check(label, true, format!("{size} bytes at {addr:#x}"));
                addr
            }
            Err(fault) => {
                self.check(label, false, fault.to_string());
                0
            }
        }
    }

    fn free(&mut self, label: &str, addr: usize) {
        match self.heap.release(addr) {
            Ok(()) => self.check(label, true, format!("freed {addr:#x}")),
            Err(fault) => self.check(label, false, fault.to_string()),
        }
    }

    /// Fills a payload with a marker byte.
    fn stamp(&mut self, addr: usize, marker: u8) {
        if let Ok(payload) = self.heap.payload_mut(addr) {
            payload.fill(marker);
        }
    }

    /// Checks a payload still carries its marker byte.
    fn check_stamp(&mut self, label: &str, addr: usize, marker: u8) {
        let intact = self
            .heap
            .payload(addr)
            .map(|payload| payload.iter().all(|&b| b == marker))
            .unwrap_or(false);
        self.check(label, intact, format!("marker {marker:#04x} at {addr:#x}"));
    }

    fn check_leaks(&mut self, label: &str, expected: usize) {
        match self.heap.leak_check() {
            Ok(report) => {
                let found = report.leaks.len();
                self.check(label, found == expected, format!("{found} live (expected {expected})"));
            }
            Err(fault) => self.check(label, false, fault.to_string()),
        }
    }

    fn check_slab_count(&mut self, label: &str, expected: usize) {
        let count = self.heap.slab_count();
        self.check(
            label,
            count == expected,
            format!("{count} slabs (expected {expected})"),
        );
    }

    fn finish(self) -> ScenarioReport {
        let final_dump = match self.heap.dump() {
            Ok(dump) => dump.to_string(),
            Err(fault) => format!("(dump failed: {fault})"),
        };
        ScenarioReport {
            scenario: self.name.to_string(),
            passed: self.steps.iter().all(|step| step.passed),
            steps: self.steps,
            final_dump,
        }
    }
}

fn run_smoke(run: &mut ScenarioRun) {
    let a = run.alloc("allocate 400", 400, 1);
    run.stamp(a, 0x11);
    let b = run.alloc("allocate 4", 4, 1);
    run.stamp(b, 0x22);

    run.free("free the first allocation", a);
    let c = run.alloc("reallocate into the freed region", 4, 1);
    run.check(
        "first-fit lands on the freed address",
        c == a,
        format!("{c:#x} vs {a:#x}"),
    );
    run.check_stamp("small neighbor kept its payload", b, 0x22);

    let big = run.alloc("allocate an oversized block", 100_000, 1);
    run.stamp(big, 0x33);
    run.check_stamp("oversized payload round-trips", big, 0x33);
    run.free("free the oversized block", big);

    run.check_leaks("two live regions remain", 2);
    run.free("free the reallocation", c);
    run.free("free the small allocation", b);
    run.check_leaks("heap is clean", 0);
}

fn run_reuse(run: &mut ScenarioRun) {
    let first = run.alloc("allocate 256", 256, 1);
    run.free("free it", first);
    let second = run.alloc("allocate 128 into the gap", 128, 1);
    run.check(
        "same address is returned",
        second == first,
        format!("{second:#x} vs {first:#x}"),
    );
    run.free("free the reuse", second);
    run.check_leaks("heap is clean", 0);
}

fn run_spill(run: &mut ScenarioRun) {
    let mut root_fill = Vec::new();
    for i in 0..3 {
        root_fill.push(run.alloc(&format!("fill root #{i}"), 4096, 1));
    }
    run.check_slab_count("still one slab", 1);

    let spilled = run.alloc("spill into a second slab", 4096, 1);
    run.check_slab_count("chain grew to two slabs", 2);

    run.free("free the spilled allocation", spilled);
    run.check_slab_count("empty slab returned its mapping", 1);

    for addr in root_fill {
        run.free("free a root allocation", addr);
    }
    run.check_slab_count("root slab is permanent", 1);
    run.check_leaks("heap is clean", 0);
}

fn run_oversized(run: &mut ScenarioRun) {
    let edge = run.alloc("allocate exactly the slab ceiling", MAX_SLAB_ALLOC, 1);
    run.check(
        "ceiling stays in the slab path",
        run.heap.oversized_count() == 0,
        format!("{} oversized mappings", run.heap.oversized_count()),
    );
    run.free("free the ceiling allocation", edge);

    let big = run.alloc("allocate one byte past the ceiling", MAX_SLAB_ALLOC + 1, 1);
    run.check(
        "one byte more goes oversized",
        run.heap.oversized_count() == 1,
        format!("{} oversized mappings", run.heap.oversized_count()),
    );
    run.stamp(big, 0x44);
    run.check_stamp("oversized payload round-trips", big, 0x44);
    run.free("free the oversized block", big);
    run.check_slab_count("slab chain untouched throughout", 1);
    run.check_leaks("heap is clean", 0);
}

fn run_churn(run: &mut ScenarioRun) {
    let mut addrs = Vec::with_capacity(1000);
    let mut alloc_failures = 0usize;
    for i in 0..1000usize {
        match run.heap.allocate(256, 1) {
            Ok(addr) => {
                run.stamp(addr, (i % 251) as u8);
                addrs.push((addr, (i % 251) as u8));
            }
            Err(_) => alloc_failures += 1,
        }
    }
    run.check(
        "1000 allocations placed",
        alloc_failures == 0,
        format!("{alloc_failures} failures"),
    );
    let slabs = run.heap.slab_count();
    run.check(
        "chain spilled past the root",
        slabs > 1,
        format!("{slabs} slabs"),
    );

    let mut intact = true;
    let mut free_failures = 0usize;
    for &(addr, marker) in &addrs {
        intact &= run
            .heap
            .payload(addr)
            .map(|payload| payload.iter().all(|&b| b == marker))
            .unwrap_or(false);
        if run.heap.release(addr).is_err() {
            free_failures += 1;
        }
    }
    run.check("every payload survived", intact, String::from("1000 markers"));
    run.check(
        "every free succeeded",
        free_failures == 0,
        format!("{free_failures} failures"),
    );
    run.check_slab_count("chain shrank back to the root", 1);
    run.check_leaks("heap is clean", 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_has_a_unique_name() {
        for (i, a) in Scenario::ALL.iter().enumerate() {
            for b in &Scenario::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn from_name_resolves_and_rejects() {
        assert_eq!(Scenario::from_name("smoke").unwrap(), Scenario::Smoke);
        assert_eq!(Scenario::from_name("churn").unwrap(), Scenario::Churn);
        assert!(Scenario::from_name("bogus").is_err());
    }

    #[test]
    fn smoke_scenario_passes() {
        let report = Scenario::Smoke.run();
        assert!(
            report.passed,
            "failed steps: {:?}",
            report
                .steps
                .iter()
                .filter(|step| !step.passed)
                .collect::<Vec<_>>()
        );
        assert!(!report.final_dump.is_empty());
    }
}
