//! Scenario driver for the tagheap allocator.
//!
//! This crate provides:
//! - Scenarios: named allocation/free call sequences exercising the engine
//!   end-to-end (first-fit reuse, slab spill and release, the oversized
//!   boundary, high-volume churn), each asserting its observable outcome
//! - Report generation: human-readable markdown + machine-readable JSON

#![forbid(unsafe_code)]

pub mod report;
pub mod scenario;

pub use report::HarnessReport;
pub use scenario::{Scenario, ScenarioReport, StepRecord};
