//! utr — cross-platform unit test orchestrator.
//!
//! Resolves which gtest test binaries and sub-tests run for a given
//! platform/configuration, builds them through an external build system,
//! launches each binary as a subprocess while streaming its output live,
//! parses pass/fail counts from the captured text, and aggregates the
//! results into a single verdict.

pub mod cancel;
pub mod catalog;
pub mod cli;
pub mod filter;
pub mod runner;
