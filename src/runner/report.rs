use serde::Serialize;

use crate::runner::aggregate::AggregateOutcome;
use crate::runner::result::{AggregateReport, RunResult};

/// Machine-readable record of one run, written on request.
#[derive(Debug, Clone, Serialize)]
pub struct TestRunReport {
    pub platform: String,
    pub config: String,
    pub aborted: bool,
    pub targets: Vec<RunResult>,
    pub summary: AggregateReport,
}

/// Convert an [`AggregateOutcome`] into a serializable report.
pub fn to_report(platform: &str, config: &str, outcome: &AggregateOutcome) -> TestRunReport {
    TestRunReport {
        platform: platform.to_owned(),
        config: config.to_owned(),
        aborted: outcome.aborted,
        targets: outcome.results.clone(),
        summary: outcome.report.clone(),
    }
}

/// Serialize a report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error string if serialization fails.
pub fn emit_report_json(report: &TestRunReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("failed to serialize report: {e}"))
}
