use crate::filter::resolve::ResolvedTargetSet;
use crate::runner::display;
use crate::runner::execute::{ExecErrorKind, ProcessRunner};
use crate::runner::result::{AggregateReport, RunResult};

/// Everything produced by one multi-target run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOutcome {
    pub report: AggregateReport,
    pub results: Vec<RunResult>,
    /// The run was cancelled before every target executed.
    pub aborted: bool,
}

/// Run every resolved target in lexicographic order and print the final
/// report.
///
/// Targets run one at a time. A target whose result carries the crash
/// signature is counted as an execution error and excluded from the
/// totals; a spawn or I/O failure for one target is reported and treated
/// the same way, and the run continues. Cancellation stops the run after
/// the current target's teardown; the report still covers every target
/// that completed.
pub fn run_all(runner: &ProcessRunner<'_>, targets: &ResolvedTargetSet) -> AggregateOutcome {
    let mut results = Vec::with_capacity(targets.len());
    let mut aborted = false;

    for (target, exclusions) in targets {
        match runner.run_target(target, exclusions) {
            Ok(result) => results.push(result),
            Err(e) if e.kind == ExecErrorKind::Aborted => {
                eprintln!("TEST RUN STOPPED VIA MANUAL EXIT");
                aborted = true;
                break;
            }
            Err(e) => {
                eprintln!("{e}");
                results.push(RunResult::empty(target));
            }
        }
    }

    let mut report = summarize(&results);
    if aborted {
        report.overall_success = false;
    }
    print!("{}", display::format_report(&results, &report));

    AggregateOutcome {
        report,
        results,
        aborted,
    }
}

/// Fold per-target results into the grand totals.
///
/// Pure and order-independent for the totals: results classified as
/// execution errors set `had_error` and contribute nothing to the sums.
pub fn summarize(results: &[RunResult]) -> AggregateReport {
    let mut total_run = 0;
    let mut total_passed = 0;
    let mut total_failed = 0;
    let mut had_error = false;

    for result in results {
        if result.is_error() {
            had_error = true;
            continue;
        }
        total_run += result.total_count;
        total_passed += result.passed_count;
        total_failed += result.failed_count;
    }

    AggregateReport {
        total_run,
        total_passed,
        total_failed,
        had_error,
        overall_success: !had_error && total_failed == 0,
    }
}
