use crate::runner::result::{AggregateReport, RunResult};

/// Format one target's block of the final report.
pub fn format_target_result(result: &RunResult) -> String {
    let mut block = format!("{}:\n", result.target_name);
    if result.is_error() {
        block.push_str("  ERROR OCCURRED DURING TEST RUN (Did the test binary crash?)\n");
        return block;
    }

    block.push_str(&format!("  TOTAL TESTS RUN: {}\n", result.total_count));
    block.push_str(&format!("  PASSED: {}\n", result.passed_count));
    if result.failed_count > 0 {
        block.push_str(&format!("  FAILED: {}\n", result.failed_count));
        block.push_str("\n  FAILED TESTS:\n");
        for name in &result.failed_tests {
            block.push_str(&format!("    {name}\n"));
        }
    }
    block
}

/// Format the complete end-of-run report: a block per target followed by
/// the grand totals and the overall verdict.
pub fn format_report(results: &[RunResult], report: &AggregateReport) -> String {
    let mut text = String::from("\nTEST RUN COMPLETE. RESULTS BELOW:\n\n");
    for result in results {
        text.push_str(&format_target_result(result));
        // Blank line separates targets.
        text.push('\n');
    }

    let status = if report.overall_success {
        "SUCCEEDED"
    } else {
        "FAILED"
    };
    text.push_str(&format!("TEST RUN {status}.\n"));
    text.push_str(&format!("  TOTAL TESTS RUN: {}\n", report.total_run));
    text.push_str(&format!("  TOTAL TESTS PASSED: {}\n", report.total_passed));
    text.push_str(&format!("  TOTAL TESTS FAILED: {}\n", report.total_failed));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing(target: &str, total: usize) -> RunResult {
        RunResult {
            target_name: target.into(),
            total_count: total,
            passed_count: total,
            failed_count: 0,
            failed_tests: vec![],
        }
    }

    #[test]
    fn target_block_all_passed() {
        let block = format_target_result(&passing("nplb", 12));
        assert!(block.starts_with("nplb:\n"));
        assert!(block.contains("TOTAL TESTS RUN: 12"));
        assert!(block.contains("PASSED: 12"));
        assert!(!block.contains("FAILED"));
    }

    #[test]
    fn target_block_with_failures_lists_names() {
        let result = RunResult {
            target_name: "nplb".into(),
            total_count: 10,
            passed_count: 8,
            failed_count: 2,
            failed_tests: vec!["Foo.Bar".into(), "Foo.Baz".into()],
        };
        let block = format_target_result(&result);
        assert!(block.contains("FAILED: 2"));
        assert!(block.contains("FAILED TESTS:"));
        assert!(block.contains("    Foo.Bar"));
        assert!(block.contains("    Foo.Baz"));
    }

    #[test]
    fn target_block_for_crashed_binary() {
        let block = format_target_result(&RunResult::empty("net_unittests"));
        assert!(block.contains("ERROR OCCURRED DURING TEST RUN"));
        assert!(!block.contains("TOTAL TESTS RUN"));
    }

    #[test]
    fn report_success_verdict() {
        let results = vec![passing("a_tests", 3), passing("b_tests", 4)];
        let report = AggregateReport {
            total_run: 7,
            total_passed: 7,
            total_failed: 0,
            had_error: false,
            overall_success: true,
        };
        let text = format_report(&results, &report);
        assert!(text.contains("TEST RUN COMPLETE. RESULTS BELOW:"));
        assert!(text.contains("TEST RUN SUCCEEDED."));
        assert!(text.contains("TOTAL TESTS RUN: 7"));
        assert!(text.contains("TOTAL TESTS PASSED: 7"));
        assert!(text.contains("TOTAL TESTS FAILED: 0"));
    }

    #[test]
    fn report_failure_verdict() {
        let report = AggregateReport {
            total_run: 5,
            total_passed: 3,
            total_failed: 2,
            had_error: false,
            overall_success: false,
        };
        let text = format_report(&[], &report);
        assert!(text.contains("TEST RUN FAILED."));
        assert!(text.contains("TOTAL TESTS FAILED: 2"));
    }

    #[test]
    fn report_lists_targets_in_given_order() {
        let results = vec![passing("a_tests", 1), passing("b_tests", 1)];
        let report = AggregateReport {
            total_run: 2,
            total_passed: 2,
            total_failed: 0,
            had_error: false,
            overall_success: true,
        };
        let text = format_report(&results, &report);
        let a = text.find("a_tests:").unwrap();
        let b = text.find("b_tests:").unwrap();
        assert!(a < b);
    }
}
