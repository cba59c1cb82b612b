use crate::runner::result::RunResult;

const TOTAL_MARKER: &str = "[==========] ";
const PASSED_MARKER: &str = "[  PASSED  ] ";
const FAILED_MARKER: &str = "[  FAILED  ] ";

/// Parse captured gtest output into a [`RunResult`].
///
/// Four fixed marker lines are scanned, tolerating both "test" and
/// "tests":
///
/// ```text
/// [==========] 10 tests from 2 test cases ran. (5 ms total)
/// [  PASSED  ] 8 tests
/// [  FAILED  ] 2 tests, listed below:
/// [  FAILED  ] Foo.Bar
/// ```
///
/// When a marker line appears more than once, the *last* occurrence wins;
/// that matches the historical scanner behavior and consumers may depend
/// on it. Failure names are collected only from the lines after the last
/// failed-summary line. Output with no matching lines yields the all-zero
/// crash signature.
pub fn parse_test_output(output: &str, target_name: &str) -> RunResult {
    let lines: Vec<&str> = output.lines().collect();

    let mut total_count = 0;
    let mut passed_count = 0;
    let mut failed_count = 0;
    let mut failed_names_start = None;

    for (idx, line) in lines.iter().enumerate() {
        if let Some(count) = match_total_line(line) {
            total_count = count;
        }
        if let Some(count) = match_passed_line(line) {
            passed_count = count;
        }
        if let Some(count) = match_failed_summary_line(line) {
            failed_count = count;
            // Failure names appear after this line.
            failed_names_start = Some(idx + 1);
        }
    }

    let failed_tests = match failed_names_start {
        Some(start) => collect_failed_tests(&lines[start..]),
        None => Vec::new(),
    };

    RunResult {
        target_name: target_name.to_owned(),
        total_count,
        passed_count,
        failed_count,
        failed_tests,
    }
}

/// Collect failure names from the lines following a failed-summary line.
fn collect_failed_tests(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| match_failed_test_line(line))
        .map(str::to_owned)
        .collect()
}

/// The text after `marker`, wherever the marker occurs in the line.
fn after_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker).map(|idx| &line[idx + marker.len()..])
}

/// `[==========] <N> test(s) from <M> test case(s) ran. (<T> ms total)`
fn match_total_line(line: &str) -> Option<usize> {
    let rest = after_marker(line, TOTAL_MARKER)?;
    let (count, tail) = rest.split_once(" test")?;
    if !tail.contains(" ran. (") || !tail.trim_end().ends_with("ms total)") {
        return None;
    }
    count.trim().parse().ok()
}

/// `[  PASSED  ] <N> test(s)`
fn match_passed_line(line: &str) -> Option<usize> {
    let rest = after_marker(line, PASSED_MARKER)?;
    let (count, tail) = rest.split_once(" test")?;
    match tail.trim_end() {
        "" | "s" | "." | "s." => count.trim().parse().ok(),
        _ => None,
    }
}

/// `[  FAILED  ] <N> test(s), listed below:`
fn match_failed_summary_line(line: &str) -> Option<usize> {
    let rest = after_marker(line, FAILED_MARKER)?;
    let (count, tail) = rest.split_once(" test")?;
    match tail.trim_end() {
        ", listed below:" | "s, listed below:" => count.trim().parse().ok(),
        _ => None,
    }
}

/// `[  FAILED  ] <TestCase.TestName>`
fn match_failed_test_line(line: &str) -> Option<&str> {
    let name = after_marker(line, FAILED_MARKER)?.trim();
    if name.is_empty() { None } else { Some(name) }
}
