use serde::Serialize;

/// Parsed outcome of one executed test binary.
///
/// The count fields are authoritative; `failed_tests` holds only the
/// failure names the parser could match and may be shorter than
/// `failed_count`. A result with `total_count == 0` or `passed_count == 0`
/// is the signature of a binary that crashed or produced unparsable
/// output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub target_name: String,
    pub total_count: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    pub failed_tests: Vec<String>,
}

impl RunResult {
    /// The all-zero crash signature for a target.
    pub fn empty(target_name: &str) -> Self {
        Self {
            target_name: target_name.to_owned(),
            total_count: 0,
            passed_count: 0,
            failed_count: 0,
            failed_tests: Vec::new(),
        }
    }

    /// Whether this result is classified as an execution error.
    pub fn is_error(&self) -> bool {
        self.total_count == 0 || self.passed_count == 0
    }
}

/// Grand totals across every executed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub total_run: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub had_error: bool,
    pub overall_success: bool,
}
