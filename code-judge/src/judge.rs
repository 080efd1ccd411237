//! Per-case evaluation and verdict aggregation.

use crate::{
    compare::outputs_match,
    types::{ExecutionResult, SubmissionVerdict, TestCase, TestResult, Verdict},
};

/// Grade one execution against its test case.
pub fn evaluate(case: &TestCase, result: ExecutionResult) -> TestResult {
    let passed = !result.is_error && outputs_match(&result.output, &case.expected_output);
    TestResult {
        input: case.input.clone(),
        expected_output: case.expected_output.clone(),
        actual_output: result.output,
        passed,
        error: result.error,
        execution_time_ms: result.execution_time_ms,
    }
}

/// Fold per-case results into a submission verdict.
///
/// An empty result list is accepted. Otherwise any timed-out case makes the
/// whole submission TLE, even if another case failed first.
pub fn summarize(results: &[TestResult]) -> SubmissionVerdict {
    let passed_count = results.iter().filter(|r| r.passed).count();
    let total_tests = results.len();

    let verdict = if passed_count == total_tests {
        Verdict::Accepted
    } else if results
        .iter()
        .any(|r| r.error.to_ascii_lowercase().contains("timed out"))
    {
        Verdict::TimeLimitExceeded
    } else {
        Verdict::WrongAnswer
    };

    SubmissionVerdict {
        passed_count,
        total_tests,
        verdict,
    }
}
