use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::runner::EXECUTION_TIMEOUT;

/// Environment variable carrying the normalized input into every harness.
pub const INPUT_ENV_VAR: &str = "JUDGE_INPUT";

/// Prefix that separates compiler failures from runtime failures.
pub const COMPILE_ERROR_PREFIX: &str = "Compilation Error:";

pub const TIMEOUT_MESSAGE: &str = "Execution timed out (5 seconds)";

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::JavaScript),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for one execution, as delivered by callers.
///
/// `null` is represented by the absence of a `TestInput` (`Option::None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestInput {
    Text(String),
    List(Vec<serde_json::Value>),
    Value(serde_json::Value),
}

impl From<&str> for TestInput {
    fn from(text: &str) -> Self {
        TestInput::Text(text.to_string())
    }
}

impl From<String> for TestInput {
    fn from(text: String) -> Self {
        TestInput::Text(text)
    }
}

/// Code execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source code to execute
    pub code: String,
    /// Programming language
    pub language: Language,
    /// Input data for the program
    #[serde(default)]
    pub input: Option<TestInput>,
}

/// Outcome of a single execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Trimmed value the solution returned through the harness
    pub output: String,
    pub error: String,
    pub execution_time_ms: u64,
    pub is_error: bool,
}

impl ExecutionResult {
    pub fn success(output: &str, execution_time_ms: u64) -> Self {
        Self {
            output: output.trim().to_string(),
            error: String::new(),
            execution_time_ms,
            is_error: false,
        }
    }

    pub fn runtime_error(output: &str, stderr: &str, execution_time_ms: u64) -> Self {
        Self {
            output: output.trim().to_string(),
            error: stderr.to_string(),
            execution_time_ms,
            is_error: true,
        }
    }

    pub fn compile_error(diagnostics: &str) -> Self {
        Self {
            output: String::new(),
            error: format!("{} {}", COMPILE_ERROR_PREFIX, diagnostics.trim()),
            execution_time_ms: 0,
            is_error: true,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            output: String::new(),
            error: TIMEOUT_MESSAGE.to_string(),
            execution_time_ms: EXECUTION_TIMEOUT.as_millis() as u64,
            is_error: true,
        }
    }

    /// Failure that happened before or around the process, not inside it.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            error: message.into(),
            execution_time_ms: 0,
            is_error: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.error.to_ascii_lowercase().contains("timed out")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub input: Option<TestInput>,
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<TestInput>, expected_output: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            expected_output: expected_output.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(default)]
    pub input: Option<TestInput>,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    pub error: String,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "AC")]
    Accepted,
    #[serde(rename = "WA")]
    WrongAnswer,
    #[serde(rename = "TLE")]
    TimeLimitExceeded,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Verdict::Accepted => "AC",
            Verdict::WrongAnswer => "WA",
            Verdict::TimeLimitExceeded => "TLE",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionVerdict {
    pub passed_count: usize,
    pub total_tests: usize,
    pub verdict: Verdict,
}
