//! # Code Judge
//!
//! Runs untrusted solutions written in JavaScript, Python, Java or C++
//! against test cases and grades them. Every execution gets its own scratch
//! workspace, its own process and a fixed wall-clock limit.

mod compare;
mod config;
mod error;
mod executor;
mod input;
pub mod judge;
pub mod languages;
mod runner;
mod service;
mod types;
mod workspace;

#[cfg(test)]
mod tests;

pub use compare::outputs_match;
pub use config::{JudgeConfig, Toolchains};
pub use error::Error;
pub use executor::CodeExecutor;
pub use input::normalize as normalize_input;
pub use judge::summarize;
pub use runner::{
    ProcessOutcome, ProcessRunner, ProcessStatus, ResultChannel, EXECUTION_TIMEOUT,
    MAX_CAPTURE_BYTES, RESULT_FD,
};
pub use service::JudgeService;
pub use types::{
    ExecutionRequest, ExecutionResult, Language, SubmissionVerdict, TestCase, TestInput,
    TestResult, Verdict, COMPILE_ERROR_PREFIX, INPUT_ENV_VAR, TIMEOUT_MESSAGE,
};
pub use workspace::ScratchRoot;

/// Result type for judge operations
pub type Result<T> = std::result::Result<T, Error>;
