use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::{
    config::JudgeConfig,
    error::Error,
    executor::CodeExecutor,
    judge,
    languages::AdapterRegistry,
    types::{ExecutionRequest, ExecutionResult, Language, TestCase, TestInput, TestResult},
    workspace::ScratchRoot,
};

#[derive(Clone)]
pub struct JudgeService {
    executor: Arc<CodeExecutor>,
    semaphore: Arc<Semaphore>,
    scratch: ScratchRoot,
}

impl JudgeService {
    pub async fn new(config: JudgeConfig) -> Result<Self, Error> {
        config.validate()?;
        let scratch = ScratchRoot::new(&config.scratch_root).await?;
        let executor = CodeExecutor::new(AdapterRegistry::new(&config.toolchains));

        info!(
            "Judge service ready (scratch root: {}, max concurrent executions: {})",
            scratch.path().display(),
            config.max_concurrent_executions
        );

        Ok(Self {
            executor: Arc::new(executor),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_executions)),
            scratch,
        })
    }

    /// Run `code` once against `input`.
    ///
    /// Never fails: unsupported languages, toolchain problems and every
    /// program failure come back as an error result.
    pub async fn execute(
        &self,
        code: &str,
        language: &str,
        input: Option<TestInput>,
    ) -> ExecutionResult {
        let language = match language.parse::<Language>() {
            Ok(language) => language,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };
        self.execute_request(ExecutionRequest {
            code: code.to_string(),
            language,
            input,
        })
        .await
    }

    pub async fn execute_request(&self, request: ExecutionRequest) -> ExecutionResult {
        // Acquire execution permit
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return ExecutionResult::failure(format!(
                    "Failed to acquire execution permit: {}",
                    e
                ))
            }
        };

        debug!("Starting code execution for language: {}", request.language);

        let executor = &self.executor;
        let request = &request;
        let outcome = self
            .scratch
            .with_workspace(|dir| async move {
                executor.execute_in_workspace(request, &dir).await
            })
            .await;

        match outcome.and_then(|result| result) {
            Ok(result) => result,
            Err(e) => {
                error!("Code execution failed: {}", e);
                ExecutionResult::failure(e.to_string())
            }
        }
    }

    /// Run every case in order, one execution each. A failing case never
    /// stops the ones after it.
    pub async fn test_code(
        &self,
        code: &str,
        language: &str,
        cases: &[TestCase],
    ) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            let result = self.execute(code, language, case.input.clone()).await;
            let graded = judge::evaluate(case, result);
            debug!(
                "Test case {}/{}: passed={}",
                index + 1,
                cases.len(),
                graded.passed
            );
            results.push(graded);
        }
        results
    }

    /// Every supported language and whether its toolchain is installed.
    pub fn available_languages(&self) -> Vec<(Language, bool)> {
        self.executor.registry().availability()
    }

    pub fn get_available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn scratch_root(&self) -> &Path {
        self.scratch.path()
    }
}
