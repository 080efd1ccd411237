use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    input,
    languages::{AdapterRegistry, Harness},
    runner::{ProcessRunner, ProcessStatus},
    types::{ExecutionRequest, ExecutionResult, INPUT_ENV_VAR},
};

/// Drives one request through harness generation, compilation and the run,
/// inside a workspace owned by the caller.
pub struct CodeExecutor {
    registry: AdapterRegistry,
    runner: ProcessRunner,
}

impl CodeExecutor {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            runner: ProcessRunner::new(),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Execute `request` in `workspace`.
    ///
    /// Everything the user program does ends up in the returned
    /// [`ExecutionResult`]; `Err` is reserved for plumbing failures such as a
    /// missing toolchain or an unwritable workspace.
    pub async fn execute_in_workspace(
        &self,
        request: &ExecutionRequest,
        workspace: &Path,
    ) -> Result<ExecutionResult, Error> {
        let adapter = self
            .registry
            .get(request.language)
            .ok_or_else(|| Error::UnsupportedLanguage(request.language.to_string()))?;

        let input = input::normalize(request.input.as_ref());
        let harness = adapter.build_harness(&request.code, &input);
        debug!(
            "Built {} harness: {} source file(s), {} build step(s)",
            harness.file_extension,
            harness.sources.len(),
            harness.build_steps.len()
        );
        self.write_sources(workspace, &harness).await?;

        for step in &harness.build_steps {
            debug!("Compiling {} submission: {}", request.language, step.command);
            let outcome = self.runner.run(step, workspace, &[]).await?;
            match outcome.status {
                ProcessStatus::Completed => {}
                ProcessStatus::TimedOut => {
                    warn!("{} compilation timed out", request.language);
                    return Ok(ExecutionResult::timed_out());
                }
                ProcessStatus::NonZeroExit(code) => {
                    warn!(
                        "{} compilation failed with exit code {:?}",
                        request.language, code
                    );
                    let diagnostics = if outcome.stderr.trim().is_empty() {
                        &outcome.stdout
                    } else {
                        &outcome.stderr
                    };
                    return Ok(ExecutionResult::compile_error(diagnostics));
                }
            }
        }

        let env = [(INPUT_ENV_VAR.to_string(), input)];
        let outcome = self
            .runner
            .run_with_channel(&harness.run_step, workspace, &env, harness.result_channel)
            .await?;
        let result = match outcome.status {
            ProcessStatus::Completed => {
                ExecutionResult::success(&outcome.stdout, outcome.elapsed_ms())
            }
            ProcessStatus::NonZeroExit(code) => {
                warn!(
                    "{} program exited with code {:?}",
                    request.language, code
                );
                ExecutionResult::runtime_error(
                    &outcome.stdout,
                    &outcome.stderr,
                    outcome.elapsed_ms(),
                )
            }
            ProcessStatus::TimedOut => {
                warn!("{} program timed out", request.language);
                ExecutionResult::timed_out()
            }
        };

        info!(
            "Executed {} submission in {}ms (error: {})",
            request.language, result.execution_time_ms, result.is_error
        );
        Ok(result)
    }

    async fn write_sources(&self, workspace: &Path, harness: &Harness) -> Result<(), Error> {
        for file in &harness.sources {
            let path = workspace.join(&file.name);
            fs::write(&path, &file.contents).await.map_err(|e| {
                Error::Workspace(format!("Failed to write {}: {}", path.display(), e))
            })?;
            debug!("Wrote source file: {}", path.display());
        }
        Ok(())
    }
}
