pub mod defaults {
    use crate::{JudgeConfig, JudgeService, Result};
    use assert_fs::TempDir;

    /// A service whose scratch root lives in a throwaway directory. Keep the
    /// returned `TempDir` alive for as long as the service is used.
    pub async fn test_service(max_concurrent_executions: usize) -> Result<(TempDir, JudgeService)> {
        let root = TempDir::new().map_err(|e| crate::Error::Workspace(e.to_string()))?;
        let config = JudgeConfig {
            scratch_root: root.path().join("scratch"),
            max_concurrent_executions,
            ..JudgeConfig::default()
        };
        let service = JudgeService::new(config).await?;
        Ok((root, service))
    }
}

pub mod assertions {
    use crate::{ExecutionResult, JudgeService, TIMEOUT_MESSAGE};

    pub fn assert_timed_out(result: &ExecutionResult) {
        assert!(result.is_error, "expected an error result: {:?}", result);
        assert_eq!(result.error, TIMEOUT_MESSAGE);
        assert_eq!(result.execution_time_ms, 5000);
    }

    /// No execution may leave its workspace behind.
    pub fn assert_scratch_empty(service: &JudgeService) {
        let leftovers: Vec<_> = std::fs::read_dir(service.scratch_root())
            .expect("scratch root is readable")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        assert!(leftovers.is_empty(), "leftover workspaces: {:?}", leftovers);
    }
}
