use std::time::Duration;

use anyhow::{Context, Result};

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on each stage invocation, including each document
    pub stage_timeout: Duration,
    /// Maximum concurrent document invocations per case
    pub max_parallel_documents: usize,
    /// Terminal cases older than this are pruned from the registry
    pub retention: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout: Duration::from_secs(120),
            max_parallel_documents: 8,
            retention: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by CASEFLOW_STAGE_TIMEOUT_SECS,
    /// CASEFLOW_MAX_PARALLEL_DOCUMENTS and CASEFLOW_RETENTION_SECS
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = env_u64("CASEFLOW_STAGE_TIMEOUT_SECS")? {
            config.stage_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env_u64("CASEFLOW_MAX_PARALLEL_DOCUMENTS")? {
            config.max_parallel_documents = n as usize;
        }
        if let Some(secs) = env_u64("CASEFLOW_RETENTION_SECS")? {
            config.retention = Some(Duration::from_secs(secs));
        }

        Ok(config.normalized())
    }

    /// At least one document slot and a non-zero timeout
    pub fn normalized(mut self) -> Self {
        self.max_parallel_documents = self.max_parallel_documents.max(1);
        if self.stage_timeout.is_zero() {
            self.stage_timeout = Self::default().stage_timeout;
        }
        self
    }
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a whole number, got {:?}", name, value)),
        Err(_) => Ok(None),
    }
}
