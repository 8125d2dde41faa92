use std::time::Duration;

use thiserror::Error;

use crate::models::CaseStage;

/// Why a case run did not complete
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Case {0} already exists")]
    DuplicateCase(String),

    #[error("{stage} failed: {source:#}")]
    StageFailed {
        stage: CaseStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("document {index} ({reference}) failed: {source:#}")]
    DocumentFailed {
        index: usize,
        reference: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{stage} timed out after {}s", timeout.as_secs_f64())]
    Timeout { stage: CaseStage, timeout: Duration },

    #[error("{stage} cancelled")]
    Cancelled { stage: CaseStage },

    #[error("{stage} task aborted: {message}")]
    TaskAborted { stage: CaseStage, message: String },
}

impl PipelineError {
    /// Stage the run was in when it failed, if any
    pub fn stage(&self) -> Option<CaseStage> {
        match self {
            PipelineError::DuplicateCase(_) => None,
            PipelineError::DocumentFailed { .. } => Some(CaseStage::DocumentProcessing),
            PipelineError::StageFailed { stage, .. }
            | PipelineError::Timeout { stage, .. }
            | PipelineError::Cancelled { stage }
            | PipelineError::TaskAborted { stage, .. } => Some(*stage),
        }
    }

    /// The single entry recorded on the case
    pub fn case_message(&self) -> String {
        format!("Processing error: {}", self)
    }
}
