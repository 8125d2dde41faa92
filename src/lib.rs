pub mod heuristics;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

#[cfg(test)]
pub(crate) mod testing;

pub use io::{read_document_text, read_recognition_file, write_json, CaseReport};
pub use llm::{AnthropicClient, AnthropicConfig, ReasoningClient};
pub use models::{AudioRef, CaseRecord, CaseRequest, CaseStage, CaseStatus, DocumentRef};
pub use pipeline::{
    CaseRegistry, CaseSummary, ChannelReporter, LoggingReporter, Orchestrator, PipelineConfig,
    PipelineError, ProgressEvent, ProgressReporter, StageSet,
};
pub use stages::{process_document, Stage};
