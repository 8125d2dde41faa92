use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CarePlan, DocumentRef, DocumentResult, SymptomAnalysis, TriageDecision, VoiceIntakeResult};

/// Reference to the patient's recorded audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef(pub PathBuf);

impl AudioRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Position of a case in the pipeline state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStage {
    Created,
    VoiceIntake,
    SymptomReasoning,
    DocumentProcessing,
    TriageCoordination,
    CarePlanGeneration,
    Completed,
    Failed,
}

impl CaseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStage::Created => "created",
            CaseStage::VoiceIntake => "voice_intake",
            CaseStage::SymptomReasoning => "symptom_reasoning",
            CaseStage::DocumentProcessing => "document_processing",
            CaseStage::TriageCoordination => "triage_coordination",
            CaseStage::CarePlanGeneration => "care_plan_generation",
            CaseStage::Completed => "completed",
            CaseStage::Failed => "failed",
        }
    }

    /// Progress checkpoint reported when this stage is entered
    pub fn checkpoint(&self) -> Option<u8> {
        match self {
            CaseStage::VoiceIntake => Some(0),
            CaseStage::SymptomReasoning => Some(20),
            CaseStage::DocumentProcessing => Some(40),
            CaseStage::TriageCoordination => Some(60),
            CaseStage::CarePlanGeneration => Some(80),
            CaseStage::Completed => Some(100),
            CaseStage::Created | CaseStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStage::Completed | CaseStage::Failed)
    }
}

impl fmt::Display for CaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller hands to the orchestrator to start a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRequest {
    pub case_id: String,
    pub audio: Option<AudioRef>,
    /// Order is preserved in the document results
    pub documents: Vec<DocumentRef>,
}

impl CaseRequest {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            audio: None,
            documents: vec![],
        }
    }

    pub fn with_audio(mut self, audio: AudioRef) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_documents(mut self, documents: Vec<DocumentRef>) -> Self {
        self.documents = documents;
        self
    }
}

/// One patient intake and everything the pipeline learned about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub audio: Option<AudioRef>,
    pub documents: Vec<DocumentRef>,
    pub created_at: DateTime<Utc>,
    /// Set when the case reaches `Completed` or `Failed`
    pub finished_at: Option<DateTime<Utc>>,

    pub voice_result: Option<VoiceIntakeResult>,
    pub symptom_result: Option<SymptomAnalysis>,
    /// Same length and order as `documents` once set
    pub document_results: Option<Vec<DocumentResult>>,
    pub triage_decision: Option<TriageDecision>,
    pub care_plan: Option<CarePlan>,

    pub stage: CaseStage,
    pub progress: u8,
    pub errors: Vec<String>,
}

impl CaseRecord {
    pub fn new(request: CaseRequest) -> Self {
        Self {
            case_id: request.case_id,
            audio: request.audio,
            documents: request.documents,
            created_at: Utc::now(),
            finished_at: None,
            voice_result: None,
            symptom_result: None,
            document_results: None,
            triage_decision: None,
            care_plan: None,
            stage: CaseStage::Created,
            progress: 0,
            errors: vec![],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Move to `stage` at `progress`. Ignored once terminal or if progress
    /// would go backwards.
    pub(crate) fn advance(&mut self, stage: CaseStage, progress: u8) -> bool {
        if self.is_terminal() || progress < self.progress {
            warn!(
                "Case {}: rejected transition to {} at {}% (currently {} at {}%)",
                self.case_id, stage, progress, self.stage, self.progress
            );
            return false;
        }
        self.stage = stage;
        self.progress = progress;
        true
    }

    pub(crate) fn complete(&mut self) {
        if self.advance(CaseStage::Completed, 100) {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Record a hard fault. Only the first failure is recorded.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.errors.push(message.into());
        self.stage = CaseStage::Failed;
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn set_voice_result(&mut self, result: VoiceIntakeResult) {
        if !self.is_terminal() {
            store_once(&self.case_id, "voice_result", &mut self.voice_result, result);
        }
    }

    pub(crate) fn set_symptom_result(&mut self, result: SymptomAnalysis) {
        if !self.is_terminal() {
            store_once(&self.case_id, "symptom_result", &mut self.symptom_result, result);
        }
    }

    pub(crate) fn set_document_results(&mut self, results: Vec<DocumentResult>) {
        if self.is_terminal() || self.symptom_result.is_none() {
            return;
        }
        if results.len() != self.documents.len() {
            warn!(
                "Case {}: dropping {} document results for {} documents",
                self.case_id,
                results.len(),
                self.documents.len()
            );
            return;
        }
        store_once(&self.case_id, "document_results", &mut self.document_results, results);
    }

    pub(crate) fn set_triage_decision(&mut self, decision: TriageDecision) {
        if self.is_terminal() || self.symptom_result.is_none() || self.document_results.is_none() {
            return;
        }
        store_once(&self.case_id, "triage_decision", &mut self.triage_decision, decision);
    }

    pub(crate) fn set_care_plan(&mut self, plan: CarePlan) {
        if self.is_terminal() || self.triage_decision.is_none() {
            return;
        }
        store_once(&self.case_id, "care_plan", &mut self.care_plan, plan);
    }

    pub fn status(&self) -> CaseStatus {
        CaseStatus {
            case_id: self.case_id.clone(),
            stage: self.stage,
            progress: self.progress,
            errors: self.errors.clone(),
        }
    }
}

fn store_once<T>(case_id: &str, slot_name: &str, slot: &mut Option<T>, value: T) {
    if slot.is_some() {
        warn!("Case {}: {} already set, keeping the first value", case_id, slot_name);
        return;
    }
    *slot = Some(value);
}

/// Status snapshot returned to pollers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStatus {
    pub case_id: String,
    pub stage: CaseStage,
    pub progress: u8,
    pub errors: Vec<String>,
}
