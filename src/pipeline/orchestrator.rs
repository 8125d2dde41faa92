use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::heuristics::{TriageConfig, VoiceUrgencyConfig};
use crate::llm::ReasoningClient;
use crate::models::{
    AudioRef, CarePlan, CarePlanInput, CaseRecord, CaseRequest, CaseStage, CaseStatus,
    DocumentRef, DocumentResult, SymptomAnalysis, SymptomReasoningInput, TriageDecision,
    TriageInput, VoiceIntakeResult,
};
use crate::stages::{
    document_processing_stage, voice_intake_stage, CarePlanStage, Stage, SymptomReasoningStage,
    TriageStage,
};

use super::{
    care_plan_input, symptom_input, triage_input, CaseHandle, CaseRegistry, CaseSummary,
    PipelineConfig, PipelineError, ProgressEvent, ProgressReporter,
};

/// The five stage implementations a pipeline runs
#[derive(Clone)]
pub struct StageSet {
    pub voice: Arc<dyn Stage<AudioRef, VoiceIntakeResult>>,
    pub symptoms: Arc<dyn Stage<SymptomReasoningInput, SymptomAnalysis>>,
    pub documents: Arc<dyn Stage<DocumentRef, DocumentResult>>,
    pub triage: Arc<dyn Stage<TriageInput, TriageDecision>>,
    pub care_plan: Arc<dyn Stage<CarePlanInput, CarePlan>>,
}

impl StageSet {
    /// File-backed voice and document stages plus reasoning stages sharing
    /// one client
    pub fn reference(client: Arc<dyn ReasoningClient>) -> Self {
        Self {
            voice: Arc::new(voice_intake_stage(VoiceUrgencyConfig::default())),
            symptoms: Arc::new(SymptomReasoningStage::new(Arc::clone(&client))),
            documents: Arc::new(document_processing_stage()),
            triage: Arc::new(TriageStage::new(Arc::clone(&client), TriageConfig::default())),
            care_plan: Arc::new(CarePlanStage::new(client)),
        }
    }
}

/// Drives cases through the stage sequence
pub struct Orchestrator {
    stages: StageSet,
    registry: Arc<CaseRegistry>,
    config: PipelineConfig,
}

/// State for one case run
struct Run<'a> {
    handle: CaseHandle,
    reporter: Option<&'a dyn ProgressReporter>,
    cancel: CancellationToken,
}

impl Run<'_> {
    /// Record and announce the checkpoint for `stage`
    fn checkpoint(&self, stage: CaseStage) {
        let Some(percentage) = stage.checkpoint() else {
            return;
        };

        let advanced = self.handle.update(|record| {
            if stage == CaseStage::Completed {
                record.complete();
                record.stage == CaseStage::Completed
            } else {
                record.advance(stage, percentage)
            }
        });
        if !advanced {
            return;
        }

        let event = ProgressEvent {
            case_id: self.handle.case_id().to_string(),
            stage,
            percentage,
        };
        debug!("Case {}: checkpoint {} ({}%)", event.case_id, stage, percentage);

        if let Some(reporter) = self.reporter {
            if let Err(e) = reporter.notify(&event) {
                warn!("Case {}: progress reporter failed: {:#}", event.case_id, e);
            }
        }
    }
}

impl Orchestrator {
    pub fn new(stages: StageSet, config: PipelineConfig) -> Self {
        let config = config.normalized();
        let registry = Arc::new(CaseRegistry::new(config.retention));
        Self::with_registry(stages, config, registry)
    }

    /// Share a registry between orchestrators
    pub fn with_registry(
        stages: StageSet,
        config: PipelineConfig,
        registry: Arc<CaseRegistry>,
    ) -> Self {
        Self {
            stages,
            registry,
            config: config.normalized(),
        }
    }

    pub fn registry(&self) -> &Arc<CaseRegistry> {
        &self.registry
    }

    /// Run a case to completion. Any hard fault fails the case and is
    /// returned.
    pub async fn start_case(
        &self,
        request: CaseRequest,
        reporter: Option<&dyn ProgressReporter>,
    ) -> Result<CaseRecord, PipelineError> {
        self.start_case_with_cancel(request, reporter, CancellationToken::new())
            .await
    }

    /// [`Orchestrator::start_case`] with a caller-held cancellation token
    pub async fn start_case_with_cancel(
        &self,
        request: CaseRequest,
        reporter: Option<&dyn ProgressReporter>,
        cancel: CancellationToken,
    ) -> Result<CaseRecord, PipelineError> {
        let handle = self.registry.register(request)?;
        info!("Case {}: pipeline started", handle.case_id());

        let run = Run {
            handle,
            reporter,
            cancel,
        };

        match self.drive(&run).await {
            Ok(()) => {
                run.checkpoint(CaseStage::Completed);
                info!("Case {}: completed", run.handle.case_id());
                Ok(run.handle.snapshot())
            }
            Err(e) => {
                warn!("Case {}: {}", run.handle.case_id(), e);
                run.handle.update(|record| record.fail(e.case_message()));
                Err(e)
            }
        }
    }

    pub fn status(&self, case_id: &str) -> Option<CaseStatus> {
        self.registry.status(case_id)
    }

    pub fn export_summary(&self, case_id: &str) -> Option<CaseSummary> {
        self.registry.with_record(case_id, CaseSummary::from_record)
    }

    /// Full snapshot of a case record
    pub fn case(&self, case_id: &str) -> Option<CaseRecord> {
        self.registry.snapshot(case_id)
    }

    async fn drive(&self, run: &Run<'_>) -> Result<(), PipelineError> {
        let (audio, documents) = run
            .handle
            .update(|record| (record.audio.clone(), record.documents.clone()));

        let voice = match audio {
            Some(audio) => {
                run.checkpoint(CaseStage::VoiceIntake);
                let result = self
                    .guard(run, CaseStage::VoiceIntake, self.stages.voice.invoke(audio))
                    .await?;
                run.handle.update(|r| r.set_voice_result(result.clone()));
                Some(result)
            }
            None => None,
        };

        run.checkpoint(CaseStage::SymptomReasoning);
        let symptoms = self
            .guard(
                run,
                CaseStage::SymptomReasoning,
                self.stages.symptoms.invoke(symptom_input(voice.as_ref())),
            )
            .await?;
        run.handle.update(|r| r.set_symptom_result(symptoms.clone()));

        run.checkpoint(CaseStage::DocumentProcessing);
        let document_results = self.process_documents(run, documents).await?;
        run.handle
            .update(|r| r.set_document_results(document_results.clone()));

        run.checkpoint(CaseStage::TriageCoordination);
        let triage = self
            .guard(
                run,
                CaseStage::TriageCoordination,
                self.stages
                    .triage
                    .invoke(triage_input(voice.as_ref(), &symptoms, &document_results)),
            )
            .await?;
        run.handle.update(|r| r.set_triage_decision(triage.clone()));

        run.checkpoint(CaseStage::CarePlanGeneration);
        let plan = self
            .guard(
                run,
                CaseStage::CarePlanGeneration,
                self.stages
                    .care_plan
                    .invoke(care_plan_input(voice.as_ref(), &symptoms, &triage)),
            )
            .await?;
        run.handle.update(|r| r.set_care_plan(plan));

        Ok(())
    }

    /// Await one stage invocation under the stage timeout and the run's
    /// cancellation token
    async fn guard<O>(
        &self,
        run: &Run<'_>,
        stage: CaseStage,
        invocation: impl Future<Output = anyhow::Result<O>>,
    ) -> Result<O, PipelineError> {
        let timeout = self.config.stage_timeout;
        tokio::select! {
            biased;
            _ = run.cancel.cancelled() => Err(PipelineError::Cancelled { stage }),
            outcome = tokio::time::timeout(timeout, invocation) => match outcome {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(source)) => Err(PipelineError::StageFailed { stage, source }),
                Err(_) => Err(PipelineError::Timeout { stage, timeout }),
            },
        }
    }

    /// Fan out one invocation per document, bounded by
    /// `max_parallel_documents`, under a single stage deadline. Results come
    /// back in input order; the first failure aborts the rest.
    async fn process_documents(
        &self,
        run: &Run<'_>,
        documents: Vec<DocumentRef>,
    ) -> Result<Vec<DocumentResult>, PipelineError> {
        const STAGE: CaseStage = CaseStage::DocumentProcessing;

        let total = documents.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        info!(
            "Case {}: processing {} documents (max {} in parallel)",
            run.handle.case_id(),
            total,
            self.config.max_parallel_documents
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_documents));
        let timeout = self.config.stage_timeout;
        let mut tasks = JoinSet::new();

        for (index, document) in documents.into_iter().enumerate() {
            let stage = Arc::clone(&self.stages.documents);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let reference = document.to_string();
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => stage.invoke(document).await,
                    Err(e) => Err(anyhow::Error::new(e)),
                };
                let result = outcome.map_err(|source| PipelineError::DocumentFailed {
                    index,
                    reference,
                    source,
                });
                (index, result)
            });
        }

        // One deadline covers the whole batch, queued documents included
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let mut slots: Vec<Option<DocumentResult>> = vec![None; total];
        loop {
            let joined = tokio::select! {
                biased;
                _ = run.cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(PipelineError::Cancelled { stage: STAGE });
                }
                _ = &mut deadline => {
                    tasks.abort_all();
                    return Err(PipelineError::Timeout { stage: STAGE, timeout });
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                None => break,
                Some(Ok((index, Ok(result)))) => {
                    debug!("Document {} finished", index);
                    slots[index] = Some(result);
                }
                Some(Ok((_, Err(e)))) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Some(Err(join_error)) => {
                    tasks.abort_all();
                    return Err(PipelineError::TaskAborted {
                        stage: STAGE,
                        message: join_error.to_string(),
                    });
                }
            }
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| PipelineError::TaskAborted {
                stage: STAGE,
                message: "a document task returned no result".to_string(),
            })
    }
}
