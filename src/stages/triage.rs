use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::heuristics::{
    calculate_urgency, check_contradictions, estimate_wait_time, identify_red_flags,
    recommend_tests, suggest_specialist, TriageConfig,
};
use crate::llm::{
    build_triage_prompt, parse_reply, ClinicalAssessment, ReasoningClient, TriageReply,
    TRIAGE_SYSTEM_PROMPT,
};
use crate::models::{Disposition, TriageDecision, TriageInput};

use super::Stage;

/// Triage Coordination stage.
///
/// Deterministic red-flag and contradiction checks run first and are handed
/// to the reasoning service; red flags then override whatever urgency it
/// proposes.
pub struct TriageStage {
    client: Arc<dyn ReasoningClient>,
    config: TriageConfig,
}

impl TriageStage {
    pub fn new(client: Arc<dyn ReasoningClient>, config: TriageConfig) -> Self {
        Self { client, config }
    }

    async fn assess(&self, prompt: &str) -> Result<ClinicalAssessment> {
        let reply = self
            .client
            .complete(TRIAGE_SYSTEM_PROMPT, prompt)
            .await
            .context("Triage reasoning request failed")?;

        Ok(match parse_reply::<TriageReply>(&reply) {
            Ok(parsed) => parsed.into_assessment(),
            Err(e) => {
                warn!("Triage reply unusable, degrading: {:#}", e);
                ClinicalAssessment::degraded()
            }
        })
    }
}

#[async_trait]
impl Stage<TriageInput, TriageDecision> for TriageStage {
    async fn invoke(&self, input: TriageInput) -> Result<TriageDecision> {
        let red_flags = identify_red_flags(&input.symptoms, &input.medical_history);
        let contradictions = check_contradictions(&input);
        if !red_flags.is_empty() {
            warn!("{} red flags identified", red_flags.len());
        }

        let prompt = build_triage_prompt(&input, &red_flags, &contradictions);
        let assessment = self.assess(&prompt).await?;

        let (urgency, confidence) = calculate_urgency(
            assessment.urgency,
            assessment.confidence,
            &red_flags,
            &input.voice,
            &self.config,
        );

        let mut recommended_tests = recommend_tests(&input.symptoms);
        for test in assessment.recommended_tests {
            if !recommended_tests.contains(&test) {
                recommended_tests.push(test);
            }
        }

        let mut decision = TriageDecision {
            urgency_level: urgency,
            confidence: 0.0,
            disposition: Disposition::for_assessment(urgency, assessment.disposition),
            red_flags,
            contradictions,
            reasoning: assessment.reasoning,
            differential_diagnosis: assessment.differential,
            safety_concerns: assessment.safety_concerns,
            recommended_tests,
            specialist_referral: suggest_specialist(&input.symptoms).or(assessment.specialist),
            estimated_wait_time: estimate_wait_time(urgency).to_string(),
        };
        decision.set_confidence(confidence);

        info!(
            "Triage: {} -> {} (confidence {:.2})",
            decision.urgency_level, decision.disposition, decision.confidence
        );

        Ok(decision)
    }
}
