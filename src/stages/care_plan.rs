use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join;
use tracing::info;

use crate::heuristics::{
    chief_complaint, extract_differential, extract_list_items, extract_welcome_message,
    follow_up_instructions, history_of_present_illness, infer_demographics, physical_exam_notes,
    system_actions, warning_signs,
};
use crate::llm::{
    build_doctor_summary_prompt, build_patient_instructions_prompt, ReasoningClient,
    CARE_PLAN_SYSTEM_PROMPT,
};
use crate::models::{CarePlan, CarePlanInput, DoctorSummary, PatientInstructions};

use super::Stage;

/// Care Plan Generation stage: physician summary, patient instructions and
/// system actions.
pub struct CarePlanStage {
    client: Arc<dyn ReasoningClient>,
}

impl CarePlanStage {
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }
}

fn doctor_summary(input: &CarePlanInput, summary_text: &str) -> DoctorSummary {
    let triage = &input.triage;
    let mut assessment = format!(
        "{} - {}",
        triage.urgency_level.as_str().to_uppercase(),
        triage.disposition
    );
    if !triage.red_flags.is_empty() {
        assessment.push_str(&format!(" - {} RED FLAGS", triage.red_flags.len()));
    }

    DoctorSummary {
        patient_demographics: infer_demographics(&input.medical_history),
        chief_complaint: chief_complaint(input),
        history_of_present_illness: history_of_present_illness(&input.symptoms),
        past_medical_history: input.medical_history.clone(),
        medications: input.medications.clone(),
        allergies: input.allergies.clone(),
        physical_exam_notes: physical_exam_notes(&input.voice),
        triage_assessment: assessment,
        red_flags: triage.red_flags.iter().map(|f| f.symptom.clone()).collect(),
        differential_diagnosis: if triage.differential_diagnosis.is_empty() {
            extract_differential(summary_text)
        } else {
            triage.differential_diagnosis.clone()
        },
        recommended_workup: triage.recommended_tests.clone(),
        disposition_plan: format!(
            "Patient to {}. {}",
            triage.disposition, triage.estimated_wait_time
        ),
    }
}

fn patient_instructions(input: &CarePlanInput, instructions_text: &str) -> PatientInstructions {
    PatientInstructions {
        welcome_message: extract_welcome_message(instructions_text),
        what_to_expect: extract_list_items(instructions_text, "What to expect"),
        estimated_wait_time: input.triage.estimated_wait_time.clone(),
        preparation_steps: extract_list_items(instructions_text, "prepare"),
        warning_signs: warning_signs(&input.symptoms),
        follow_up_instructions: follow_up_instructions(input.triage.urgency_level).to_string(),
        language: "en".to_string(),
    }
}

#[async_trait]
impl Stage<CarePlanInput, CarePlan> for CarePlanStage {
    async fn invoke(&self, input: CarePlanInput) -> Result<CarePlan> {
        let doctor_prompt = build_doctor_summary_prompt(&input);
        let patient_prompt = build_patient_instructions_prompt(&input);

        let (summary_text, instructions_text) = try_join(
            self.client.complete(CARE_PLAN_SYSTEM_PROMPT, &doctor_prompt),
            self.client.complete(CARE_PLAN_SYSTEM_PROMPT, &patient_prompt),
        )
        .await
        .context("Care plan request failed")?;

        let plan = CarePlan {
            doctor_summary: doctor_summary(&input, &summary_text),
            patient_instructions: patient_instructions(&input, &instructions_text),
            system_actions: system_actions(&input.triage),
            generated_at: Utc::now(),
        };

        info!(
            "Care plan: {} alerts, {} notifications",
            plan.system_actions.alerts.len(),
            plan.system_actions.notifications.len()
        );

        Ok(plan)
    }
}
