//! Typed adapters from one stage's outputs to the next stage's input.

use crate::models::{
    CarePlanInput, DocumentEvidence, DocumentResult, SymptomAnalysis, SymptomReasoningInput,
    TriageDecision, TriageDigest, TriageInput, UrgencyContext, VoiceDigest, VoiceIntakeResult,
};

/// Transcript used when a case has no audio
pub const PLACEHOLDER_TRANSCRIPT: &str = "Sample patient transcript";

pub fn symptom_input(voice: Option<&VoiceIntakeResult>) -> SymptomReasoningInput {
    match voice {
        Some(voice) => SymptomReasoningInput {
            transcript: voice.transcript.clone(),
            urgency_context: UrgencyContext::from_voice(voice),
        },
        None => SymptomReasoningInput {
            transcript: PLACEHOLDER_TRANSCRIPT.to_string(),
            urgency_context: UrgencyContext::empty(),
        },
    }
}

/// Neutral when there was no voice result
pub fn voice_digest(voice: Option<&VoiceIntakeResult>) -> VoiceDigest {
    voice
        .map(|v| VoiceDigest {
            urgency_level: Some(v.urgency_level),
            emotions: v.emotions,
            duration_seconds: Some(v.duration_seconds),
        })
        .unwrap_or_else(VoiceDigest::neutral)
}

pub fn triage_input(
    voice: Option<&VoiceIntakeResult>,
    symptoms: &SymptomAnalysis,
    documents: &[DocumentResult],
) -> TriageInput {
    TriageInput {
        voice: voice_digest(voice),
        symptoms: symptoms.symptoms.clone(),
        medical_history: symptoms.medical_history.clone(),
        medications: symptoms.medications.clone(),
        allergies: symptoms.allergies.clone(),
        documents: DocumentEvidence::merge(documents),
    }
}

pub fn care_plan_input(
    voice: Option<&VoiceIntakeResult>,
    symptoms: &SymptomAnalysis,
    triage: &TriageDecision,
) -> CarePlanInput {
    CarePlanInput {
        symptoms: symptoms.symptoms.clone(),
        medical_history: symptoms.medical_history.clone(),
        medications: symptoms.medications.clone(),
        allergies: symptoms.allergies.clone(),
        triage: TriageDigest {
            urgency_level: triage.urgency_level,
            disposition: triage.disposition,
            red_flags: triage.red_flags.clone(),
            recommended_tests: triage.recommended_tests.clone(),
            specialist_referral: triage.specialist_referral.clone(),
            estimated_wait_time: triage.estimated_wait_time.clone(),
            reasoning: triage.reasoning.clone(),
            differential_diagnosis: triage.differential_diagnosis.clone(),
        },
        voice: voice_digest(voice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmotionScores, InsuranceInfo, VoiceUrgency};

    fn voice() -> VoiceIntakeResult {
        VoiceIntakeResult::new(
            "my head hurts",
            0.9,
            VoiceUrgency::Medium,
            0.5,
            EmotionScores::default(),
            14.0,
        )
    }

    #[test]
    fn test_symptom_input_without_voice() {
        let input = symptom_input(None);
        assert_eq!(input.transcript, PLACEHOLDER_TRANSCRIPT);
        assert!(input.urgency_context.is_empty());
    }

    #[test]
    fn test_symptom_input_with_voice() {
        let input = symptom_input(Some(&voice()));
        assert_eq!(input.transcript, "my head hurts");
        assert_eq!(input.urgency_context.urgency_level, Some(VoiceUrgency::Medium));
        assert_eq!(input.urgency_context.duration_seconds, Some(14.0));
    }

    #[test]
    fn test_triage_input_merges_documents_last_wins() {
        let card = |member_id: &str| {
            DocumentResult::insurance(
                InsuranceInfo {
                    provider: "Aetna".to_string(),
                    member_id: member_id.to_string(),
                    group_number: None,
                    plan_type: "PPO".to_string(),
                    coverage_status: "Active".to_string(),
                },
                "",
                0.9,
                vec![],
            )
        };
        let documents = vec![card("FIRST"), DocumentResult::unknown("noise"), card("SECOND")];

        let input = triage_input(None, &SymptomAnalysis::degraded(), &documents);
        assert_eq!(input.voice, VoiceDigest::neutral());
        assert_eq!(
            input.documents.insurance.map(|i| i.member_id).as_deref(),
            Some("SECOND")
        );
        assert!(input.documents.medical_record.is_none());
    }
}
