use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    CaseRecord, CaseStage, Disposition, DocumentType, UrgencyLevel, VoiceUrgency,
};

/// Compact, display-oriented view of a case. Absent sections serialize as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub created_at: DateTime<Utc>,
    pub status: CaseStage,
    pub progress: u8,
    pub errors: Vec<String>,
    pub voice_analysis: Option<VoiceSection>,
    pub symptoms: Option<SymptomSection>,
    pub documents: Option<DocumentSection>,
    pub triage: Option<TriageSection>,
    pub care_plan: Option<CarePlanSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSection {
    pub transcript: String,
    pub urgency_level: VoiceUrgency,
    pub urgency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomSection {
    pub count: usize,
    /// First three symptom names
    pub primary: Vec<String>,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub count: usize,
    pub types: Vec<DocumentType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageSection {
    pub urgency: UrgencyLevel,
    pub confidence: f64,
    pub disposition: Disposition,
    pub red_flag_count: usize,
    pub recommended_tests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarePlanSection {
    pub chief_complaint: String,
    pub patient_wait_time: String,
    pub notification_count: usize,
}

impl CaseSummary {
    /// Project a record; never fails
    pub fn from_record(record: &CaseRecord) -> Self {
        Self {
            case_id: record.case_id.clone(),
            created_at: record.created_at,
            status: record.stage,
            progress: record.progress,
            errors: record.errors.clone(),
            voice_analysis: record.voice_result.as_ref().map(|v| VoiceSection {
                transcript: v.transcript.clone(),
                urgency_level: v.urgency_level,
                urgency_score: v.urgency_score,
            }),
            symptoms: record.symptom_result.as_ref().map(|s| SymptomSection {
                count: s.symptoms.len(),
                primary: s.primary_symptom_names(3),
                medical_history: s.medical_history.clone(),
                allergies: s.allergies.clone(),
            }),
            documents: record.document_results.as_ref().map(|docs| DocumentSection {
                count: docs.len(),
                types: docs.iter().map(|d| d.document_type).collect(),
            }),
            triage: record.triage_decision.as_ref().map(|t| TriageSection {
                urgency: t.urgency_level,
                confidence: t.confidence,
                disposition: t.disposition,
                red_flag_count: t.red_flags.len(),
                recommended_tests: t.recommended_tests.clone(),
            }),
            care_plan: record.care_plan.as_ref().map(|p| CarePlanSection {
                chief_complaint: p.doctor_summary.chief_complaint.clone(),
                patient_wait_time: p.patient_instructions.estimated_wait_time.clone(),
                notification_count: p.system_actions.notifications.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseRequest, Severity, Symptom, SymptomAnalysis};

    #[test]
    fn test_fresh_record_has_null_sections() {
        let record = CaseRecord::new(CaseRequest::new("c1"));
        let summary = CaseSummary::from_record(&record);
        assert_eq!(summary.status, CaseStage::Created);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["voice_analysis"].is_null());
        assert!(json["symptoms"].is_null());
        assert!(json["documents"].is_null());
        assert!(json["triage"].is_null());
        assert!(json["care_plan"].is_null());
    }

    #[test]
    fn test_symptom_section_lists_first_three() {
        let mut record = CaseRecord::new(CaseRequest::new("c1"));
        let names = ["cough", "fever", "fatigue", "sore throat"];
        let mut analysis = SymptomAnalysis::new(
            names.iter().map(|n| Symptom::new(*n, Severity::Mild, "2 days")).collect(),
            0.9,
        );
        analysis.allergies = vec!["latex".to_string()];
        record.set_symptom_result(analysis);

        let section = CaseSummary::from_record(&record).symptoms.unwrap();
        assert_eq!(section.count, 4);
        assert_eq!(section.primary, vec!["cough", "fever", "fatigue"]);
        assert_eq!(section.allergies, vec!["latex"]);
    }
}
