use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Disposition, RedFlag, Symptom, UrgencyLevel, VoiceDigest};

/// Triage fields the care planner needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageDigest {
    pub urgency_level: UrgencyLevel,
    pub disposition: Disposition,
    pub red_flags: Vec<RedFlag>,
    pub recommended_tests: Vec<String>,
    pub specialist_referral: Option<String>,
    pub estimated_wait_time: String,
    pub reasoning: String,
    /// From the triage reasoning; empty when it named none
    #[serde(default)]
    pub differential_diagnosis: Vec<String>,
}

/// Input bundle for the Care Plan Generation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarePlanInput {
    pub symptoms: Vec<Symptom>,
    pub medical_history: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub triage: TriageDigest,
    pub voice: VoiceDigest,
}

/// Clinical summary for the treating physician
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub patient_demographics: String,
    pub chief_complaint: String,
    pub history_of_present_illness: String,
    pub past_medical_history: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub physical_exam_notes: String,
    pub triage_assessment: String,
    pub red_flags: Vec<String>,
    pub differential_diagnosis: Vec<String>,
    pub recommended_workup: Vec<String>,
    pub disposition_plan: String,
}

/// Patient-facing instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInstructions {
    pub welcome_message: String,
    pub what_to_expect: Vec<String>,
    pub estimated_wait_time: String,
    pub preparation_steps: Vec<String>,
    pub warning_signs: Vec<String>,
    pub follow_up_instructions: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub kind: String,
    pub location: Disposition,
    pub time: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub specialty: String,
    pub urgency: UrgencyLevel,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Follow-up work the surrounding system should carry out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemActions {
    pub appointments: Vec<Appointment>,
    pub alerts: Vec<Alert>,
    pub tests_to_order: Vec<String>,
    pub referrals: Vec<Referral>,
    pub notifications: Vec<Notification>,
}

/// Output of the Care Plan Generation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarePlan {
    pub doctor_summary: DoctorSummary,
    pub patient_instructions: PatientInstructions,
    pub system_actions: SystemActions,
    pub generated_at: DateTime<Utc>,
}
