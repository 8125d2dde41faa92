use std::fmt;

use serde::{Deserialize, Serialize};

use super::{clamp_unit, DocumentEvidence, EmotionScores, Symptom, VoiceUrgency};

/// Clinical urgency, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    /// Can wait for a routine appointment
    NonUrgent,
    /// Needs care within 24 hours
    SemiUrgent,
    /// Needs care within hours
    Urgent,
    /// Life-threatening, needs the emergency department now
    Immediate,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::NonUrgent => "non_urgent",
            UrgencyLevel::SemiUrgent => "semi_urgent",
            UrgencyLevel::Urgent => "urgent",
            UrgencyLevel::Immediate => "immediate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "non_urgent" => Some(UrgencyLevel::NonUrgent),
            "semi_urgent" => Some(UrgencyLevel::SemiUrgent),
            "urgent" => Some(UrgencyLevel::Urgent),
            "immediate" => Some(UrgencyLevel::Immediate),
            _ => None,
        }
    }

    /// Immediate or urgent
    pub fn is_acute(&self) -> bool {
        *self >= UrgencyLevel::Urgent
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended care venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    EmergencyDepartment,
    UrgentCare,
    PrimaryCareSameDay,
    PrimaryCareRoutine,
    Telehealth,
    SelfCare,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::EmergencyDepartment => "emergency_department",
            Disposition::UrgentCare => "urgent_care",
            Disposition::PrimaryCareSameDay => "primary_care_same_day",
            Disposition::PrimaryCareRoutine => "primary_care_routine",
            Disposition::Telehealth => "telehealth",
            Disposition::SelfCare => "self_care",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "emergency_department" | "emergency" | "ed" => Some(Disposition::EmergencyDepartment),
            "urgent_care" => Some(Disposition::UrgentCare),
            "primary_care_same_day" => Some(Disposition::PrimaryCareSameDay),
            "primary_care_routine" | "primary_care" => Some(Disposition::PrimaryCareRoutine),
            "telehealth" => Some(Disposition::Telehealth),
            "self_care" => Some(Disposition::SelfCare),
            _ => None,
        }
    }

    pub fn for_urgency(urgency: UrgencyLevel) -> Self {
        match urgency {
            UrgencyLevel::Immediate => Disposition::EmergencyDepartment,
            UrgencyLevel::Urgent => Disposition::UrgentCare,
            UrgencyLevel::SemiUrgent => Disposition::PrimaryCareSameDay,
            UrgencyLevel::NonUrgent => Disposition::PrimaryCareRoutine,
        }
    }

    /// The venue for `urgency`, except that a non-urgent case may take a
    /// suggested remote or home-care venue instead of a routine visit.
    /// Suggestions never lower the venue of an acute case.
    pub fn for_assessment(urgency: UrgencyLevel, suggested: Option<Disposition>) -> Self {
        match (urgency, suggested) {
            (
                UrgencyLevel::NonUrgent,
                Some(d @ (Disposition::Telehealth | Disposition::SelfCare)),
            ) => d,
            _ => Self::for_urgency(urgency),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSeverity {
    High,
    Critical,
}

/// A symptom pattern that forces urgency regardless of reasoning output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub symptom: String,
    pub reasoning: String,
    pub severity: FlagSeverity,
}

/// Disagreement between what the patient said and what documents show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    pub finding: String,
    pub conflict: String,
    pub recommendation: String,
}

/// Compact view of the voice analysis shared by triage and care planning.
///
/// Neutral when the case had no audio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceDigest {
    pub urgency_level: Option<VoiceUrgency>,
    pub emotions: EmotionScores,
    pub duration_seconds: Option<f64>,
}

impl VoiceDigest {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_high_urgency(&self) -> bool {
        self.urgency_level == Some(VoiceUrgency::High)
    }

    pub fn urgency_label(&self) -> &'static str {
        self.urgency_level.map(|u| u.as_str()).unwrap_or("unknown")
    }
}

/// Input bundle for the Triage Coordination stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageInput {
    pub voice: VoiceDigest,
    pub symptoms: Vec<Symptom>,
    pub medical_history: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub documents: DocumentEvidence,
}

/// Output of the Triage Coordination stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageDecision {
    pub urgency_level: UrgencyLevel,
    /// Confidence in the urgency level (0-1)
    pub confidence: f64,
    pub disposition: Disposition,
    pub red_flags: Vec<RedFlag>,
    pub contradictions: Vec<Contradiction>,
    pub reasoning: String,
    #[serde(default)]
    pub differential_diagnosis: Vec<String>,
    #[serde(default)]
    pub safety_concerns: Vec<String>,
    pub recommended_tests: Vec<String>,
    pub specialist_referral: Option<String>,
    pub estimated_wait_time: String,
}

impl TriageDecision {
    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = clamp_unit(confidence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_ordering_and_parse() {
        assert!(UrgencyLevel::Immediate > UrgencyLevel::Urgent);
        assert!(UrgencyLevel::SemiUrgent > UrgencyLevel::NonUrgent);
        assert_eq!(UrgencyLevel::parse("semi-urgent"), Some(UrgencyLevel::SemiUrgent));
        assert_eq!(UrgencyLevel::parse("IMMEDIATE"), Some(UrgencyLevel::Immediate));
        assert_eq!(UrgencyLevel::parse("soonish"), None);
    }

    #[test]
    fn test_disposition_suggestions_only_for_non_urgent() {
        assert_eq!(Disposition::parse("Self-Care"), Some(Disposition::SelfCare));
        assert_eq!(Disposition::parse("somewhere"), None);

        assert_eq!(
            Disposition::for_assessment(UrgencyLevel::NonUrgent, Some(Disposition::Telehealth)),
            Disposition::Telehealth
        );
        assert_eq!(
            Disposition::for_assessment(UrgencyLevel::NonUrgent, Some(Disposition::SelfCare)),
            Disposition::SelfCare
        );
        assert_eq!(
            Disposition::for_assessment(UrgencyLevel::Urgent, Some(Disposition::SelfCare)),
            Disposition::UrgentCare
        );
        assert_eq!(
            Disposition::for_assessment(UrgencyLevel::NonUrgent, Some(Disposition::EmergencyDepartment)),
            Disposition::PrimaryCareRoutine
        );
        assert_eq!(
            Disposition::for_assessment(UrgencyLevel::NonUrgent, None),
            Disposition::PrimaryCareRoutine
        );
    }

    #[test]
    fn test_disposition_for_urgency() {
        assert_eq!(
            Disposition::for_urgency(UrgencyLevel::Immediate),
            Disposition::EmergencyDepartment
        );
        assert_eq!(
            Disposition::for_urgency(UrgencyLevel::NonUrgent),
            Disposition::PrimaryCareRoutine
        );
    }
}
