use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

use crate::models::{clamp_unit, Disposition, Severity, Symptom, SymptomAnalysis, UrgencyLevel};

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// The JSON payload of a reply: the first fenced block if there is one,
/// otherwise the whole reply.
pub fn extract_json_block(reply: &str) -> &str {
    FENCED_JSON
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| reply.trim())
}

/// Parse a reasoning reply into `T`
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    serde_json::from_str(extract_json_block(reply)).context("Reply is not valid JSON for the expected schema")
}

/// Treat an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Symptom reasoning reply schema
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SymptomReply {
    #[serde(deserialize_with = "null_as_default")]
    pub symptoms: Vec<SymptomReplyItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub medical_history: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub current_medications: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub allergies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub clarifying_questions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub missing_critical_info: Vec<String>,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SymptomReplyItem {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub severity: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub characteristics: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub triggers: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub relievers: Vec<String>,
}

impl SymptomReply {
    /// Confidence assumed when the reply omits one
    pub const DEFAULT_CONFIDENCE: f64 = 0.8;

    /// Validate into a [`SymptomAnalysis`]: nameless symptoms are dropped,
    /// unknown severities become moderate, confidence is clamped.
    pub fn into_analysis(self) -> SymptomAnalysis {
        let symptoms = self
            .symptoms
            .into_iter()
            .filter(|s| !s.name.trim().is_empty())
            .map(|s| Symptom {
                name: s.name.trim().to_string(),
                severity: s
                    .severity
                    .as_deref()
                    .map(Severity::parse_lenient)
                    .unwrap_or(Severity::Moderate),
                duration: s.duration.unwrap_or_else(|| "unknown".to_string()),
                location: s.location.filter(|l| !l.trim().is_empty()),
                characteristics: s.characteristics,
                triggers: s.triggers,
                relievers: s.relievers,
            })
            .collect();

        SymptomAnalysis {
            symptoms,
            medical_history: self.medical_history,
            medications: self.current_medications,
            allergies: self.allergies,
            clarifying_questions: self.clarifying_questions,
            missing_info: self.missing_critical_info,
            confidence: clamp_unit(self.confidence_score.unwrap_or(Self::DEFAULT_CONFIDENCE)),
        }
    }
}

/// Clinical reasoning reply schema used by triage
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TriageReply {
    pub urgency_assessment: Option<String>,
    pub confidence: Option<f64>,
    pub clinical_reasoning: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub differential_diagnosis: Vec<String>,
    pub recommended_disposition: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommended_tests: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub safety_concerns: Vec<String>,
    pub specialist_needed: Option<String>,
}

/// Triage reasoning after validation
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalAssessment {
    /// `None` when the reply named no recognizable urgency
    pub urgency: Option<UrgencyLevel>,
    pub confidence: Option<f64>,
    pub reasoning: String,
    pub differential: Vec<String>,
    /// Only set when the reply names a known disposition
    pub disposition: Option<Disposition>,
    pub recommended_tests: Vec<String>,
    pub safety_concerns: Vec<String>,
    pub specialist: Option<String>,
}

impl ClinicalAssessment {
    /// Used when the reasoning reply cannot be parsed
    pub fn degraded() -> Self {
        Self {
            urgency: Some(UrgencyLevel::Urgent),
            confidence: Some(0.7),
            reasoning: "Unable to parse detailed analysis".to_string(),
            differential: vec![],
            disposition: None,
            recommended_tests: vec![],
            safety_concerns: vec![],
            specialist: None,
        }
    }
}

impl TriageReply {
    pub fn into_assessment(self) -> ClinicalAssessment {
        // An unrecognized urgency label triages up to urgent
        let urgency = match self.urgency_assessment.as_deref() {
            Some(label) => Some(UrgencyLevel::parse(label).unwrap_or(UrgencyLevel::Urgent)),
            None => None,
        };

        ClinicalAssessment {
            urgency,
            confidence: self.confidence.map(clamp_unit),
            reasoning: self.clinical_reasoning.unwrap_or_default(),
            differential: non_blank(self.differential_diagnosis),
            disposition: self.recommended_disposition.as_deref().and_then(Disposition::parse),
            recommended_tests: non_blank(self.recommended_tests),
            safety_concerns: non_blank(self.safety_concerns),
            specialist: self.specialist_needed.filter(|s| !s.trim().is_empty()),
        }
    }
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_json() {
        let reply = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        assert_eq!(extract_json_block(reply), "{\"a\": 1}");
        assert_eq!(extract_json_block("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_symptom_reply_validation() {
        let reply = r#"```json
        {
            "symptoms": [
                {"name": "chest pain", "severity": "SEVERE", "duration": "2 days", "location": "chest"},
                {"name": "  ", "severity": "mild"},
                {"name": "fever", "severity": "blazing"}
            ],
            "medical_history": ["hypertension"],
            "current_medications": ["lisinopril"],
            "allergies": ["penicillin"],
            "confidence_score": 1.7
        }
        ```"#;

        let analysis = parse_reply::<SymptomReply>(reply).unwrap().into_analysis();
        assert_eq!(analysis.symptoms.len(), 2);
        assert_eq!(analysis.symptoms[0].severity, Severity::Severe);
        assert_eq!(analysis.symptoms[1].severity, Severity::Moderate);
        assert_eq!(analysis.symptoms[1].duration, "unknown");
        assert_eq!(analysis.medications, vec!["lisinopril"]);
        assert_eq!(analysis.confidence, 1.0);
    }

    #[test]
    fn test_malformed_reply_is_error() {
        assert!(parse_reply::<SymptomReply>("I think it's a cold").is_err());
    }

    #[test]
    fn test_triage_reply_unknown_urgency_triages_up() {
        let reply = r#"{"urgency_assessment": "whenever", "confidence": 0.6}"#;
        let assessment = parse_reply::<TriageReply>(reply).unwrap().into_assessment();
        assert_eq!(assessment.urgency, Some(UrgencyLevel::Urgent));
        assert_eq!(assessment.confidence, Some(0.6));
    }

    #[test]
    fn test_null_fields_keep_the_reply() {
        let reply = r#"{
            "symptoms": [
                {"name": "worst headache of my life", "severity": "severe",
                 "characteristics": null, "triggers": null, "relievers": null, "location": null}
            ],
            "medical_history": null,
            "current_medications": null,
            "allergies": ["sulfa"],
            "clarifying_questions": null,
            "confidence_score": null
        }"#;

        let analysis = parse_reply::<SymptomReply>(reply).unwrap().into_analysis();
        assert_eq!(analysis.symptoms.len(), 1);
        assert_eq!(analysis.symptoms[0].name, "worst headache of my life");
        assert!(analysis.symptoms[0].characteristics.is_empty());
        assert!(analysis.medical_history.is_empty());
        assert_eq!(analysis.allergies, vec!["sulfa"]);
        assert_eq!(analysis.confidence, SymptomReply::DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_triage_reply_null_lists_and_extras() {
        let reply = r#"{
            "urgency_assessment": "non_urgent",
            "clinical_reasoning": "Mild seasonal allergies",
            "differential_diagnosis": ["Allergic rhinitis", " "],
            "recommended_disposition": "Telehealth",
            "recommended_tests": null,
            "safety_concerns": null
        }"#;

        let assessment = parse_reply::<TriageReply>(reply).unwrap().into_assessment();
        assert_eq!(assessment.urgency, Some(UrgencyLevel::NonUrgent));
        assert_eq!(assessment.differential, vec!["Allergic rhinitis"]);
        assert_eq!(assessment.disposition, Some(Disposition::Telehealth));
        assert!(assessment.recommended_tests.is_empty());
        assert!(assessment.safety_concerns.is_empty());
    }
}
