use std::fmt;

use serde::{Deserialize, Serialize};

use super::{clamp_unit, UrgencyContext};

/// Symptom severity as reported by symptom reasoning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Critical => "critical",
        }
    }

    /// Parse a free-text severity, falling back to `Moderate`
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "mild" => Severity::Mild,
            "severe" => Severity::Severe,
            "critical" => Severity::Critical,
            _ => Severity::Moderate,
        }
    }

    pub fn is_severe_or_worse(&self) -> bool {
        *self >= Severity::Severe
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single symptom extracted from the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub name: String,
    pub severity: Severity,
    /// Free-text duration, e.g. "2 days"
    pub duration: String,
    pub location: Option<String>,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub relievers: Vec<String>,
}

impl Symptom {
    pub fn new(name: impl Into<String>, severity: Severity, duration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity,
            duration: duration.into(),
            location: None,
            characteristics: vec![],
            triggers: vec![],
            relievers: vec![],
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_characteristics(mut self, characteristics: Vec<String>) -> Self {
        self.characteristics = characteristics;
        self
    }
}

/// Input bundle for the Symptom Reasoning stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomReasoningInput {
    pub transcript: String,
    pub urgency_context: UrgencyContext,
}

/// Output of the Symptom Reasoning stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    pub symptoms: Vec<Symptom>,
    pub medical_history: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub clarifying_questions: Vec<String>,
    pub missing_info: Vec<String>,
    /// Overall confidence (0-1); 0.5 marks a degraded result
    pub confidence: f64,
}

impl SymptomAnalysis {
    /// Confidence assigned when the reasoning reply could not be parsed
    pub const DEGRADED_CONFIDENCE: f64 = 0.5;

    pub fn new(symptoms: Vec<Symptom>, confidence: f64) -> Self {
        Self {
            symptoms,
            medical_history: vec![],
            medications: vec![],
            allergies: vec![],
            clarifying_questions: vec![],
            missing_info: vec![],
            confidence: clamp_unit(confidence),
        }
    }

    /// Empty, low-confidence analysis used when reasoning output is unusable
    pub fn degraded() -> Self {
        Self::new(vec![], Self::DEGRADED_CONFIDENCE)
    }

    /// Names of the first `n` symptoms
    pub fn primary_symptom_names(&self, n: usize) -> Vec<String> {
        self.symptoms.iter().take(n).map(|s| s.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_severity_lenient() {
        assert_eq!(Severity::parse_lenient("Severe"), Severity::Severe);
        assert_eq!(Severity::parse_lenient(" mild "), Severity::Mild);
        assert_eq!(Severity::parse_lenient("excruciating"), Severity::Moderate);
        assert!(Severity::Critical.is_severe_or_worse());
        assert!(!Severity::Moderate.is_severe_or_worse());
    }

    #[test]
    fn test_primary_symptom_names() {
        let analysis = SymptomAnalysis::new(
            vec![
                Symptom::new("cough", Severity::Mild, "3 days"),
                Symptom::new("fever", Severity::Moderate, "2 days"),
                Symptom::new("fatigue", Severity::Mild, "1 week"),
                Symptom::new("sore throat", Severity::Mild, "2 days"),
            ],
            0.9,
        );

        assert_eq!(
            analysis.primary_symptom_names(3),
            vec!["cough", "fever", "fatigue"]
        );
    }
}
