use crate::models::{RedFlag, Symptom, UrgencyLevel, VoiceDigest};

use super::{has_critical_flag, symptom_text};

/// Tunables for turning a clinical assessment into a final urgency
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Confidence reported when a critical red flag forces `Immediate`
    pub critical_flag_confidence: f64,
    /// Confidence reported when a non-critical red flag forces `Urgent`
    pub high_flag_confidence: f64,
    /// Urgency assumed when the assessment names none
    pub default_assessment: UrgencyLevel,
    /// Confidence assumed when the assessment reports none
    pub default_confidence: f64,
    /// Multiplier applied when the voice sounds more urgent than the assessment
    pub voice_disagreement_factor: f64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            critical_flag_confidence: 0.95,
            high_flag_confidence: 0.90,
            default_assessment: UrgencyLevel::SemiUrgent,
            default_confidence: 0.75,
            voice_disagreement_factor: 0.9,
        }
    }
}

/// Combine red flags, the reasoning assessment and voice urgency.
///
/// Red flags short-circuit: any critical flag yields `Immediate`, any other
/// flag yields `Urgent`, whatever the assessment says.
pub fn calculate_urgency(
    assessment: Option<UrgencyLevel>,
    assessment_confidence: Option<f64>,
    red_flags: &[RedFlag],
    voice: &VoiceDigest,
    config: &TriageConfig,
) -> (UrgencyLevel, f64) {
    if !red_flags.is_empty() {
        return if has_critical_flag(red_flags) {
            (UrgencyLevel::Immediate, config.critical_flag_confidence)
        } else {
            (UrgencyLevel::Urgent, config.high_flag_confidence)
        };
    }

    let urgency = assessment.unwrap_or(config.default_assessment);
    let mut confidence = assessment_confidence.unwrap_or(config.default_confidence);

    if voice.is_high_urgency() && urgency != UrgencyLevel::Immediate {
        confidence *= config.voice_disagreement_factor;
    }

    (urgency, confidence)
}

/// Baseline workup for the presenting symptoms, without duplicates
pub fn recommend_tests(symptoms: &[Symptom]) -> Vec<String> {
    let texts: Vec<String> = symptoms.iter().map(symptom_text).collect();
    let any = |needle: &str| texts.iter().any(|t| t.contains(needle));

    let mut tests: Vec<&str> = Vec::new();
    if any("chest pain") {
        tests.extend(["ECG", "Troponin", "Chest X-ray"]);
    }
    if any("abdominal pain") {
        tests.extend(["CBC", "CMP", "Lipase", "Urinalysis"]);
    }
    if any("headache") {
        tests.extend(["CT Head non-contrast", "CBC"]);
    }
    if any("shortness of breath") || any("cough") {
        tests.extend(["Chest X-ray", "Pulse oximetry", "ABG if severe"]);
    }

    let mut unique: Vec<String> = Vec::new();
    for test in tests {
        if !unique.iter().any(|t| t == test) {
            unique.push(test.to_string());
        }
    }
    unique
}

pub fn suggest_specialist(symptoms: &[Symptom]) -> Option<String> {
    let texts: Vec<String> = symptoms.iter().map(symptom_text).collect();
    let any = |needle: &str| texts.iter().any(|t| t.contains(needle));

    if any("chest pain") {
        Some("Cardiology".to_string())
    } else if any("abdominal pain") {
        Some("Gastroenterology or General Surgery".to_string())
    } else if any("headache") {
        Some("Neurology".to_string())
    } else {
        None
    }
}

pub fn estimate_wait_time(urgency: UrgencyLevel) -> &'static str {
    match urgency {
        UrgencyLevel::Immediate => "0 minutes - immediate attention",
        UrgencyLevel::Urgent => "15-30 minutes",
        UrgencyLevel::SemiUrgent => "1-2 hours",
        UrgencyLevel::NonUrgent => "2-4 hours",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlagSeverity, Severity, VoiceUrgency};

    fn flag(severity: FlagSeverity) -> RedFlag {
        RedFlag {
            symptom: "x".to_string(),
            reasoning: "y".to_string(),
            severity,
        }
    }

    #[test]
    fn test_critical_flag_overrides_assessment() {
        let (urgency, confidence) = calculate_urgency(
            Some(UrgencyLevel::NonUrgent),
            Some(0.1),
            &[flag(FlagSeverity::Critical)],
            &VoiceDigest::neutral(),
            &TriageConfig::default(),
        );
        assert_eq!(urgency, UrgencyLevel::Immediate);
        assert_eq!(confidence, 0.95);
    }

    #[test]
    fn test_high_flag_forces_urgent() {
        let (urgency, confidence) = calculate_urgency(
            Some(UrgencyLevel::NonUrgent),
            Some(0.99),
            &[flag(FlagSeverity::High)],
            &VoiceDigest::neutral(),
            &TriageConfig::default(),
        );
        assert_eq!(urgency, UrgencyLevel::Urgent);
        assert_eq!(confidence, 0.90);
    }

    #[test]
    fn test_voice_disagreement_lowers_confidence() {
        let voice = VoiceDigest {
            urgency_level: Some(VoiceUrgency::High),
            ..Default::default()
        };
        let (urgency, confidence) = calculate_urgency(
            Some(UrgencyLevel::SemiUrgent),
            Some(0.8),
            &[],
            &voice,
            &TriageConfig::default(),
        );
        assert_eq!(urgency, UrgencyLevel::SemiUrgent);
        assert!((confidence - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_defaults_without_assessment() {
        let (urgency, confidence) =
            calculate_urgency(None, None, &[], &VoiceDigest::neutral(), &TriageConfig::default());
        assert_eq!(urgency, UrgencyLevel::SemiUrgent);
        assert_eq!(confidence, 0.75);
    }

    #[test]
    fn test_recommend_tests_deduplicates() {
        let symptoms = vec![
            Symptom::new("chest pain", Severity::Moderate, "1 day"),
            Symptom::new("cough", Severity::Mild, "1 day"),
        ];
        let tests = recommend_tests(&symptoms);
        assert_eq!(
            tests,
            vec!["ECG", "Troponin", "Chest X-ray", "Pulse oximetry", "ABG if severe"]
        );
        assert_eq!(suggest_specialist(&symptoms).as_deref(), Some("Cardiology"));
    }

    #[test]
    fn test_no_specialist_for_mild_cough() {
        let symptoms = vec![Symptom::new("cough", Severity::Mild, "3 days")];
        assert_eq!(suggest_specialist(&symptoms), None);
        assert_eq!(estimate_wait_time(UrgencyLevel::NonUrgent), "2-4 hours");
    }
}
