use crate::models::{FlagSeverity, RedFlag, Symptom};

/// When a keyword match actually raises the flag
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Always,
    SevereOrWorse,
    /// Severe or worse, or any of these terms in the medical history
    SevereOrRiskFactors(&'static [&'static str]),
}

struct RedFlagRule {
    label: &'static str,
    keywords: &'static [&'static str],
    trigger: Trigger,
    severity: FlagSeverity,
    reasoning: &'static str,
}

const CARDIAC_RISK_FACTORS: &[&str] = &["hypertension", "diabetes", "heart", "cardiac"];

const RULES: &[RedFlagRule] = &[
    RedFlagRule {
        label: "Chest Pain with Risk Factors",
        keywords: &["chest pain", "chest pressure"],
        trigger: Trigger::SevereOrRiskFactors(CARDIAC_RISK_FACTORS),
        severity: FlagSeverity::Critical,
        reasoning: "Chest pain in patient with cardiac risk factors requires immediate cardiac workup",
    },
    RedFlagRule {
        label: "Severe Headache",
        keywords: &["worst headache", "severe headache", "thunderclap"],
        trigger: Trigger::Always,
        severity: FlagSeverity::Critical,
        reasoning: "Sudden severe headache raises concern for SAH, meningitis, or other neurological emergency",
    },
    RedFlagRule {
        label: "Respiratory Distress",
        keywords: &["shortness of breath", "difficulty breathing", "can't breathe"],
        trigger: Trigger::SevereOrWorse,
        severity: FlagSeverity::Critical,
        reasoning: "Severe respiratory distress requires immediate evaluation and oxygen support",
    },
    RedFlagRule {
        label: "Severe Abdominal Pain",
        keywords: &["abdominal pain"],
        trigger: Trigger::SevereOrWorse,
        severity: FlagSeverity::High,
        reasoning: "Severe abdominal pain may indicate surgical emergency (appendicitis, perforation, etc.)",
    },
];

/// Text a symptom is matched against: its name plus characteristics, lowercased
pub fn symptom_text(symptom: &Symptom) -> String {
    let mut text = symptom.name.to_lowercase();
    for characteristic in &symptom.characteristics {
        text.push(' ');
        text.push_str(&characteristic.to_lowercase());
    }
    text
}

/// Find red flags in a symptom set. Each flag label is reported once.
pub fn identify_red_flags(symptoms: &[Symptom], medical_history: &[String]) -> Vec<RedFlag> {
    let history = medical_history.join(" ").to_lowercase();
    let mut flags: Vec<RedFlag> = Vec::new();

    for symptom in symptoms {
        let text = symptom_text(symptom);

        for rule in RULES {
            if !rule.keywords.iter().any(|k| text.contains(k)) {
                continue;
            }

            let triggered = match rule.trigger {
                Trigger::Always => true,
                Trigger::SevereOrWorse => symptom.severity.is_severe_or_worse(),
                Trigger::SevereOrRiskFactors(risks) => {
                    symptom.severity.is_severe_or_worse()
                        || risks.iter().any(|r| history.contains(r))
                }
            };

            if triggered && !flags.iter().any(|f| f.symptom == rule.label) {
                flags.push(RedFlag {
                    symptom: rule.label.to_string(),
                    reasoning: rule.reasoning.to_string(),
                    severity: rule.severity,
                });
            }
        }
    }

    flags
}

pub fn has_critical_flag(flags: &[RedFlag]) -> bool {
    flags.iter().any(|f| f.severity == FlagSeverity::Critical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    #[test]
    fn test_worst_headache_is_critical() {
        let symptoms = vec![Symptom::new("worst headache of my life", Severity::Mild, "1 hour")];
        let flags = identify_red_flags(&symptoms, &[]);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].symptom, "Severe Headache");
        assert!(has_critical_flag(&flags));
    }

    #[test]
    fn test_keyword_in_characteristics() {
        let symptoms = vec![Symptom::new("headache", Severity::Moderate, "2 hours")
            .with_characteristics(vec!["Thunderclap onset".to_string()])];
        let flags = identify_red_flags(&symptoms, &[]);
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn test_chest_pain_needs_risk_or_severity() {
        let mild = vec![Symptom::new("chest pain", Severity::Mild, "2 days")];
        assert!(identify_red_flags(&mild, &[]).is_empty());

        let history = vec!["Hypertension".to_string()];
        assert_eq!(identify_red_flags(&mild, &history).len(), 1);

        let severe = vec![Symptom::new("chest pain", Severity::Severe, "2 days")];
        assert_eq!(identify_red_flags(&severe, &[]).len(), 1);
    }

    #[test]
    fn test_abdominal_pain_is_high_not_critical() {
        let symptoms = vec![Symptom::new("abdominal pain", Severity::Severe, "6 hours")];
        let flags = identify_red_flags(&symptoms, &[]);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].severity, FlagSeverity::High);
        assert!(!has_critical_flag(&flags));

        let moderate = vec![Symptom::new("abdominal pain", Severity::Moderate, "6 hours")];
        assert!(identify_red_flags(&moderate, &[]).is_empty());
    }

    #[test]
    fn test_flags_deduplicated() {
        let symptoms = vec![
            Symptom::new("shortness of breath", Severity::Severe, "1 hour"),
            Symptom::new("can't breathe", Severity::Moderate, "1 hour"),
        ];
        let flags = identify_red_flags(&symptoms, &[]);
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn test_breathing_complaints_need_severity() {
        let mild = vec![Symptom::new("can't breathe", Severity::Mild, "10 minutes")];
        assert!(identify_red_flags(&mild, &[]).is_empty());

        let critical = vec![Symptom::new("can't breathe", Severity::Critical, "10 minutes")];
        let flags = identify_red_flags(&critical, &[]);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].symptom, "Respiratory Distress");
    }

    #[test]
    fn test_mild_confusion_is_not_flagged() {
        let symptoms = vec![
            Symptom::new("slightly confused", Severity::Mild, "1 day"),
            Symptom::new("nosebleed", Severity::Mild, "1 day"),
        ];
        let flags = identify_red_flags(&symptoms, &[]);
        assert!(flags.is_empty());
        assert!(!has_critical_flag(&flags));
    }

    #[test]
    fn test_mild_cough_has_no_flags() {
        let symptoms = vec![Symptom::new("cough", Severity::Mild, "3 days")];
        assert!(identify_red_flags(&symptoms, &[]).is_empty());
    }
}
