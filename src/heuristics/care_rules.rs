use crate::models::{
    Alert, Appointment, CarePlanInput, Notification, Referral, Symptom, SystemActions,
    TriageDigest, UrgencyLevel, VoiceDigest,
};

const BASE_WARNING_SIGNS: &[&str] = &[
    "Severe or worsening pain",
    "Difficulty breathing or shortness of breath",
    "Chest pain or pressure",
    "High fever over 103°F",
    "Severe bleeding",
    "Confusion or difficulty staying awake",
    "Severe allergic reaction (hives, swelling, difficulty breathing)",
];

const MAX_WARNING_SIGNS: usize = 7;
const MAX_LIST_ITEMS: usize = 5;

pub const DEFAULT_WELCOME: &str = "Thank you for checking in. We're here to help you.";

/// Age group inferred from history keywords; gender is never known here
pub fn infer_demographics(medical_history: &[String]) -> String {
    let history = medical_history.join(" ").to_lowercase();
    let age_group = if history.contains("pediatric") {
        "pediatric"
    } else if history.contains("elderly") || history.contains("geriatric") {
        "elderly"
    } else {
        "adult"
    };
    format!("{}, gender unknown", age_group)
}

pub fn history_of_present_illness(symptoms: &[Symptom]) -> String {
    let Some(primary) = symptoms.first() else {
        return "Patient presents with undifferentiated symptoms".to_string();
    };

    let mut parts = vec![format!("Patient reports {}", primary.name)];
    if !primary.duration.is_empty() {
        parts[0].push_str(&format!(" for {}", primary.duration));
    }
    parts[0].push_str(&format!(" described as {}", primary.severity));

    if symptoms.len() > 1 {
        let associated: Vec<&str> = symptoms[1..].iter().map(|s| s.name.as_str()).collect();
        parts.push(format!("Associated symptoms include {}", associated.join(", ")));
    }

    parts.join(". ") + "."
}

pub fn physical_exam_notes(voice: &VoiceDigest) -> String {
    let mut notes = Vec::new();
    if voice.is_high_urgency() {
        notes.push("Patient appears in distress");
    }
    if voice.emotions.pain > 0.6 {
        notes.push("Signs of pain evident in voice");
    }
    if voice.emotions.anxiety > 0.6 {
        notes.push("Patient appears anxious");
    }

    if notes.is_empty() {
        "Unable to assess remotely".to_string()
    } else {
        notes.join("; ")
    }
}

/// Pull likely diagnoses mentioned in a free-text clinical summary
pub fn extract_differential(summary: &str) -> Vec<String> {
    let lower = summary.to_lowercase();
    let has_word = |word: &str| {
        lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token == word)
    };

    let mut differentials = Vec::new();
    if lower.contains("cardiac") || has_word("mi") {
        differentials.push("Acute coronary syndrome".to_string());
    }
    if lower.contains("pneumonia") {
        differentials.push("Pneumonia".to_string());
    }
    if lower.contains("appendicitis") {
        differentials.push("Appendicitis".to_string());
    }
    if lower.contains("migraine") {
        differentials.push("Migraine".to_string());
    }

    if differentials.is_empty() {
        differentials.push("Diagnosis pending further evaluation".to_string());
    }
    differentials
}

/// First substantial non-heading line of generated instructions
pub fn extract_welcome_message(text: &str) -> String {
    text.lines()
        .take(3)
        .map(str::trim)
        .find(|line| line.len() > 20 && !line.starts_with('#'))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_WELCOME.to_string())
}

/// Bullet items following the first line that mentions `section`
pub fn extract_list_items(text: &str, section: &str) -> Vec<String> {
    let section = section.to_lowercase();
    let mut items = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if !in_section {
            in_section = trimmed.to_lowercase().contains(&section);
            continue;
        }

        if let Some(item) = trimmed.strip_prefix('-').or_else(|| trimmed.strip_prefix('•')) {
            items.push(item.trim().to_string());
        } else if !items.is_empty() {
            break;
        }
    }

    items.truncate(MAX_LIST_ITEMS);
    items
}

pub fn warning_signs(symptoms: &[Symptom]) -> Vec<String> {
    let names: Vec<String> = symptoms.iter().map(|s| s.name.to_lowercase()).collect();
    let any = |needle: &str| names.iter().any(|n| n.contains(needle));

    let mut signs: Vec<String> = Vec::new();
    if any("headache") {
        signs.push("Worst headache of your life or sudden severe headache".to_string());
    }
    if any("abdominal") {
        signs.push("Severe abdominal pain or rigid belly".to_string());
    }
    if any("chest") {
        signs.push("Pain spreading to arm, jaw, or back".to_string());
    }
    signs.extend(BASE_WARNING_SIGNS.iter().map(|s| s.to_string()));
    signs.truncate(MAX_WARNING_SIGNS);
    signs
}

pub fn follow_up_instructions(urgency: UrgencyLevel) -> &'static str {
    match urgency {
        UrgencyLevel::Immediate | UrgencyLevel::Urgent => {
            "Follow up with your doctor within 24-48 hours or as instructed by the treating physician."
        }
        UrgencyLevel::SemiUrgent => {
            "Schedule a follow-up appointment with your primary care doctor within 3-7 days."
        }
        UrgencyLevel::NonUrgent => {
            "Follow up with your primary care doctor as needed or within 1-2 weeks."
        }
    }
}

/// Appointments, alerts, orders, referrals and notifications implied by triage
pub fn system_actions(triage: &TriageDigest) -> SystemActions {
    let mut actions = SystemActions::default();

    if triage.urgency_level.is_acute() {
        actions.appointments.push(Appointment {
            kind: "immediate_visit".to_string(),
            location: triage.disposition,
            time: "ASAP".to_string(),
            priority: "high".to_string(),
        });
    }

    if !triage.red_flags.is_empty() {
        actions.alerts.push(Alert {
            kind: "clinical_alert".to_string(),
            severity: "high".to_string(),
            message: format!("RED FLAG: {} critical findings", triage.red_flags.len()),
            recipients: vec!["triage_nurse".to_string(), "attending_physician".to_string()],
        });
    }

    actions.tests_to_order = triage.recommended_tests.clone();

    if let Some(specialty) = &triage.specialist_referral {
        actions.referrals.push(Referral {
            specialty: specialty.clone(),
            urgency: triage.urgency_level,
            reason: "Based on presenting symptoms".to_string(),
        });
    }

    actions.notifications.push(Notification {
        kind: "patient_sms".to_string(),
        message: format!(
            "Your check-in is complete. Estimated wait: {}",
            triage.estimated_wait_time
        ),
        recipients: vec![],
    });

    if triage.urgency_level == UrgencyLevel::Immediate {
        actions.notifications.push(Notification {
            kind: "staff_alert".to_string(),
            message: "HIGH PRIORITY patient in waiting room".to_string(),
            recipients: vec!["charge_nurse".to_string(), "ER_physician".to_string()],
        });
    }

    actions
}

/// Chief complaint is the first symptom reported
pub fn chief_complaint(input: &CarePlanInput) -> String {
    input
        .symptoms
        .first()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Disposition, FlagSeverity, RedFlag, Severity};

    fn digest(urgency: UrgencyLevel, flags: usize) -> TriageDigest {
        TriageDigest {
            urgency_level: urgency,
            disposition: Disposition::for_urgency(urgency),
            red_flags: (0..flags)
                .map(|i| RedFlag {
                    symptom: format!("flag {}", i),
                    reasoning: String::new(),
                    severity: FlagSeverity::Critical,
                })
                .collect(),
            recommended_tests: vec!["ECG".to_string()],
            specialist_referral: Some("Cardiology".to_string()),
            estimated_wait_time: "0 minutes - immediate attention".to_string(),
            reasoning: String::new(),
            differential_diagnosis: vec![],
        }
    }

    #[test]
    fn test_system_actions_for_immediate() {
        let actions = system_actions(&digest(UrgencyLevel::Immediate, 1));
        assert_eq!(actions.appointments.len(), 1);
        assert_eq!(actions.alerts.len(), 1);
        assert_eq!(actions.referrals.len(), 1);
        assert_eq!(actions.notifications.len(), 2);
        assert_eq!(actions.tests_to_order, vec!["ECG"]);
    }

    #[test]
    fn test_system_actions_for_routine() {
        let mut triage = digest(UrgencyLevel::NonUrgent, 0);
        triage.specialist_referral = None;
        let actions = system_actions(&triage);
        assert!(actions.appointments.is_empty());
        assert!(actions.alerts.is_empty());
        assert!(actions.referrals.is_empty());
        assert_eq!(actions.notifications.len(), 1);
    }

    #[test]
    fn test_history_of_present_illness() {
        let symptoms = vec![
            Symptom::new("chest pain", Severity::Severe, "2 days"),
            Symptom::new("fever", Severity::Moderate, "1 day"),
        ];
        assert_eq!(
            history_of_present_illness(&symptoms),
            "Patient reports chest pain for 2 days described as severe. Associated symptoms include fever."
        );
        assert_eq!(
            history_of_present_illness(&[]),
            "Patient presents with undifferentiated symptoms"
        );
    }

    #[test]
    fn test_extract_list_items() {
        let text = "Welcome to the clinic, we will take good care of you.\n\nWhat to expect:\n- Check in at the desk\n- A nurse takes vitals\n\nHow to prepare:\n- Bring your medication list";
        assert_eq!(
            extract_list_items(text, "What to expect"),
            vec!["Check in at the desk", "A nurse takes vitals"]
        );
        assert_eq!(extract_list_items(text, "prepare"), vec!["Bring your medication list"]);
        assert_eq!(
            extract_welcome_message(text),
            "Welcome to the clinic, we will take good care of you."
        );
    }

    #[test]
    fn test_warning_signs_capped_and_customized() {
        let signs = warning_signs(&[Symptom::new("headache", Severity::Mild, "1 day")]);
        assert_eq!(signs.len(), 7);
        assert!(signs[0].contains("Worst headache"));
    }

    #[test]
    fn test_extract_differential() {
        assert_eq!(extract_differential("rule out MI"), vec!["Acute coronary syndrome"]);
        assert_eq!(
            extract_differential("nothing specific"),
            vec!["Diagnosis pending further evaluation"]
        );
    }

    #[test]
    fn test_physical_exam_notes() {
        assert_eq!(physical_exam_notes(&VoiceDigest::neutral()), "Unable to assess remotely");
    }
}
