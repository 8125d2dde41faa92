use std::collections::BTreeSet;

use crate::models::{Contradiction, TriageInput};

const PENICILLIN_FAMILY: &[&str] = &["amoxicillin", "ampicillin", "penicillin"];

/// Cross-check what the patient said against their documents and against
/// itself.
pub fn check_contradictions(input: &TriageInput) -> Vec<Contradiction> {
    let mut contradictions = Vec::new();

    let stated_allergies = lowercase_set(&input.allergies);
    let mut medications = lowercase_set(&input.medications);
    if let Some(record) = &input.documents.medical_record {
        medications.extend(lowercase_set(&record.medications));
    }

    if stated_allergies.iter().any(|a| a.contains("penicillin")) {
        for med in &medications {
            if PENICILLIN_FAMILY.iter().any(|p| med.contains(p)) {
                contradictions.push(Contradiction {
                    finding: "Penicillin allergy documented".to_string(),
                    conflict: format!("Patient currently taking {} (penicillin-based)", med),
                    recommendation: "STOP medication immediately, consult physician".to_string(),
                });
            }
        }
    }

    if let Some(record) = &input.documents.medical_record {
        let stated_conditions = lowercase_set(&input.medical_history);
        for condition in lowercase_set(&record.medical_conditions) {
            if !stated_conditions.contains(&condition) {
                contradictions.push(Contradiction {
                    finding: format!("{} documented in medical record", condition),
                    conflict: format!("Patient did not mention {} history", condition),
                    recommendation: format!("Clarify {} history with the patient", condition),
                });
            }
        }

        for allergy in lowercase_set(&record.allergies) {
            if allergy != "no known allergies" && !stated_allergies.contains(&allergy) {
                contradictions.push(Contradiction {
                    finding: format!("{} allergy documented in medical record", allergy),
                    conflict: "Patient did not report this allergy".to_string(),
                    recommendation: "Confirm allergy before ordering medications".to_string(),
                });
            }
        }
    }

    contradictions
}

fn lowercase_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentEvidence, MedicalRecordInfo, VoiceDigest};

    fn input(allergies: &[&str], medications: &[&str], history: &[&str]) -> TriageInput {
        TriageInput {
            voice: VoiceDigest::neutral(),
            symptoms: vec![],
            medical_history: history.iter().map(|s| s.to_string()).collect(),
            medications: medications.iter().map(|s| s.to_string()).collect(),
            allergies: allergies.iter().map(|s| s.to_string()).collect(),
            documents: DocumentEvidence::default(),
        }
    }

    #[test]
    fn test_penicillin_allergy_with_amoxicillin() {
        let contradictions = check_contradictions(&input(&["Penicillin"], &["Amoxicillin 500mg"], &[]));
        assert_eq!(contradictions.len(), 1);
        assert!(contradictions[0].conflict.contains("amoxicillin"));
    }

    #[test]
    fn test_record_condition_not_mentioned() {
        let mut triage_input = input(&[], &[], &["hypertension"]);
        triage_input.documents.medical_record = Some(MedicalRecordInfo {
            patient_name: "Jane Doe".to_string(),
            date_of_birth: None,
            medical_conditions: vec!["Hypertension".to_string(), "Asthma".to_string()],
            medications: vec![],
            allergies: vec!["No known allergies".to_string()],
            last_visit_date: None,
            provider_name: None,
        });

        let contradictions = check_contradictions(&triage_input);
        assert_eq!(contradictions.len(), 1);
        assert_eq!(contradictions[0].finding, "asthma documented in medical record");
    }

    #[test]
    fn test_consistent_input_has_no_contradictions() {
        assert!(check_contradictions(&input(&["latex"], &["lisinopril"], &[])).is_empty());
    }
}
