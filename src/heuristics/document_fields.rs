use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    DocumentResult, DocumentType, InsuranceInfo, MedicalRecordInfo, PrescriptionInfo,
};

/// Keywords that vote for each document type
const DOCUMENT_KEYWORDS: &[(DocumentType, &[&str])] = &[
    (
        DocumentType::InsuranceCard,
        &["insurance", "member", "id", "group", "coverage", "plan"],
    ),
    (
        DocumentType::MedicalRecord,
        &["patient", "diagnosis", "history", "medications", "allergies"],
    ),
    (
        DocumentType::Prescription,
        &["rx", "prescription", "sig", "refill", "dosage"],
    ),
];

const INSURANCE_PROVIDERS: &[&str] = &["blue cross", "aetna", "cigna", "united", "humana", "kaiser"];

static MEMBER_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)member\s*id[:\s]+([A-Z0-9]+)").unwrap(),
        Regex::new(r"(?i)\bid[:\s]+([A-Z0-9]{8,})").unwrap(),
        Regex::new(r"(?i)member\s*#[:\s]+([A-Z0-9]+)").unwrap(),
    ]
});

static GROUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)group[:\s#]+([A-Z0-9]+)").unwrap());

static PATIENT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)patient[: \t]+([A-Za-z][A-Za-z \t]*)").unwrap());

static CONDITION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["diagnosis", "history", "conditions"]
        .iter()
        .map(|keyword| Regex::new(&format!(r"(?i){}[: \t]+([^\n]+)", keyword)).unwrap())
        .collect()
});

static MEDICATIONS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)medications?[: \t]+([^\n]+)").unwrap());

static ALLERGIES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)allergies[: \t]+([^\n]+)").unwrap());

static DOSAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\s*(?:mg|mcg))").unwrap());

static FREQUENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(once|twice|three times)\s*(daily|per day)").unwrap(),
        Regex::new(r"(?i)(\d+)\s*times?\s*(daily|per day)").unwrap(),
        Regex::new(r"(?i)every\s*(\d+)\s*hours").unwrap(),
    ]
});

static PRESCRIBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdr\.?[ \t]+([A-Za-z][A-Za-z \t]*)").unwrap());

/// Classify a document by counting keyword hits per type.
///
/// Ties go to the type listed first.
pub fn classify_document(text: &str) -> DocumentType {
    let lower = text.to_lowercase();
    let mut best = (DocumentType::Unknown, 0usize);

    for (doc_type, keywords) in DOCUMENT_KEYWORDS {
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        if hits > best.1 {
            best = (*doc_type, hits);
        }
    }

    best.0
}

/// Classify and extract structured fields from OCR text
pub fn extract_document(text: &str) -> DocumentResult {
    match classify_document(text) {
        DocumentType::InsuranceCard => {
            let (info, confidence, warnings) = extract_insurance(text);
            DocumentResult::insurance(info, text, confidence, warnings)
        }
        DocumentType::MedicalRecord => {
            let (info, confidence, warnings) = extract_medical_record(text);
            DocumentResult::medical_record(info, text, confidence, warnings)
        }
        DocumentType::Prescription => {
            let (info, confidence, warnings) = extract_prescription(text);
            DocumentResult::prescription(info, text, confidence, warnings)
        }
        DocumentType::Unknown => DocumentResult::unknown(text),
    }
}

pub fn extract_insurance(text: &str) -> (InsuranceInfo, f64, Vec<String>) {
    let mut warnings = Vec::new();
    let lower = text.to_lowercase();

    let member_id = MEMBER_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(text).map(|c| c[1].to_string()));
    if member_id.is_none() {
        warnings.push("Member ID not found".to_string());
    }

    let group_number = GROUP_PATTERN.captures(text).map(|c| c[1].to_string());

    let provider = INSURANCE_PROVIDERS
        .iter()
        .find(|p| lower.contains(*p))
        .map(|p| title_case(p));
    if provider.is_none() {
        warnings.push("Insurance provider not identified".to_string());
    }

    let plan_type = if lower.contains("ppo") {
        "PPO"
    } else if lower.contains("hmo") {
        "HMO"
    } else if lower.contains("epo") {
        "EPO"
    } else {
        "Unknown"
    };

    let confidence = if member_id.is_some() && provider.is_some() {
        0.9
    } else {
        0.6
    };

    let info = InsuranceInfo {
        provider: provider.unwrap_or_else(|| "Unknown Provider".to_string()),
        member_id: member_id.unwrap_or_else(|| "NOT_FOUND".to_string()),
        group_number,
        plan_type: plan_type.to_string(),
        // Cards carry no coverage status
        coverage_status: "Active".to_string(),
    };

    (info, confidence, warnings)
}

pub fn extract_medical_record(text: &str) -> (MedicalRecordInfo, f64, Vec<String>) {
    let mut warnings = Vec::new();

    let patient_name = PATIENT_NAME_PATTERN
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|name| !name.is_empty());

    let medical_conditions: Vec<String> = CONDITION_PATTERNS
        .iter()
        .filter_map(|re| re.captures(text))
        .flat_map(|c| split_list(&c[1]))
        .collect();

    let medications = MEDICATIONS_PATTERN
        .captures(text)
        .map(|c| split_list(&c[1]))
        .unwrap_or_default();

    let allergies = match ALLERGIES_PATTERN.captures(text) {
        Some(c) => {
            let raw = c[1].to_lowercase();
            if raw.contains("nka") || raw.contains("none") {
                vec!["No known allergies".to_string()]
            } else {
                split_list(&c[1])
            }
        }
        None => vec![],
    };

    if medical_conditions.is_empty() && medications.is_empty() {
        warnings.push("Limited medical information extracted".to_string());
    }

    let confidence = if patient_name.is_some() { 0.8 } else { 0.5 };

    let info = MedicalRecordInfo {
        patient_name: patient_name.unwrap_or_else(|| "Unknown Patient".to_string()),
        date_of_birth: None,
        medical_conditions,
        medications,
        allergies,
        last_visit_date: None,
        provider_name: None,
    };

    (info, confidence, warnings)
}

pub fn extract_prescription(text: &str) -> (PrescriptionInfo, f64, Vec<String>) {
    let mut warnings = Vec::new();

    let medication_name = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Unknown Medication")
        .to_string();

    let dosage = DOSAGE_PATTERN.captures(text).map(|c| c[1].to_string());
    if dosage.is_none() {
        warnings.push("Dosage information incomplete".to_string());
    }

    let frequency = FREQUENCY_PATTERNS
        .iter()
        .find_map(|re| re.find(text).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| "Unknown frequency".to_string());

    let prescriber = PRESCRIBER_PATTERN
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| "Unknown Doctor".to_string());

    let info = PrescriptionInfo {
        medication_name,
        dosage: dosage.unwrap_or_else(|| "Unknown dosage".to_string()),
        frequency,
        prescriber,
        date_prescribed: None,
    };

    (info, 0.75, warnings)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSURANCE_CARD: &str = "BLUE CROSS BLUE SHIELD\nPPO Plan\nMember ID: XYZ98765432\nGroup: 4455\nCoverage effective 2024";

    const MEDICAL_RECORD: &str = "Patient: Jane Doe\nDiagnosis: hypertension, asthma\nMedications: lisinopril, albuterol\nAllergies: penicillin";

    const PRESCRIPTION: &str = "Amoxicillin\n500 mg capsules\nSig: take twice daily\nRefill: 0\nDr. Alan Grant";

    #[test]
    fn test_classify_documents() {
        assert_eq!(classify_document(INSURANCE_CARD), DocumentType::InsuranceCard);
        assert_eq!(classify_document(MEDICAL_RECORD), DocumentType::MedicalRecord);
        assert_eq!(classify_document(PRESCRIPTION), DocumentType::Prescription);
        assert_eq!(classify_document("lorem ipsum"), DocumentType::Unknown);
    }

    #[test]
    fn test_extract_insurance() {
        let (info, confidence, warnings) = extract_insurance(INSURANCE_CARD);
        assert_eq!(info.provider, "Blue Cross");
        assert_eq!(info.member_id, "XYZ98765432");
        assert_eq!(info.group_number.as_deref(), Some("4455"));
        assert_eq!(info.plan_type, "PPO");
        assert_eq!(confidence, 0.9);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_extract_insurance_missing_fields() {
        let (info, confidence, warnings) = extract_insurance("insurance plan coverage");
        assert_eq!(info.member_id, "NOT_FOUND");
        assert_eq!(info.provider, "Unknown Provider");
        assert_eq!(confidence, 0.6);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_extract_medical_record() {
        let (info, confidence, warnings) = extract_medical_record(MEDICAL_RECORD);
        assert_eq!(info.patient_name, "Jane Doe");
        assert_eq!(info.medical_conditions, vec!["hypertension", "asthma"]);
        assert_eq!(info.medications, vec!["lisinopril", "albuterol"]);
        assert_eq!(info.allergies, vec!["penicillin"]);
        assert_eq!(confidence, 0.8);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_no_known_allergies() {
        let (info, _, _) = extract_medical_record("Patient: Sam\nAllergies: NKA");
        assert_eq!(info.allergies, vec!["No known allergies"]);
    }

    #[test]
    fn test_extract_prescription() {
        let (info, confidence, warnings) = extract_prescription(PRESCRIPTION);
        assert_eq!(info.medication_name, "Amoxicillin");
        assert_eq!(info.dosage, "500 mg");
        assert_eq!(info.frequency, "twice daily");
        assert_eq!(info.prescriber, "Alan Grant");
        assert_eq!(confidence, 0.75);
        assert!(warnings.is_empty());
    }
}
