use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::clamp_unit;

/// Reference to one document supplied with a case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef(pub PathBuf);

impl DocumentRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    InsuranceCard,
    MedicalRecord,
    Prescription,
    Unknown,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::InsuranceCard => "insurance_card",
            DocumentType::MedicalRecord => "medical_record",
            DocumentType::Prescription => "prescription",
            DocumentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceInfo {
    pub provider: String,
    pub member_id: String,
    pub group_number: Option<String>,
    pub plan_type: String,
    pub coverage_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecordInfo {
    pub patient_name: String,
    pub date_of_birth: Option<String>,
    pub medical_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub last_visit_date: Option<String>,
    pub provider_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionInfo {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub prescriber: String,
    pub date_prescribed: Option<String>,
}

/// Output of one Document Processing invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub document_type: DocumentType,
    pub insurance: Option<InsuranceInfo>,
    pub medical_record: Option<MedicalRecordInfo>,
    pub prescription: Option<PrescriptionInfo>,
    pub extracted_text: String,
    /// Extraction confidence (0-1)
    pub confidence: f64,
    pub warnings: Vec<String>,
}

impl DocumentResult {
    pub fn unknown(extracted_text: impl Into<String>) -> Self {
        Self {
            document_type: DocumentType::Unknown,
            insurance: None,
            medical_record: None,
            prescription: None,
            extracted_text: extracted_text.into(),
            confidence: 0.3,
            warnings: vec!["Could not determine document type".to_string()],
        }
    }

    pub fn insurance(
        info: InsuranceInfo,
        extracted_text: impl Into<String>,
        confidence: f64,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            document_type: DocumentType::InsuranceCard,
            insurance: Some(info),
            medical_record: None,
            prescription: None,
            extracted_text: extracted_text.into(),
            confidence: clamp_unit(confidence),
            warnings,
        }
    }

    pub fn medical_record(
        info: MedicalRecordInfo,
        extracted_text: impl Into<String>,
        confidence: f64,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            document_type: DocumentType::MedicalRecord,
            insurance: None,
            medical_record: Some(info),
            prescription: None,
            extracted_text: extracted_text.into(),
            confidence: clamp_unit(confidence),
            warnings,
        }
    }

    pub fn prescription(
        info: PrescriptionInfo,
        extracted_text: impl Into<String>,
        confidence: f64,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            document_type: DocumentType::Prescription,
            insurance: None,
            medical_record: None,
            prescription: Some(info),
            extracted_text: extracted_text.into(),
            confidence: clamp_unit(confidence),
            warnings,
        }
    }
}

/// Document evidence merged across all document results for triage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentEvidence {
    pub insurance: Option<InsuranceInfo>,
    pub medical_record: Option<MedicalRecordInfo>,
}

impl DocumentEvidence {
    /// Merge per-document results in list order; for each category the last
    /// document that carries it wins.
    pub fn merge(results: &[DocumentResult]) -> Self {
        let mut evidence = Self::default();
        for result in results {
            if let Some(insurance) = &result.insurance {
                evidence.insurance = Some(insurance.clone());
            }
            if let Some(record) = &result.medical_record {
                evidence.medical_record = Some(record.clone());
            }
        }
        evidence
    }

    pub fn is_empty(&self) -> bool {
        self.insurance.is_none() && self.medical_record.is_none()
    }
}
