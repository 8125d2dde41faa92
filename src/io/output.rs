use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::CaseRecord;

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable report of a finished case
pub struct CaseReport<'a> {
    record: &'a CaseRecord,
}

impl<'a> CaseReport<'a> {
    pub fn new(record: &'a CaseRecord) -> Self {
        Self { record }
    }

    pub fn format(&self) -> String {
        let record = self.record;
        let mut output = String::new();

        output.push_str(&format!("Case {}\n", record.case_id));
        output.push_str(&format!("Status: {} ({}%)\n", record.stage, record.progress));
        if let Some(finished) = record.finished_at {
            let elapsed = finished - record.created_at;
            output.push_str(&format!("Elapsed: {} ms\n", elapsed.num_milliseconds()));
        }
        for error in &record.errors {
            output.push_str(&format!("Error: {}\n", error));
        }

        if let Some(voice) = &record.voice_result {
            output.push_str(&format!(
                "\nVoice: {} urgency ({:.2}), {:.1}s\n",
                voice.urgency_level, voice.urgency_score, voice.duration_seconds
            ));
        }

        if let Some(symptoms) = &record.symptom_result {
            output.push_str("\nSymptoms:\n");
            for s in &symptoms.symptoms {
                output.push_str(&format!("  - {} ({}, {})\n", s.name, s.severity, s.duration));
            }
        }

        if let Some(documents) = &record.document_results {
            output.push_str(&format!("\nDocuments: {}\n", documents.len()));
            for (reference, result) in record.documents.iter().zip(documents) {
                output.push_str(&format!(
                    "  - {}: {} ({:.2})\n",
                    reference, result.document_type, result.confidence
                ));
            }
        }

        if let Some(triage) = &record.triage_decision {
            output.push_str(&format!(
                "\nTriage: {} -> {} (confidence {:.2})\n",
                triage.urgency_level, triage.disposition, triage.confidence
            ));
            for flag in &triage.red_flags {
                output.push_str(&format!("  RED FLAG: {}\n", flag.symptom));
            }
            for concern in &triage.safety_concerns {
                output.push_str(&format!("  Safety: {}\n", concern));
            }
            output.push_str(&format!("  Wait: {}\n", triage.estimated_wait_time));
        }

        if let Some(plan) = &record.care_plan {
            output.push_str(&format!("\n{}\n", plan.patient_instructions.welcome_message));
        }

        output
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseRequest, Severity, Symptom, SymptomAnalysis};

    #[test]
    fn test_write_json_round_trips_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        let record = CaseRecord::new(CaseRequest::new("case-1"));

        write_json(&record, &path).unwrap();
        let loaded: CaseRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.case_id, "case-1");
    }

    #[test]
    fn test_report_lists_symptoms_and_errors() {
        let mut record = CaseRecord::new(CaseRequest::new("case-2"));
        record.set_symptom_result(SymptomAnalysis::new(
            vec![Symptom::new("cough", Severity::Mild, "3 days")],
            0.9,
        ));
        record.fail("Processing error: boom");

        let text = CaseReport::new(&record).format();
        assert!(text.contains("Status: failed (0%)"));
        assert!(text.contains("Error: Processing error: boom"));
        assert!(text.contains("  - cough (mild, 3 days)"));
    }
}
