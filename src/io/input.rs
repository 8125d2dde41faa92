use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::AcousticFeatures;

/// Output of the external speech front end: transcript plus acoustic
/// features for one recording.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognitionFile {
    pub transcript: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub features: AcousticFeatures,
}

fn default_confidence() -> f64 {
    0.9
}

/// Parse a recognition JSON file
pub fn read_recognition_file(path: &Path) -> Result<RecognitionFile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_recognition_json(&content)
        .with_context(|| format!("Failed to parse recognition file: {:?}", path))
}

/// Parse recognition JSON from a string
pub fn parse_recognition_json(json: &str) -> Result<RecognitionFile> {
    let file: RecognitionFile =
        serde_json::from_str(json).context("Failed to parse recognition JSON")?;
    if file.transcript.trim().is_empty() {
        anyhow::bail!("Recognition file has an empty transcript");
    }
    Ok(file)
}

/// Read the OCR text of a document
pub fn read_document_text(path: &Path) -> Result<String> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    if text.trim().is_empty() {
        anyhow::bail!("Document {:?} contains no text", path);
    }
    Ok(text)
}
