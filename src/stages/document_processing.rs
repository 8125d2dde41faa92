use anyhow::{Context, Result};
use tracing::info;

use crate::heuristics::extract_document;
use crate::io::read_document_text;
use crate::models::{DocumentRef, DocumentResult};

use super::BlockingStage;

/// Classify one document from its OCR text and extract its fields
pub fn process_document(document: &DocumentRef) -> Result<DocumentResult> {
    let text = read_document_text(document.path())
        .with_context(|| format!("Document processing failed for {}", document))?;

    let result = extract_document(&text);
    info!(
        "Document {}: {} (confidence {:.2}, {} warnings)",
        document,
        result.document_type,
        result.confidence,
        result.warnings.len()
    );

    Ok(result)
}

/// Document Processing stage backed by OCR text files
pub fn document_processing_stage() -> BlockingStage<DocumentRef, DocumentResult> {
    BlockingStage::new(|document: DocumentRef| process_document(&document))
}
