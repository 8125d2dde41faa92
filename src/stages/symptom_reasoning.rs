use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm::{build_symptom_prompt, parse_reply, ReasoningClient, SymptomReply, SYMPTOM_SYSTEM_PROMPT};
use crate::models::{SymptomAnalysis, SymptomReasoningInput};

use super::Stage;

/// Symptom Reasoning stage: extracts structured symptoms from the transcript
pub struct SymptomReasoningStage {
    client: Arc<dyn ReasoningClient>,
}

impl SymptomReasoningStage {
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Stage<SymptomReasoningInput, SymptomAnalysis> for SymptomReasoningStage {
    async fn invoke(&self, input: SymptomReasoningInput) -> Result<SymptomAnalysis> {
        let prompt = build_symptom_prompt(&input);
        let reply = self
            .client
            .complete(SYMPTOM_SYSTEM_PROMPT, &prompt)
            .await
            .context("Symptom reasoning request failed")?;

        let analysis = match parse_reply::<SymptomReply>(&reply) {
            Ok(parsed) => parsed.into_analysis(),
            Err(e) => {
                warn!("Symptom reply unusable, degrading: {:#}", e);
                SymptomAnalysis::degraded()
            }
        };

        info!(
            "Symptom reasoning: {} symptoms (confidence {:.2})",
            analysis.symptoms.len(),
            analysis.confidence
        );

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, UrgencyContext};
    use crate::testing::ScriptedClient;

    fn input() -> SymptomReasoningInput {
        SymptomReasoningInput {
            transcript: "Chest tightness for two days, I take lisinopril".to_string(),
            urgency_context: UrgencyContext::empty(),
        }
    }

    #[tokio::test]
    async fn test_parses_reply() {
        let client = ScriptedClient::replying(
            r#"```json
            {"symptoms": [{"name": "chest pain", "severity": "moderate", "duration": "2 days",
                           "characteristics": ["tightness"]}],
             "current_medications": ["lisinopril"], "confidence_score": 0.9}
            ```"#,
        );
        let stage = SymptomReasoningStage::new(Arc::new(client));

        let analysis = stage.invoke(input()).await.unwrap();
        assert_eq!(analysis.symptoms.len(), 1);
        assert_eq!(analysis.symptoms[0].severity, Severity::Moderate);
        assert_eq!(analysis.medications, vec!["lisinopril"]);
        assert_eq!(analysis.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_unparseable_reply_degrades() {
        let stage = SymptomReasoningStage::new(Arc::new(ScriptedClient::replying(
            "Sorry, I can't help with that.",
        )));

        let analysis = stage.invoke(input()).await.unwrap();
        assert!(analysis.symptoms.is_empty());
        assert_eq!(analysis.confidence, SymptomAnalysis::DEGRADED_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_transport_error_is_hard_fault() {
        let stage = SymptomReasoningStage::new(Arc::new(ScriptedClient::failing("connection reset")));
        let err = stage.invoke(input()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("connection reset"));
    }
}
