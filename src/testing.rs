//! Test doubles shared by stage and orchestrator tests.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::llm::{ReasoningClient, CARE_PLAN_SYSTEM_PROMPT, SYMPTOM_SYSTEM_PROMPT, TRIAGE_SYSTEM_PROMPT};

type Responder = dyn Fn(&str, &str) -> Result<String> + Send + Sync;

/// Reasoning client whose replies come from a closure; records every prompt
pub struct ScriptedClient {
    respond: Box<Responder>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn new(respond: impl Fn(&str, &str) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Same reply for every prompt
    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_, _| Ok(reply.clone()))
    }

    /// Every call fails as if the service were unreachable
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_, _| Err(anyhow::anyhow!(message.clone())))
    }

    /// Routes by system prompt: a symptom reply, a triage reply and plain
    /// care-plan text.
    pub fn clinic(symptom_reply: &str, triage_reply: &str) -> Self {
        let symptom_reply = symptom_reply.to_string();
        let triage_reply = triage_reply.to_string();
        Self::new(move |system, user| {
            if system == SYMPTOM_SYSTEM_PROMPT {
                Ok(symptom_reply.clone())
            } else if system == TRIAGE_SYSTEM_PROMPT {
                Ok(triage_reply.clone())
            } else if system == CARE_PLAN_SYSTEM_PROMPT && user.starts_with("Audience: the patient") {
                Ok(PATIENT_TEXT.to_string())
            } else if system == CARE_PLAN_SYSTEM_PROMPT {
                Ok("Assessment: rule out cardiac etiology.".to_string())
            } else {
                anyhow::bail!("unexpected system prompt")
            }
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

const PATIENT_TEXT: &str = "Thank you for coming in today, we are taking good care of you.\n\nWhat to expect:\n- A nurse will check your vitals\n- A doctor will examine you\n\nHow to prepare:\n- Bring your medication list";

#[async_trait]
impl ReasoningClient for ScriptedClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((system.to_string(), user.to_string()));
        }
        (self.respond)(system, user)
    }
}
