use crate::models::{
    CarePlanInput, Contradiction, DocumentEvidence, RedFlag, Symptom, SymptomReasoningInput,
    TriageInput,
};

/// System prompt for symptom extraction
pub const SYMPTOM_SYSTEM_PROMPT: &str = r#"You are an expert medical assistant specializing in patient intake and symptom analysis. Your role is to:

1. Extract all symptoms mentioned with complete details (severity, duration, location, characteristics)
2. Identify medical history, medications, and allergies
3. Recognize missing critical information based on the symptoms described
4. Generate focused, medically-relevant clarifying questions
5. Flag any red flag symptoms that indicate high urgency

Critical thinking rules:
- Chest pain: ask about radiation and cardiac risk factors
- Abdominal pain: ask about onset and relationship to eating
- Headache: ask about sudden onset and whether it is the worst headache ever
- Shortness of breath: ask about onset and relationship to exertion
- Fever: ask about duration and associated symptoms

Output MUST be a single JSON object matching the schema in the request."#;

/// System prompt for clinical triage reasoning
pub const TRIAGE_SYSTEM_PROMPT: &str = r#"You are an emergency triage clinician. Assign an urgency level using these definitions:

- immediate: life-threatening, needs the emergency department now
- urgent: needs care within hours
- semi_urgent: needs care within 24 hours
- non_urgent: can wait for a routine appointment

When uncertain, triage UP. Red flags and contradictions listed in the request were found by deterministic rules and must be taken into account.

Output MUST be a single JSON object matching the schema in the request."#;

/// System prompt for both care plan texts
pub const CARE_PLAN_SYSTEM_PROMPT: &str = r#"You are a clinical documentation assistant. Write for the audience named in the request. Never invent findings that are not in the provided data."#;

const SYMPTOM_SCHEMA: &str = r#"{
  "symptoms": [
    {
      "name": "symptom name",
      "severity": "mild/moderate/severe/critical",
      "duration": "time period",
      "location": "body location if applicable",
      "characteristics": ["descriptive terms"],
      "triggers": ["what makes it worse"],
      "relievers": ["what makes it better"]
    }
  ],
  "medical_history": ["relevant conditions"],
  "current_medications": ["medication names"],
  "allergies": ["known allergies"],
  "clarifying_questions": ["specific question based on symptoms"],
  "missing_critical_info": ["what critical information is missing"],
  "red_flags": ["concerning symptoms requiring immediate attention"],
  "confidence_score": 0.95
}"#;

const TRIAGE_SCHEMA: &str = r#"{
  "urgency_assessment": "immediate/urgent/semi_urgent/non_urgent",
  "confidence": 0.95,
  "clinical_reasoning": "explanation of the triage decision",
  "differential_diagnosis": ["most likely conditions"],
  "recommended_disposition": "where the patient should go",
  "recommended_tests": ["tests to order"],
  "safety_concerns": ["specific concerns"],
  "specialist_needed": "specialty if applicable"
}"#;

/// Build the user prompt for symptom extraction
pub fn build_symptom_prompt(input: &SymptomReasoningInput) -> String {
    let mut prompt = String::new();

    let context = &input.urgency_context;
    if !context.is_empty() {
        prompt.push_str("## Voice Analysis Context\n");
        if let Some(level) = context.urgency_level {
            prompt.push_str(&format!("- Urgency level: {}\n", level));
        }
        if let Some(emotions) = context.emotions {
            prompt.push_str(&format!(
                "- Emotions: stress {:.2}, pain {:.2}, anxiety {:.2}, calm {:.2}\n",
                emotions.stress, emotions.pain, emotions.anxiety, emotions.calm
            ));
        }
        if let Some(duration) = context.duration_seconds {
            prompt.push_str(&format!("- Recording length: {:.1}s\n", duration));
        }
        prompt.push('\n');
    }

    prompt.push_str("## Patient Transcript\n");
    prompt.push_str(&format!("\"{}\"\n\n", input.transcript.trim()));
    prompt.push_str("## Output Schema\n");
    prompt.push_str(SYMPTOM_SCHEMA);
    prompt.push_str("\n\nBe thorough but concise. Focus on medically relevant information.");

    prompt
}

/// Build the user prompt for triage reasoning
pub fn build_triage_prompt(
    input: &TriageInput,
    red_flags: &[RedFlag],
    contradictions: &[Contradiction],
) -> String {
    let mut prompt = String::from("# Patient Presentation\n\n");

    prompt.push_str("## Voice Analysis\n");
    prompt.push_str(&format!("- Urgency level: {}\n", input.voice.urgency_label()));
    let emotions = &input.voice.emotions;
    prompt.push_str(&format!(
        "- Emotions: stress {:.2}, pain {:.2}, anxiety {:.2}\n\n",
        emotions.stress, emotions.pain, emotions.anxiety
    ));

    prompt.push_str("## Symptoms\n");
    prompt.push_str(&format_symptoms(&input.symptoms));
    prompt.push('\n');

    prompt.push_str(&format!("Medical history: {}\n", format_list(&input.medical_history)));
    prompt.push_str(&format!("Current medications: {}\n", format_list(&input.medications)));
    prompt.push_str(&format!("Allergies: {}\n\n", format_list(&input.allergies)));

    prompt.push_str(&format!("## Red Flags Identified: {}\n", red_flags.len()));
    for flag in red_flags {
        prompt.push_str(&format!("- {}: {}\n", flag.symptom, flag.reasoning));
    }
    prompt.push('\n');

    prompt.push_str(&format!("## Contradictions Found: {}\n", contradictions.len()));
    for c in contradictions {
        prompt.push_str(&format!("- {} vs {}\n", c.finding, c.conflict));
    }
    prompt.push('\n');

    prompt.push_str("## Document Data\n");
    prompt.push_str(&format_documents(&input.documents));
    prompt.push_str("\n## Output Schema\n");
    prompt.push_str(TRIAGE_SCHEMA);

    prompt
}

/// Build the prompt for the physician-facing summary
pub fn build_doctor_summary_prompt(input: &CarePlanInput) -> String {
    let triage = &input.triage;
    let red_flags: Vec<&str> = triage.red_flags.iter().map(|f| f.symptom.as_str()).collect();

    format!(
        "Audience: treating physician.\n\
         Generate a concise, professional clinical summary in SOAP format.\n\n\
         ## Patient Data\n{}\
         Medical history: {}\nMedications: {}\nAllergies: {}\n\n\
         ## Triage Assessment\n\
         - Urgency: {}\n- Disposition: {}\n- Red flags: {}\n- Clinical reasoning: {}\n\n\
         Include chief complaint, HPI, PMH, medications, allergies, assessment with RED FLAGS \
         in caps, differential diagnosis, recommended workup and disposition plan.",
        format_symptoms(&input.symptoms),
        format_list(&input.medical_history),
        format_list(&input.medications),
        format_list(&input.allergies),
        triage.urgency_level,
        triage.disposition,
        format_list(&red_flags),
        triage.reasoning,
    )
}

/// Build the prompt for patient-facing instructions
pub fn build_patient_instructions_prompt(input: &CarePlanInput) -> String {
    let names: Vec<&str> = input.symptoms.iter().map(|s| s.name.as_str()).collect();

    format!(
        "Audience: the patient.\n\
         Generate clear, reassuring, patient-friendly instructions for someone with:\n\n\
         Symptoms: {}\nUrgency: {}\nWhere to go: {}\nEstimated wait time: {}\n\n\
         Start with a warm welcome message on the first line. Then give a \"What to expect\" \
         section and a \"How to prepare\" section, each as a list of lines starting with '-'.\n\
         Use simple, non-medical language.",
        format_list(&names),
        input.triage.urgency_level,
        input.triage.disposition,
        input.triage.estimated_wait_time,
    )
}

fn format_symptoms(symptoms: &[Symptom]) -> String {
    if symptoms.is_empty() {
        return "- none reported\n".to_string();
    }

    let mut out = String::new();
    for s in symptoms {
        out.push_str(&format!("- {} ({}, {})", s.name, s.severity, s.duration));
        if let Some(location) = &s.location {
            out.push_str(&format!(" at {}", location));
        }
        if !s.characteristics.is_empty() {
            out.push_str(&format!(": {}", s.characteristics.join(", ")));
        }
        out.push('\n');
    }
    out
}

fn format_documents(documents: &DocumentEvidence) -> String {
    if documents.is_empty() {
        return "No documents provided\n".to_string();
    }

    let mut out = String::new();
    if let Some(insurance) = &documents.insurance {
        out.push_str(&format!(
            "- Insurance: {} ({})\n",
            insurance.provider, insurance.coverage_status
        ));
    }
    if let Some(record) = &documents.medical_record {
        out.push_str(&format!(
            "- Medical record conditions: {}\n- Medical record medications: {}\n- Medical record allergies: {}\n",
            format_list(&record.medical_conditions),
            format_list(&record.medications),
            format_list(&record.allergies)
        ));
    }
    out
}

fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", ")
    }
}
