use crate::models::{Language, SymptomDuration, SymptomText};

/// Instruction telling the model which language to answer in.
pub fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::English => "Respond in English",
        Language::Arabic => "Respond in Arabic",
        Language::Dari => "Respond in Dari (Afghan Persian)",
    }
}

/// Build the triage prompt sent to the advice provider.
pub fn build_triage_prompt(
    symptoms: &SymptomText,
    language: Language,
    duration: SymptomDuration,
) -> String {
    format!(
        r#"You are a medical triage AI assistant specifically designed for refugee healthcare.

CRITICAL INSTRUCTIONS:
- Provide brief, clear, culturally-sensitive medical guidance
- NEVER diagnose or replace professional medical care
- Focus on triage: emergency, urgent, or routine care needed
- Be empathetic to refugee trauma and stress
- {instruction}

SYMPTOMS: {symptoms}
DURATION: {duration}

RESPONSE FORMAT (JSON):
{{
  "advice": "brief medical guidance in requested language",
  "severity": "low|medium|high",
  "confidence": 0.8,
  "emergencyActions": ["immediate actions if high severity"],
  "followUp": "when to seek additional care"
}}

Context: User is in refugee setting with limited healthcare access. Prioritize safety and clear guidance."#,
        instruction = language_instruction(language),
        symptoms = symptoms.joined(", "),
        duration = duration.as_str(),
    )
}
