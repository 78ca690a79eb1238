//! Prompt templates for each stage of the diagnostic conversation.

use dermadx_core::{Answers, Candidate, candidates_json};

/// Substituted for the treatment plan when the service call fails.
pub const TREATMENT_FALLBACK: &str =
    "⚠️ Unable to fetch treatment details. Please consult a dermatologist.";

/// Section headings a treatment plan must contain, in order.
pub const TREATMENT_SECTIONS: [&str; 5] = [
    "Diagnosis",
    "Symptoms",
    "Causes",
    "Treatments",
    "When to See a Doctor",
];

const TREATMENT_TEMPLATE: &str = "\
Respond using this exact format. Each section should have **2–3 short bullet points**. \
Keep the explanations **simple, practical, and relevant for a general audience**.

**Diagnosis:** [Short explanation of the disease and how it's usually identified]

**Symptoms:**
• [Common symptom 1]
• [Common symptom 2]
• [Common symptom 3]

**Causes:**
• [Major cause or risk factor]
• [Another common contributing factor]

**Treatments (Ordered):**
• Ayurvedic Solutions: [1–2 natural treatments with brief benefits]
• Home Remedies: [1–2 things people can try at home for relief]
• Non-Prescription Medications: [1–2 OTC products with when to use them]
• Prescription Medications: [1–2 doctor-prescribed options and their purpose]

**When to See a Doctor:**
• [Early warning sign]
• [Progression or worsening symptom]";

pub fn text_prediction_prompt(description: &str) -> String {
    format!(
        "You are a medical expert. Predict the top 5 possible skin diseases based on this description:\n\
         '{description}'\n\
         Return ONLY a JSON array, no markdown fences and no explanation:\n\
         [\n  {{\"disease\": \"Disease Name\", \"score\": 0.8}},\n  \
         {{\"disease\": \"Another Disease\", \"score\": 0.6}}\n]\n\
         Scores are probabilities between 0 and 1."
    )
}

pub fn followup_prompt(candidates: &[Candidate]) -> String {
    format!(
        "Given these possible skin diseases based on text and image inputs:\n\
         {predictions}\n\
         Generate 3-5 follow-up medical questions to refine the final diagnosis.\n\
         Return ONLY plain text questions separated by new lines.",
        predictions = candidates_json(candidates),
    )
}

/// `predictions` is JSON text: normally a candidate list, but any shape a
/// client sent is passed through as-is.
pub fn final_diagnosis_prompt(predictions: &str, answers: &Answers) -> String {
    format!(
        "Based on these AI predictions:\n\
         {predictions}\n\
         And user responses:\n\
         {answers}\n\
         Determine the final skin disease.\n\
         Return ONLY the final disease name in plain text, with no extra commentary.",
        answers = answers.to_json_pretty(),
    )
}

pub fn treatment_prompt(disease: &str) -> String {
    format!(
        "You are a medical assistant. Provide a structured and easy-to-understand treatment plan \
         for the following skin condition:\n\n\
         **Disease:** {disease}\n\n\
         {TREATMENT_TEMPLATE}\n"
    )
}

pub fn health_chat_prompt(question: &str) -> String {
    format!(
        "You are a women's health assistant. A user asked: {question}\n\n\
         Reply with a **short, concise answer (1–2 sentences max)**.\n\
         Focus on:\n\
         • Quick explanation\n\
         • 1–2 key tips\n\
         • When to see a doctor\n\n\
         If the question isn't about women's health, politely decline.\n\
         Return your response in **plain text** only."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_prompt_embeds_description() {
        let p = text_prediction_prompt("itchy red patches for a week");
        assert!(p.contains("'itchy red patches for a week'"));
        assert!(p.contains(r#""disease""#));
        assert!(p.contains("top 5"));
    }

    #[test]
    fn followup_prompt_dumps_candidates_as_json() {
        let p = followup_prompt(&[Candidate::new("Eczema", 0.8)]);
        assert!(p.contains(r#""disease": "Eczema""#));
        assert!(p.contains("3-5"));
    }

    #[test]
    fn final_prompt_includes_answers() {
        let answers: Answers = [("Does it itch?", "yes")].into_iter().collect();
        let predictions = candidates_json(&[Candidate::new("Tinea", 0.5)]);
        let p = final_diagnosis_prompt(&predictions, &answers);
        assert!(p.contains(r#""Does it itch?": "yes""#));
        assert!(p.contains("Tinea"));
    }

    #[test]
    fn treatment_prompt_lists_every_section() {
        let p = treatment_prompt("Psoriasis");
        assert!(p.contains("**Disease:** Psoriasis"));
        for section in TREATMENT_SECTIONS {
            assert!(p.contains(section), "missing {section}");
        }
        for category in [
            "Ayurvedic Solutions",
            "Home Remedies",
            "Non-Prescription Medications",
            "Prescription Medications",
        ] {
            assert!(p.contains(category), "missing {category}");
        }
    }
}
