use dermadx_core::DiagnosisError;
use dermadx_llm::TextGenerator;
use tracing::info;

use crate::parse::plain_text;
use crate::prompts::health_chat_prompt;

/// Short women's-health answer (one or two sentences). Off-topic questions
/// are declined by the service itself.
pub async fn ask_health_question(
    generator: &dyn TextGenerator,
    question: &str,
) -> Result<String, DiagnosisError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(DiagnosisError::MissingInput);
    }

    let raw = generator.generate(&health_chat_prompt(question)).await?;
    let answer = plain_text(&raw, "health answer")?;
    info!(chars = answer.len(), "health question answered");
    Ok(answer)
}
