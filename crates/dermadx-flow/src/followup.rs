use dermadx_core::{Candidate, DiagnosisError};
use dermadx_llm::TextGenerator;
use tracing::info;

use crate::parse::parse_questions;
use crate::prompts::followup_prompt;

/// Ask for 3–5 clarifying questions about `candidates`.
///
/// The count is requested, not enforced: whatever non-blank lines come back
/// are returned in order.
pub async fn generate_followups(
    generator: &dyn TextGenerator,
    candidates: &[Candidate],
) -> Result<Vec<String>, DiagnosisError> {
    let raw = generator.generate(&followup_prompt(candidates)).await?;
    let questions = parse_questions(&raw);
    info!(count = questions.len(), "follow-up questions generated");
    Ok(questions)
}
