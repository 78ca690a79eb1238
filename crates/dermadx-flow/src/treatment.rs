use dermadx_core::DiagnosisError;
use dermadx_llm::TextGenerator;
use tracing::{info, warn};

use crate::parse::{missing_sections, plain_text};
use crate::prompts::{TREATMENT_FALLBACK, TREATMENT_SECTIONS, treatment_prompt};

/// Request a structured treatment plan for `disease`.
pub async fn generate_treatment(
    generator: &dyn TextGenerator,
    disease: &str,
) -> Result<String, DiagnosisError> {
    let raw = generator.generate(&treatment_prompt(disease)).await?;
    let plan = plain_text(&raw, "treatment plan")?;

    let missing = missing_sections(&plan, &TREATMENT_SECTIONS);
    if !missing.is_empty() {
        warn!(?missing, "treatment plan lacks expected sections");
    }
    info!(disease, chars = plan.len(), "treatment plan generated");
    Ok(plan)
}

/// Like [`generate_treatment`], but any failure yields [`TREATMENT_FALLBACK`].
pub async fn plan_or_fallback(generator: &dyn TextGenerator, disease: &str) -> String {
    match generate_treatment(generator, disease).await {
        Ok(plan) => plan,
        Err(e) => {
            warn!(error = %e, "treatment plan unavailable, using fallback");
            TREATMENT_FALLBACK.to_string()
        }
    }
}
