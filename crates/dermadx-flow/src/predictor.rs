//! Text-derived candidate diagnoses.

use dermadx_core::{Candidate, DiagnosisError};
use dermadx_llm::TextGenerator;
use tracing::{info, warn};

use crate::parse::parse_candidates;
use crate::prompts::text_prediction_prompt;

/// Ask the service for the top candidate diseases matching `description`.
///
/// A transport failure is returned as `ServiceUnavailable`. An unusable
/// response degrades to an empty list.
pub async fn predict_from_text(
    generator: &dyn TextGenerator,
    description: &str,
) -> Result<Vec<Candidate>, DiagnosisError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(DiagnosisError::MissingInput);
    }

    let parsed = match generator.generate(&text_prediction_prompt(description)).await {
        Ok(raw) => parse_candidates(&raw),
        Err(e) => Err(DiagnosisError::from(e)),
    };

    match parsed {
        Ok(parsed) => {
            if parsed.rejected > 0 {
                warn!(rejected = parsed.rejected, "dropped unusable candidate entries");
            }
            info!(count = parsed.candidates.len(), "text candidates predicted");
            Ok(parsed.candidates)
        }
        Err(DiagnosisError::MalformedResponse(reason)) => {
            warn!(%reason, "text prediction unusable, continuing without text candidates");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
