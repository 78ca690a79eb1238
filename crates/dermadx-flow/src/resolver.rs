use dermadx_core::{Answers, Candidate, DiagnosisError, candidates_json};
use dermadx_llm::TextGenerator;
use serde_json::Value;
use tracing::info;

use crate::parse::parse_disease;
use crate::prompts::final_diagnosis_prompt;

/// Final disease when there is nothing to reason from.
pub const UNRESOLVED_DISEASE: &str = "Unknown";

/// Ask the service to settle on a single disease name.
///
/// The returned name is accepted verbatim (trimmed); it need not match any
/// classifier label. With no candidates and no answers the service is not
/// called and [`UNRESOLVED_DISEASE`] is returned.
pub async fn resolve_final_disease(
    generator: &dyn TextGenerator,
    candidates: &[Candidate],
    answers: &Answers,
) -> Result<String, DiagnosisError> {
    if candidates.is_empty() && answers.is_empty() {
        info!("nothing to resolve from, final disease unknown");
        return Ok(UNRESOLVED_DISEASE.to_string());
    }
    request_disease(generator, &candidates_json(candidates), answers).await
}

/// Like [`resolve_final_disease`], for predictions in a client-defined JSON
/// shape. The JSON is embedded in the prompt verbatim.
pub async fn resolve_from_predictions(
    generator: &dyn TextGenerator,
    predictions: &Value,
    answers: &Answers,
) -> Result<String, DiagnosisError> {
    if is_empty_json(predictions) && answers.is_empty() {
        info!("nothing to resolve from, final disease unknown");
        return Ok(UNRESOLVED_DISEASE.to_string());
    }
    let rendered = serde_json::to_string_pretty(predictions)
        .map_err(|e| DiagnosisError::MalformedResponse(e.to_string()))?;
    request_disease(generator, &rendered, answers).await
}

async fn request_disease(
    generator: &dyn TextGenerator,
    predictions: &str,
    answers: &Answers,
) -> Result<String, DiagnosisError> {
    let raw = generator
        .generate(&final_diagnosis_prompt(predictions, answers))
        .await?;
    let disease = parse_disease(&raw)?;
    info!(disease = %disease, "final disease resolved");
    Ok(disease)
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dermadx_core::NO_ANSWER;
    use dermadx_llm::ScriptedGenerator;

    #[tokio::test]
    async fn reply_trimmed_and_accepted_verbatim() {
        let g = ScriptedGenerator::new().reply("  Perioral dermatitis (likely)\n");
        let answers: Answers = [("Q1?", NO_ANSWER)].into_iter().collect();
        let d = resolve_final_disease(&g, &[Candidate::new("Eczema", 0.8)], &answers)
            .await
            .unwrap();
        assert_eq!(d, "Perioral dermatitis (likely)");
    }

    #[tokio::test]
    async fn prompt_includes_sentinel_answers() {
        let g = ScriptedGenerator::new().reply("Eczema");
        let answers: Answers = [("Does it itch?", NO_ANSWER)].into_iter().collect();
        resolve_final_disease(&g, &[Candidate::new("Eczema", 0.8)], &answers)
            .await
            .unwrap();
        assert!(g.prompts()[0].contains(NO_ANSWER));
    }

    #[tokio::test]
    async fn empty_context_short_circuits() {
        let g = ScriptedGenerator::new();
        let d = resolve_final_disease(&g, &[], &Answers::new()).await.unwrap();
        assert_eq!(d, UNRESOLVED_DISEASE);
        assert_eq!(g.calls(), 0);
    }

    #[tokio::test]
    async fn client_shaped_predictions_reach_the_prompt() {
        let g = ScriptedGenerator::new().reply("Eczema\n");
        let predictions = serde_json::json!({
            "condition": "Eczema",
            "confidence": 80,
            "severity": "mild"
        });
        let answers: Answers = [("Q1?", "yes")].into_iter().collect();
        let d = resolve_from_predictions(&g, &predictions, &answers)
            .await
            .unwrap();
        assert_eq!(d, "Eczema");
        assert!(g.prompts()[0].contains(r#""condition": "Eczema""#));
    }

    #[tokio::test]
    async fn empty_client_predictions_short_circuit() {
        let g = ScriptedGenerator::new();
        for empty in [Value::Null, serde_json::json!({}), serde_json::json!([])] {
            let d = resolve_from_predictions(&g, &empty, &Answers::new())
                .await
                .unwrap();
            assert_eq!(d, UNRESOLVED_DISEASE);
        }
        assert_eq!(g.calls(), 0);
    }

    #[tokio::test]
    async fn blank_reply_is_malformed() {
        let g = ScriptedGenerator::new().reply("\n   \n");
        let err = resolve_final_disease(&g, &[Candidate::new("BKL", 0.2)], &Answers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DiagnosisError::MalformedResponse(_)));
    }
}
