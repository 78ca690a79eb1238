//! Stage driver for a diagnostic session.
//!
//! [`DiagnosticFlow`] owns only the text-generation handle. Every call takes
//! the caller's [`DiagnosticSession`] and advances it, so one flow can serve
//! any number of concurrent sessions.

use std::sync::Arc;

use dermadx_core::{
    Answers, Candidate, DiagnosisError, DiagnosticSession, Mode, SessionError, Stage,
};
use dermadx_llm::TextGenerator;
use serde_json::Value;
use tracing::info;

use crate::aggregate::aggregate;
use crate::answers::fill_answers;
use crate::followup::generate_followups;
use crate::predictor::predict_from_text;
use crate::resolver::{resolve_final_disease, resolve_from_predictions};
use crate::treatment::plan_or_fallback;

#[derive(Clone)]
pub struct DiagnosticFlow {
    generator: Arc<dyn TextGenerator>,
}

impl DiagnosticFlow {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        &*self.generator
    }

    /// Take the user's inputs through to pending follow-up questions.
    ///
    /// `image` is the classifier's single candidate, computed by the caller.
    /// Whitespace-only text counts as absent; with neither input
    /// `MissingInput` is returned. The session only advances once both
    /// service calls have succeeded, so after any error it is still `Idle`
    /// and the call can be retried.
    pub async fn analyze(
        &self,
        session: &mut DiagnosticSession,
        description: Option<&str>,
        image: Option<Candidate>,
    ) -> Result<(), DiagnosisError> {
        if session.stage() != Stage::Idle {
            return Err(SessionError::OutOfOrder {
                expected: Stage::Idle,
                actual: session.stage(),
            }
            .into());
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        if description.is_none() && image.is_none() {
            return Err(DiagnosisError::MissingInput);
        }

        let text = match description {
            Some(d) => predict_from_text(self.generator(), d).await?,
            None => Vec::new(),
        };
        let candidates = aggregate(text, image);
        let questions = generate_followups(self.generator(), &candidates).await?;

        session.accept_inputs()?;
        session.set_candidates(candidates)?;
        session.set_questions(questions)?;

        info!(
            mode = session.mode().as_str(),
            candidates = session.candidates().len(),
            questions = session.followup_questions().len(),
            "analysis complete"
        );
        Ok(())
    }

    /// Record the user's answers, filling unanswered questions with the
    /// "No answer provided" sentinel.
    ///
    /// A no-op once the session has moved past question collection because
    /// no questions were generated.
    pub fn submit_answers(
        &self,
        session: &mut DiagnosticSession,
        provided: &Answers,
    ) -> Result<(), DiagnosisError> {
        if session.followup_questions().is_empty() && session.stage() == Stage::AnswersCollected {
            return Ok(());
        }
        let answers = fill_answers(session.followup_questions(), provided);
        session.record_answers(answers)?;
        Ok(())
    }

    /// Resolve the final disease and attach its treatment plan.
    ///
    /// Resolution errors propagate. The treatment stage never fails: a
    /// service or parse failure yields the fallback message.
    pub async fn finalize(&self, session: &mut DiagnosticSession) -> Result<(), DiagnosisError> {
        expect_answers(session)?;
        let disease =
            resolve_final_disease(self.generator(), session.candidates(), session.answers())
                .await?;
        self.conclude(session, disease).await
    }

    /// [`Self::finalize`] for predictions the client sent in its own JSON
    /// shape rather than as a candidate list.
    pub async fn finalize_with_predictions(
        &self,
        session: &mut DiagnosticSession,
        predictions: &Value,
    ) -> Result<(), DiagnosisError> {
        expect_answers(session)?;
        let disease =
            resolve_from_predictions(self.generator(), predictions, session.answers()).await?;
        self.conclude(session, disease).await
    }

    async fn conclude(
        &self,
        session: &mut DiagnosticSession,
        disease: String,
    ) -> Result<(), DiagnosisError> {
        session.resolve(disease.clone())?;
        let plan = plan_or_fallback(self.generator(), &disease).await;
        session.attach_treatment(plan)?;
        Ok(())
    }

    /// Rebuild a session whose candidates and answers were held by the
    /// caller between requests, leaving it ready for [`Self::finalize`].
    ///
    /// The answered questions become the session's follow-up questions.
    pub fn resume(
        &self,
        mode: Mode,
        candidates: Vec<Candidate>,
        answers: Answers,
    ) -> Result<DiagnosticSession, DiagnosisError> {
        let mut session = DiagnosticSession::new(mode);
        session.accept_inputs()?;
        session.set_candidates(candidates)?;
        let questions: Vec<String> = answers.iter().map(|(q, _)| q.to_string()).collect();
        session.set_questions(questions)?;
        if !answers.is_empty() {
            self.submit_answers(&mut session, &answers)?;
        }
        Ok(session)
    }
}

fn expect_answers(session: &DiagnosticSession) -> Result<(), DiagnosisError> {
    if session.stage() != Stage::AnswersCollected {
        return Err(SessionError::OutOfOrder {
            expected: Stage::AnswersCollected,
            actual: session.stage(),
        }
        .into());
    }
    Ok(())
}
