//! Per-interaction diagnostic session.
//!
//! A [`DiagnosticSession`] threads candidates, follow-up questions, answers
//! and final outputs through the pipeline. It is owned by the caller and
//! moves forward through [`Stage`]s only; a new interaction starts a new
//! session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::candidate::Candidate;
use crate::error::SessionError;

/// Recorded for a question the user left blank.
pub const NO_ANSWER: &str = "No answer provided";

/// How the inputs for a session were captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "Image/Text")]
    ImageText,
    #[serde(rename = "Live AR")]
    LiveAr,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImageText => "Image/Text",
            Self::LiveAr => "Live AR",
        }
    }
}

/// Pipeline position of a session. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    InputsReceived,
    CandidatesAggregated,
    QuestionsPending,
    AnswersCollected,
    FinalDiseaseResolved,
    TreatmentReady,
}

/// Question → answer pairs, kept in question order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers(Vec<(String, String)>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the answer for `question`.
    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let question = question.into();
        let answer = answer.into();
        match self.0.iter_mut().find(|(q, _)| *q == question) {
            Some(entry) => entry.1 = answer,
            None => self.0.push((question, answer)),
        }
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(q, _)| q == question)
            .map(|(_, a)| a.as_str())
    }

    pub fn contains(&self, question: &str) -> bool {
        self.get(question).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Pretty JSON object for inclusion in a prompt.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<Q: Into<String>, A: Into<String>> FromIterator<(Q, A)> for Answers {
    fn from_iter<I: IntoIterator<Item = (Q, A)>>(iter: I) -> Self {
        let mut answers = Answers::new();
        for (q, a) in iter {
            answers.insert(q, a);
        }
        answers
    }
}

impl Serialize for Answers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (q, a) in &self.0 {
            map.serialize_entry(q, a)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Answers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AnswersVisitor;

        impl<'de> Visitor<'de> for AnswersVisitor {
            type Value = Answers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of question to answer text")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Answers, M::Error> {
                let mut answers = Answers::new();
                while let Some((q, a)) = access.next_entry::<String, String>()? {
                    answers.insert(q, a);
                }
                Ok(answers)
            }
        }

        deserializer.deserialize_map(AnswersVisitor)
    }
}

/// Mutable state for one diagnostic interaction.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSession {
    mode: Mode,
    stage: Stage,
    started_at: DateTime<Utc>,
    candidates: Vec<Candidate>,
    followup_questions: Vec<String>,
    answers: Answers,
    final_disease: Option<String>,
    treatment: Option<String>,
}

impl DiagnosticSession {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            stage: Stage::Idle,
            started_at: Utc::now(),
            candidates: Vec::new(),
            followup_questions: Vec::new(),
            answers: Answers::new(),
            final_disease: None,
            treatment: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn followup_questions(&self) -> &[String] {
        &self.followup_questions
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn final_disease(&self) -> Option<&str> {
        self.final_disease.as_deref()
    }

    pub fn treatment(&self) -> Option<&str> {
        self.treatment.as_deref()
    }

    /// `Idle → InputsReceived`.
    pub fn accept_inputs(&mut self) -> Result<(), SessionError> {
        self.advance(Stage::Idle, Stage::InputsReceived)
    }

    /// `InputsReceived → CandidatesAggregated`.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) -> Result<(), SessionError> {
        self.advance(Stage::InputsReceived, Stage::CandidatesAggregated)?;
        self.candidates = candidates;
        Ok(())
    }

    /// `CandidatesAggregated → QuestionsPending`.
    ///
    /// With no questions there is nothing to answer, so the session moves
    /// straight on to `AnswersCollected` with an empty answer set.
    pub fn set_questions(&mut self, questions: Vec<String>) -> Result<(), SessionError> {
        self.advance(Stage::CandidatesAggregated, Stage::QuestionsPending)?;
        if questions.is_empty() {
            self.stage = Stage::AnswersCollected;
        }
        self.followup_questions = questions;
        Ok(())
    }

    /// `QuestionsPending → AnswersCollected`.
    ///
    /// Every follow-up question must have an entry in `answers`.
    pub fn record_answers(&mut self, answers: Answers) -> Result<(), SessionError> {
        self.expect(Stage::QuestionsPending)?;
        let missing = self
            .followup_questions
            .iter()
            .filter(|q| !answers.contains(q))
            .count();
        if missing > 0 {
            return Err(SessionError::UnansweredQuestions(missing));
        }
        self.answers = answers;
        self.stage = Stage::AnswersCollected;
        Ok(())
    }

    /// `AnswersCollected → FinalDiseaseResolved`.
    pub fn resolve(&mut self, disease: impl Into<String>) -> Result<(), SessionError> {
        self.advance(Stage::AnswersCollected, Stage::FinalDiseaseResolved)?;
        self.final_disease = Some(disease.into());
        Ok(())
    }

    /// `FinalDiseaseResolved → TreatmentReady`.
    pub fn attach_treatment(&mut self, treatment: impl Into<String>) -> Result<(), SessionError> {
        self.advance(Stage::FinalDiseaseResolved, Stage::TreatmentReady)?;
        self.treatment = Some(treatment.into());
        Ok(())
    }

    fn expect(&self, expected: Stage) -> Result<(), SessionError> {
        if self.stage != expected {
            return Err(SessionError::OutOfOrder {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    fn advance(&mut self, expected: Stage, next: Stage) -> Result<(), SessionError> {
        self.expect(expected)?;
        tracing::debug!(from = ?expected, to = ?next, "session stage advanced");
        self.stage = next;
        Ok(())
    }
}
