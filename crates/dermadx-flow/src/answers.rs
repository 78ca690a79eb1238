//! Answer collection for follow-up questions.
//!
//! The question/answer I/O belongs to the caller (terminal prompt, HTTP
//! body); these helpers only guarantee that every question ends up with an
//! entry, using [`NO_ANSWER`] for anything left blank.

use dermadx_core::{Answers, NO_ANSWER};

/// Ask each question through `ask` and record one answer per question.
///
/// `None` or a blank reply records [`NO_ANSWER`].
pub fn collect_answers<F>(questions: &[String], mut ask: F) -> Answers
where
    F: FnMut(&str) -> Option<String>,
{
    questions
        .iter()
        .map(|q| {
            let answer = ask(q)
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| NO_ANSWER.to_string());
            (q.clone(), answer)
        })
        .collect()
}

/// Complete a caller-supplied answer set against `questions`.
///
/// Answers to questions that were never asked are dropped.
pub fn fill_answers(questions: &[String], provided: &Answers) -> Answers {
    collect_answers(questions, |q| provided.get(q).map(str::to_string))
}
