//! Card-style terminal output for candidates, sessions, and treatment plans.

use dermadx_core::{Candidate, DiagnosticSession};

const LABEL_WIDTH: usize = 26;

/// Print a titled list of candidates with their confidence.
pub fn print_candidates(title: &str, candidates: &[Candidate]) {
    print!("{}", candidates_card(title, candidates));
}

/// Print the outcome of a finished diagnostic session.
pub fn print_session(session: &DiagnosticSession) {
    print!("{}", session_card(session));
}

pub fn print_treatment(disease: &str, plan: &str) {
    println!("=== {disease} ===");
    println!();
    println!("{plan}");
}

fn candidates_card(title: &str, candidates: &[Candidate]) -> String {
    let mut out = format!("{title}\n");
    if candidates.is_empty() {
        out.push_str("  (none)\n");
    }
    for c in candidates {
        out.push_str(&format!(
            "  {:<width$} {:>5.1}%\n",
            c.label,
            c.confidence * 100.0,
            width = LABEL_WIDTH
        ));
    }
    out.push('\n');
    out
}

fn session_card(session: &DiagnosticSession) -> String {
    let disease = session.final_disease().unwrap_or("(unresolved)");
    let mut out = format!("=== {disease} ===\n\n");

    out.push_str("Session\n");
    out.push_str(&row("mode", session.mode().as_str()));
    out.push_str(&row(
        "started",
        &session.started_at().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ));
    out.push('\n');

    out.push_str(&candidates_card("Candidates", session.candidates()));

    if !session.answers().is_empty() {
        out.push_str("Follow-up\n");
        for (question, answer) in session.answers().iter() {
            out.push_str(&format!("  Q: {question}\n  A: {answer}\n"));
        }
        out.push('\n');
    }

    if let Some(plan) = session.treatment() {
        out.push_str("Treatment\n");
        for line in plan.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

fn row(label: &str, value: &str) -> String {
    format!("  {label:<width$} {value}\n", width = LABEL_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dermadx_core::{Answers, Mode, NO_ANSWER};

    #[test]
    fn candidates_listed_with_percentages() {
        let card = candidates_card(
            "Text Predictions",
            &[Candidate::new("Eczema", 0.8), Candidate::new("Psoriasis", 0.65)],
        );
        let lines: Vec<_> = card.lines().collect();
        assert_eq!(lines[0], "Text Predictions");
        assert!(lines[1].starts_with("  Eczema"));
        assert!(lines[1].ends_with(" 80.0%"));
        assert!(lines[2].ends_with(" 65.0%"));
    }

    #[test]
    fn empty_candidates_say_none() {
        assert!(candidates_card("Candidates", &[]).contains("(none)"));
    }

    #[test]
    fn session_card_shows_answers_and_plan() {
        let mut s = DiagnosticSession::new(Mode::LiveAr);
        s.accept_inputs().unwrap();
        s.set_candidates(vec![Candidate::new("Warts", 0.77)]).unwrap();
        s.set_questions(vec!["Is it painful?".into()]).unwrap();
        let answers: Answers = [("Is it painful?", NO_ANSWER)].into_iter().collect();
        s.record_answers(answers).unwrap();
        s.resolve("Warts").unwrap();
        s.attach_treatment("**Diagnosis:** Warts\n**Symptoms:**").unwrap();

        let card = session_card(&s);
        assert!(card.starts_with("=== Warts ===\n"));
        assert!(card.contains("Live AR"));
        assert!(card.contains("  A: No answer provided"));
        assert!(card.contains("  **Symptoms:**"));
    }
}
