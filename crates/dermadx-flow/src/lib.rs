//! The diagnostic conversation: prompts, defensive parsing of the
//! text-generation service's replies, and the stages that move a
//! [`dermadx_core::DiagnosticSession`] from raw inputs to a treatment plan.

pub mod aggregate;
pub mod answers;
pub mod chat;
pub mod flow;
pub mod followup;
pub mod parse;
pub mod predictor;
pub mod prompts;
pub mod resolver;
pub mod treatment;

pub use aggregate::aggregate;
pub use answers::{collect_answers, fill_answers};
pub use chat::ask_health_question;
pub use flow::DiagnosticFlow;
pub use followup::generate_followups;
pub use parse::{ParsedCandidates, missing_sections, parse_candidates};
pub use predictor::predict_from_text;
pub use prompts::{TREATMENT_FALLBACK, TREATMENT_SECTIONS};
pub use resolver::{UNRESOLVED_DISEASE, resolve_final_disease, resolve_from_predictions};
pub use treatment::{generate_treatment, plan_or_fallback};
