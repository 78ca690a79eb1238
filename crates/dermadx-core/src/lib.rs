pub mod candidate;
pub mod clinic;
mod error;
pub mod session;

pub use candidate::{Candidate, candidates_json, round2};
pub use clinic::{ClinicCategory, ClinicRecord, Coordinates};
pub use error::{DiagnosisError, SessionError};
pub use session::{Answers, DiagnosticSession, Mode, NO_ANSWER, Stage};
