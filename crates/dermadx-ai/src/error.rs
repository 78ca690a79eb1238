use dermadx_core::DiagnosisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(std::path::PathBuf),

    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unexpected classifier output: expected {expected} logits, got {actual}")]
    UnexpectedOutput { expected: usize, actual: usize },

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("{0}")]
    Other(String),
}

impl From<ClassifierError> for DiagnosisError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::Decode(err) => DiagnosisError::InvalidImage(err.to_string()),
            other => DiagnosisError::Classifier(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undecodable_upload_is_invalid_image() {
        let err = crate::decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(
            DiagnosisError::from(err),
            DiagnosisError::InvalidImage(_)
        ));
    }

    #[test]
    fn inference_failures_stay_classifier_errors() {
        let err = ClassifierError::UnexpectedOutput {
            expected: 11,
            actual: 3,
        };
        assert!(matches!(
            DiagnosisError::from(err),
            DiagnosisError::Classifier(_)
        ));
        let err = ClassifierError::CheckpointNotFound("/nope.onnx".into());
        assert!(matches!(
            DiagnosisError::from(err),
            DiagnosisError::Classifier(_)
        ));
    }
}
