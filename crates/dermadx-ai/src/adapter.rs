use dermadx_core::Candidate;

use crate::ClassifierError;

/// Turns uploaded image bytes into the single image-derived candidate.
///
/// Implementations are shared read-only across sessions.
pub trait ImageClassifier: Send + Sync {
    fn classify_bytes(&self, bytes: &[u8]) -> Result<Candidate, ClassifierError>;
}

/// Classifier that decodes the image but always reports the same candidate.
///
/// Stands in for the ONNX model where no checkpoint is available.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    candidate: Candidate,
}

impl FixedClassifier {
    pub fn new(candidate: Candidate) -> Self {
        Self { candidate }
    }
}

impl ImageClassifier for FixedClassifier {
    fn classify_bytes(&self, bytes: &[u8]) -> Result<Candidate, ClassifierError> {
        crate::decode_image(bytes)?;
        Ok(self.candidate.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn fixed_classifier_still_rejects_garbage() {
        let c = FixedClassifier::new(Candidate::new("Eczema", 0.9));
        assert!(matches!(
            c.classify_bytes(b"not an image"),
            Err(ClassifierError::Decode(_))
        ));
    }

    #[test]
    fn fixed_classifier_reports_its_candidate() {
        let img = RgbImage::from_pixel(8, 8, Rgb([200, 120, 90]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();

        let c = FixedClassifier::new(Candidate::new("Eczema", 0.9));
        assert_eq!(c.classify_bytes(&png).unwrap(), Candidate::new("Eczema", 0.9));
    }
}
