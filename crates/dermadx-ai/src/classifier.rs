//! ONNX Runtime adapter for the pretrained skin-lesion CNN.
//!
//! The checkpoint is an ONNX export of a fixed three-block convolutional
//! network (32→64→128 channels, 512-unit hidden layer, 11 outputs) in eval
//! mode. Only inference happens here.

use std::path::Path;
use std::sync::Mutex;

use dermadx_core::Candidate;
use image::RgbImage;
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, info};

use crate::{ClassifierError, ImageClassifier};
use crate::preprocess::{INPUT_SHAPE, decode_image, preprocess, top_prediction};

/// Image classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex;
/// the weights themselves are never mutated and one instance can serve many
/// sessions.
pub struct SkinClassifier {
    session: Mutex<Session>,
    input_name: String,
}

impl SkinClassifier {
    /// Load the network from an `.onnx` checkpoint.
    pub fn load(checkpoint: &Path) -> Result<Self, ClassifierError> {
        if !checkpoint.exists() {
            return Err(ClassifierError::CheckpointNotFound(checkpoint.to_path_buf()));
        }

        let session = Session::builder()?.commit_from_file(checkpoint)?;
        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| ClassifierError::Other("checkpoint declares no inputs".into()))?;

        info!(model = %checkpoint.display(), input = %input_name, "loaded skin classifier");
        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Classify a decoded RGB image, returning the top-1 candidate.
    pub fn classify(&self, img: &RgbImage) -> Result<Candidate, ClassifierError> {
        let data = preprocess(img);
        let tensor = Tensor::from_array((INPUT_SHAPE, data.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Other("classifier session lock poisoned".into()))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;

        // Logits: [1, NUM_CLASSES].
        let (_, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let candidate = top_prediction(logits)?;

        debug!(label = %candidate.label, confidence = candidate.confidence, "image classified");
        Ok(candidate)
    }
}

impl ImageClassifier for SkinClassifier {
    fn classify_bytes(&self, bytes: &[u8]) -> Result<Candidate, ClassifierError> {
        let img = decode_image(bytes)?;
        self.classify(&img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::is_classifier_label;
    use image::Rgb;
    use std::path::PathBuf;

    fn checkpoint() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("skin_disease_model.onnx")
    }

    #[test]
    fn missing_checkpoint_is_reported() {
        let err = SkinClassifier::load(Path::new("/nonexistent/model.onnx")).err();
        assert!(matches!(err, Some(ClassifierError::CheckpointNotFound(_))));
    }

    #[test]
    #[ignore = "requires models/skin_disease_model.onnx"]
    fn classify_returns_known_label() {
        let clf = SkinClassifier::load(&checkpoint()).unwrap();
        let img = RgbImage::from_pixel(300, 200, Rgb([180, 120, 110]));
        let c = clf.classify(&img).unwrap();
        assert!(is_classifier_label(&c.label), "unexpected label {}", c.label);
        assert!((0.0..=1.0).contains(&c.confidence));
        assert_eq!(c.confidence, dermadx_core::round2(c.confidence));
    }
}
