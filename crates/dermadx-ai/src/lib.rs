//! Image classification layer: preprocessing, label table, ONNX Runtime inference.

mod adapter;
mod error;
pub mod labels;
pub mod preprocess;

pub use adapter::{FixedClassifier, ImageClassifier};
pub use error::ClassifierError;
pub use labels::{CLASS_NAMES, UNKNOWN_DISEASE, label_for_index};
pub use preprocess::{decode_image, preprocess, top_prediction};

#[cfg(feature = "onnx")]
mod classifier;
#[cfg(feature = "onnx")]
pub use classifier::SkinClassifier;
