//! Image preprocessing and output decoding for the skin-lesion CNN.
//!
//! Input contract: RGB, resized to 224×224, scaled to [0, 1], then normalized
//! per channel with mean 0.5 and std 0.5, giving values in [-1, 1]. The
//! tensor layout is NCHW with a batch of one.

use dermadx_core::{Candidate, round2};
use image::imageops::FilterType;
use image::RgbImage;

use crate::ClassifierError;
use crate::labels::{NUM_CLASSES, label_for_index};

pub const INPUT_SIZE: u32 = 224;
pub const CHANNEL_MEAN: f32 = 0.5;
pub const CHANNEL_STD: f32 = 0.5;

/// Tensor shape fed to the network: `[batch, channels, height, width]`.
pub const INPUT_SHAPE: [i64; 4] = [1, 3, INPUT_SIZE as i64, INPUT_SIZE as i64];

/// Decode image bytes (JPEG or PNG) into an RGB buffer.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ClassifierError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Resize and normalize an image into a flat NCHW `f32` buffer.
pub fn preprocess(img: &RgbImage) -> Vec<f32> {
    let resized = if img.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
        img.clone()
    } else {
        image::imageops::resize(img, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
    };

    let plane = (INPUT_SIZE * INPUT_SIZE) as usize;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in resized.enumerate_pixels() {
        let offset = (y * INPUT_SIZE + x) as usize;
        for c in 0..3 {
            let scaled = pixel[c] as f32 / 255.0;
            data[c * plane + offset] = (scaled - CHANNEL_MEAN) / CHANNEL_STD;
        }
    }

    data
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Decode raw network logits into the single best candidate.
///
/// Applies softmax, takes the arg-max class and reports its probability
/// rounded to two decimals.
pub fn top_prediction(logits: &[f32]) -> Result<Candidate, ClassifierError> {
    if logits.len() != NUM_CLASSES {
        return Err(ClassifierError::UnexpectedOutput {
            expected: NUM_CLASSES,
            actual: logits.len(),
        });
    }

    let probs = softmax(logits);
    let (index, prob) = probs
        .iter()
        .copied()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |best, (i, p)| {
            if p > best.1 { (i, p) } else { best }
        });

    Ok(Candidate::new(label_for_index(index), round2(prob)))
}
