//! Fixed class table for the skin-lesion classifier.
//!
//! Index order matches the output layer of the pretrained checkpoint; index 0
//! is reserved for "Unknown".

pub const NUM_CLASSES: usize = 11;

pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "Unknown",
    "Eczema",
    "Warts",
    "Melanoma",
    "Atopic Dermatitis",
    "BCC",
    "Melanocytic Nevi",
    "BKL",
    "Psoriasis",
    "Seborrheic Keratoses",
    "Tinea",
];

/// Label used when the network reports an index outside the table.
pub const UNKNOWN_DISEASE: &str = "Unknown Disease";

/// Map a class index to its label.
pub fn label_for_index(index: usize) -> &'static str {
    CLASS_NAMES.get(index).copied().unwrap_or(UNKNOWN_DISEASE)
}

/// Whether `label` is one the classifier can emit.
pub fn is_classifier_label(label: &str) -> bool {
    label == UNKNOWN_DISEASE || CLASS_NAMES.contains(&label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_is_unknown() {
        assert_eq!(label_for_index(0), "Unknown");
    }

    #[test]
    fn last_index_is_tinea() {
        assert_eq!(label_for_index(NUM_CLASSES - 1), "Tinea");
    }

    #[test]
    fn out_of_range_maps_to_unknown_disease() {
        assert_eq!(label_for_index(NUM_CLASSES), UNKNOWN_DISEASE);
        assert_eq!(label_for_index(usize::MAX), UNKNOWN_DISEASE);
    }

    #[test]
    fn classifier_labels() {
        assert!(is_classifier_label("Psoriasis"));
        assert!(is_classifier_label(UNKNOWN_DISEASE));
        assert!(!is_classifier_label("Rosacea"));
    }
}
