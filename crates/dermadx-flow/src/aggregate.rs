use dermadx_core::Candidate;

/// Merge text-derived candidates with the single image-derived one.
///
/// Text candidates keep their order and the image candidate, if any, is
/// appended. The result is insertion-ordered, not ranked.
pub fn aggregate(text: Vec<Candidate>, image: Option<Candidate>) -> Vec<Candidate> {
    let mut merged = text;
    merged.extend(image);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_passes_through() {
        let text = vec![Candidate::new("Eczema", 0.8), Candidate::new("Psoriasis", 0.6)];
        assert_eq!(aggregate(text.clone(), None), text);
    }

    #[test]
    fn image_only() {
        let img = Candidate::new("Melanoma", 0.91);
        assert_eq!(aggregate(vec![], Some(img.clone())), vec![img]);
    }

    #[test]
    fn image_appended_after_text() {
        let merged = aggregate(
            vec![Candidate::new("Tinea", 0.4)],
            Some(Candidate::new("Eczema", 0.77)),
        );
        let labels: Vec<&str> = merged.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Tinea", "Eczema"]);
    }

    #[test]
    fn nothing_in_nothing_out() {
        assert!(aggregate(vec![], None).is_empty());
    }
}
