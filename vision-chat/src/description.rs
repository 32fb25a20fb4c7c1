//! Natural-language summary of a ranked prediction list.

use crate::predictions::{MIN_CONFIDENCE, RankedPrediction};

/// Returned when there is nothing to describe.
pub const NOTHING_IDENTIFIED: &str = "I couldn't identify any objects in the image.";

/// Returned when the top prediction carries no usable label.
pub const DESCRIPTION_FAILED: &str = "Error generating description for the image.";

/// Below this confidence the primary clause is hedged.
pub const CERTAIN_CONFIDENCE: f32 = 0.8;

/// Builds the image description used as conversation context.
///
/// ```
/// use vision_chat::{RankedPrediction, synthesize};
///
/// let preds = vec![
///     RankedPrediction { label: "golden retriever".into(), confidence: 0.91 },
///     RankedPrediction { label: "tennis ball".into(), confidence: 0.05 },
/// ];
/// assert_eq!(synthesize(&preds), "I can see a golden retriever in the image.");
/// ```
pub fn synthesize(predictions: &[RankedPrediction]) -> String {
    let Some((primary, rest)) = predictions.split_first() else {
        return NOTHING_IDENTIFIED.to_string();
    };

    let main_label = primary.label.trim();
    if main_label.is_empty() {
        return DESCRIPTION_FAILED.to_string();
    }

    let mut description = format!("I can see a {main_label} in the image");
    if primary.confidence < CERTAIN_CONFIDENCE {
        description.push_str(", though I'm not completely sure");
    }

    let others: Vec<&str> = rest
        .iter()
        .filter(|p| p.confidence > MIN_CONFIDENCE)
        .map(|p| p.label.trim())
        .filter(|label| !label.is_empty())
        .collect();

    match others.split_last() {
        None => {}
        Some((only, [])) => {
            description.push_str(". I also notice ");
            description.push_str(only);
        }
        Some((last, head)) => {
            description.push_str(". I also notice ");
            description.push_str(&head.join(", "));
            description.push_str(" and ");
            description.push_str(last);
        }
    }

    let trimmed = description.trim_end_matches('.');
    format!("{trimmed}.")
}
