//! Ranking of raw classifier output into labelled predictions.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::labels::LabelStore;

/// Number of candidates kept from a classifier distribution.
pub const DEFAULT_TOP_K: usize = 5;

/// Candidates at or below this probability are filtered out, see [`extract_top_k`].
pub const MIN_CONFIDENCE: f32 = 0.1;

/// A single labelled class with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub label: String,
    pub confidence: f32,
}

/// Numerically stable softmax.
///
/// Returns an empty vector for empty input. Non-finite logits yield a
/// uniform distribution rather than NaNs.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        let uniform = 1.0 / logits.len() as f32;
        return vec![uniform; logits.len()];
    }

    let exps: Vec<f32> = logits
        .iter()
        .map(|&v| if v.is_finite() { (v - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Selects the `k` most probable labelled classes from `scores`.
///
/// - Ordering is by descending score; equal scores keep the lower index first
///   and NaN scores rank last.
/// - Indices missing from `labels` are dropped (logged).
/// - Entries with confidence `<= MIN_CONFIDENCE` are removed, unless that would
///   remove every labelled candidate; then all labelled candidates are returned.
pub fn extract_top_k(scores: &[f32], labels: &LabelStore, k: usize) -> Vec<RankedPrediction> {
    let rank_key = |i: usize| {
        let s = scores[i];
        if s.is_nan() { f32::NEG_INFINITY } else { s }
    };

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| rank_key(b).total_cmp(&rank_key(a)).then(a.cmp(&b)));

    let candidates: Vec<RankedPrediction> = order
        .into_iter()
        .take(k)
        .filter_map(|index| match labels.get(index) {
            Some(label) => Some(RankedPrediction {
                label: label.to_string(),
                confidence: scores[index],
            }),
            None => {
                warn!(index, "label not found for class index");
                None
            }
        })
        .collect();

    let confident: Vec<RankedPrediction> = candidates
        .iter()
        .filter(|p| p.confidence > MIN_CONFIDENCE)
        .cloned()
        .collect();

    if confident.is_empty() {
        debug!(
            count = candidates.len(),
            "no candidate above confidence floor; returning unfiltered top-k"
        );
        candidates
    } else {
        confident
    }
}
