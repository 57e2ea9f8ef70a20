//! Ranking fusion: merges the six signal scores into one final relevance
//! score and labels the dominant signal.

use crate::models::{FeatureBreakdown, Source};

use super::features::clamp01;
use super::store::ModelBundle;

/// Neutral prior substituted for absent features when fusing.
pub const NEUTRAL_PRIOR: f64 = 0.5;

/// Fixed fallback weights, in feature-vector order. Must sum to 1.0.
pub const FALLBACK_WEIGHTS: [f64; 6] = [0.30, 0.20, 0.20, 0.15, 0.05, 0.10];

/// Ordered feature vector expected by the trained ranking model:
/// svd, content, user-item, popularity, recency, demographic.
fn feature_vector(features: &FeatureBreakdown) -> [f64; 6] {
    [
        features.svd_score.unwrap_or(NEUTRAL_PRIOR),
        features.content_similarity.unwrap_or(NEUTRAL_PRIOR),
        features.user_item_similarity.unwrap_or(NEUTRAL_PRIOR),
        features.popularity.unwrap_or(NEUTRAL_PRIOR),
        features.recency.unwrap_or(NEUTRAL_PRIOR),
        features.demographic_match.unwrap_or(NEUTRAL_PRIOR),
    ]
}

/// Final relevance score in [0,1]: the trained ranking model when it is
/// present and accepts the input, the fixed weighted combination
/// otherwise. The weighted path is reachable regardless of configuration.
pub fn fuse(bundle: &ModelBundle, features: &FeatureBreakdown) -> f64 {
    let vector = feature_vector(features);

    if let Some(score) = bundle.ranking_model.compute(|model| model.predict(&vector)) {
        return clamp01(score);
    }

    weighted_score(&vector)
}

fn weighted_score(vector: &[f64; 6]) -> f64 {
    let score: f64 = vector
        .iter()
        .zip(FALLBACK_WEIGHTS.iter())
        .map(|(value, weight)| value * weight)
        .sum();
    clamp01(score)
}

/// Labels which signal dominated a recommendation. Deliberately
/// independent of the fusion weights: it compares the raw collaborative
/// and content signals.
pub fn source_label(features: &FeatureBreakdown) -> Source {
    let svd = features.svd_score.unwrap_or(0.0);
    let content = features.content_similarity.unwrap_or(0.0);

    if svd > 0.8 && content > 0.7 {
        Source::Hybrid
    } else if svd > content {
        Source::Svd
    } else if content > svd {
        Source::Content
    } else {
        Source::Trending
    }
}
