//! Per-signal feature computation.
//!
//! Every function returns a scalar in [0,1] and never fails: an absent
//! artifact, an unresolvable id or a shape mismatch degrades to that
//! signal's documented fallback instead of propagating an error.

use std::collections::HashSet;

use crate::models::Item;

use super::artifacts::EmbeddingMatrix;
use super::noise::NoiseSource;
use super::store::ModelBundle;

/// Rating scale ceiling used to normalize predictor output.
const MAX_RATING: f64 = 5.0;

/// Sentinel encodings for demographic labels outside the trained classes.
const UNKNOWN_GENDER: u64 = 0;
const UNKNOWN_OCCUPATION: u64 = 1;

pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Latent-factor signal: the predicted rating normalized by the rating
/// scale. Falls back to the unknown-signal prior band when the predictor
/// is absent or cannot resolve the pair.
pub fn svd_score(
    bundle: &ModelBundle,
    noise: &NoiseSource,
    user_id: &str,
    item_id: &str,
) -> f64 {
    bundle
        .svd
        .compute(|model| model.predict(user_id, item_id))
        .map(|rating| clamp01(rating / MAX_RATING))
        .unwrap_or_else(|| noise.uniform(0.6, 0.95))
}

/// Content signal for an indexed catalog item. Prefers the embedding
/// space (cosine against the catalog centroid); a present vectorizer
/// backs a second chance via TF-IDF over the item text before the signal
/// degrades to its default band.
pub fn content_similarity(
    bundle: &ModelBundle,
    noise: &NoiseSource,
    item: &Item,
    target_genres: &[String],
) -> f64 {
    let from_embeddings = bundle.item_embeddings.compute(|matrix| {
        let row = matrix.row(item_index(&item.id)?)?;
        let centroid = matrix.centroid()?;
        let similarity = EmbeddingMatrix::cosine(row, &centroid)?;
        Some(clamp01((similarity + 1.0) / 2.0))
    });
    if let Some(score) = from_embeddings {
        return score;
    }

    bundle
        .vectorizer
        .compute(|vectorizer| {
            if target_genres.is_empty() {
                return None;
            }
            let target = target_genres.join(" ");
            let candidate = format!("{} {}", item.title, item.genres.join(" "));
            Some(clamp01(vectorizer.similarity(&target, &candidate)))
        })
        .unwrap_or_else(|| noise.uniform(0.5, 0.85))
}

/// User-item embedding signal: cosine between the user row and the item
/// row, mapped to [0,1]. Both matrices must be present and both indices
/// resolve, otherwise the default band applies.
pub fn user_item_similarity(
    bundle: &ModelBundle,
    noise: &NoiseSource,
    user_id: &str,
    item_id: &str,
) -> f64 {
    bundle
        .user_embeddings
        .compute(|users| {
            bundle.item_embeddings.compute(|items| {
                let user_row = users.row(user_index(user_id)?)?;
                let item_row = items.row(item_index(item_id)?)?;
                let similarity = EmbeddingMatrix::cosine(user_row, item_row)?;
                Some(clamp01((similarity + 1.0) / 2.0))
            })
        })
        .unwrap_or_else(|| noise.uniform(0.55, 0.88))
}

/// Popularity signal; the catalog stores popularity on a 0..=100 scale.
pub fn popularity(item: &Item) -> f64 {
    clamp01(item.popularity / 100.0)
}

/// Recency signal: linear decay over 50 years from the reference year.
pub fn recency(item: &Item, reference_year: i32) -> f64 {
    clamp01(1.0 - f64::from(reference_year - item.year) / 50.0)
}

/// Genre-set overlap: `|a ∩ b| / max(|a ∪ b|, 1)`.
pub fn genre_jaccard(a: &[String], b: &[String]) -> f64 {
    let left: HashSet<&str> = a.iter().map(String::as_str).collect();
    let right: HashSet<&str> = b.iter().map(String::as_str).collect();
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union.max(1) as f64
}

/// Demographic signal: a deterministic pseudo-score in [0.5, 1.0] keyed by
/// the encoded demographics and the item id. Unknown labels are sentinel-
/// encoded rather than rejected. Placeholder until a real demographic
/// interaction model is trained.
pub fn demographic_match(
    bundle: &ModelBundle,
    gender: &str,
    occupation: &str,
    item_id: &str,
) -> f64 {
    let encoded_gender = bundle
        .gender_encoder
        .compute(|encoder| encoder.encode(gender))
        .unwrap_or(UNKNOWN_GENDER);
    let encoded_occupation = bundle
        .occupation_encoder
        .compute(|encoder| encoder.encode(occupation))
        .unwrap_or(UNKNOWN_OCCUPATION);

    let bucket = stable_mix(encoded_gender, encoded_occupation, item_id) % 100;
    0.5 + bucket as f64 / 200.0
}

/// splitmix64 finalizer. Fixed parameters keep demographic scores stable
/// across processes and platforms.
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

fn stable_mix(gender: u64, occupation: u64, item_id: &str) -> u64 {
    // FNV-1a over the id, then mixed with the encoded demographics
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in item_id.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    mix64(hash ^ mix64(gender).rotate_left(1) ^ mix64(occupation).rotate_left(2))
}

/// Catalog item ids are 1-based row numbers in the embedding matrices.
fn item_index(item_id: &str) -> Option<usize> {
    item_id.parse::<usize>().ok()?.checked_sub(1)
}

/// User ids carry a 1-based ordinal suffix ("user7" resolves to row 6).
fn user_index(user_id: &str) -> Option<usize> {
    let digits: String = user_id.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<usize>().ok()?.checked_sub(1)
}
