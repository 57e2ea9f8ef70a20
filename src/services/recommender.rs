use std::cmp::Ordering;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    CatalogQuery, ColdStartProfile, FeatureBreakdown, Item, Recommendation, Source,
};

use super::features;
use super::noise::NoiseSource;
use super::ranking;
use super::store::{ModelBundle, ModelStore};

/// Demographics assumed for known users until a profile store exists.
const DEFAULT_GENDER: &str = "male";
const DEFAULT_OCCUPATION: &str = "Engineer";

/// Similarity-mode weights. Similarity requests never use the trained
/// ranking model; they are always weighted.
const SIMILAR_CONTENT_WEIGHT: f64 = 0.5;
const SIMILAR_POPULARITY_WEIGHT: f64 = 0.3;
const SIMILAR_RECENCY_WEIGHT: f64 = 0.2;

/// Cold-start weights. No latent-factor signal exists for a user without
/// interaction history, so its share is redistributed.
const COLD_CONTENT_WEIGHT: f64 = 0.4;
const COLD_POPULARITY_WEIGHT: f64 = 0.25;
const COLD_RECENCY_WEIGHT: f64 = 0.1;
const COLD_DEMOGRAPHIC_WEIGHT: f64 = 0.25;

/// Interest overlap above which a cold-start pick counts as content-driven.
const COLD_CONTENT_THRESHOLD: f64 = 0.3;

/// The recommendation engine: owns the artifact store and serves ranked
/// lists against its current bundle snapshot.
pub struct Engine {
    store: ModelStore,
    noise: NoiseSource,
    reference_year: i32,
}

impl Engine {
    /// Loads the artifact bundle and catalog. Never fails; missing or
    /// corrupt artifacts leave the engine in degraded mode, observable via
    /// [`Engine::is_fully_loaded`].
    pub fn new(config: &Config) -> Self {
        let noise = match config.noise_seed {
            Some(seed) => NoiseSource::seeded(seed),
            None => NoiseSource::from_entropy(),
        };
        Self::from_parts(
            ModelStore::load(config.models_dir.as_str()),
            noise,
            config.reference_year,
        )
    }

    /// Assembles an engine from explicit parts, so tests can inject a
    /// seeded noise source and a fixture store.
    pub fn from_parts(store: ModelStore, noise: NoiseSource, reference_year: i32) -> Self {
        Self {
            store,
            noise,
            reference_year,
        }
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.store.is_fully_loaded()
    }

    /// Rebuilds the artifact bundle from disk and swaps it in atomically;
    /// requests in flight keep scoring against their snapshot.
    pub fn reload(&self) {
        self.store.reload();
    }

    pub fn get_item(&self, item_id: &str) -> AppResult<Item> {
        self.store
            .snapshot()
            .catalog
            .get(item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Item {item_id} not found")))
    }

    pub fn list_items(&self, query: &CatalogQuery) -> Vec<Item> {
        self.store.snapshot().catalog.query(query)
    }

    /// Personalized recommendations: scores a bounded candidate window
    /// with all six signals and fuses them.
    pub fn recommend_for_user(&self, user_id: &str, limit: usize) -> Vec<Recommendation> {
        let bundle = self.store.snapshot();

        let mut recommendations: Vec<Recommendation> = bundle
            .catalog
            .items()
            .iter()
            .take(limit.saturating_mul(2))
            .map(|item| self.score_for_user(&bundle, user_id, item))
            .collect();

        sort_and_truncate(&mut recommendations, limit);
        tracing::debug!(
            user_id = %user_id,
            returned = recommendations.len(),
            "User recommendations computed"
        );
        recommendations
    }

    fn score_for_user(&self, bundle: &ModelBundle, user_id: &str, item: &Item) -> Recommendation {
        let breakdown = FeatureBreakdown {
            svd_score: Some(features::svd_score(bundle, &self.noise, user_id, &item.id)),
            content_similarity: Some(features::content_similarity(
                bundle,
                &self.noise,
                item,
                &item.genres,
            )),
            user_item_similarity: Some(features::user_item_similarity(
                bundle,
                &self.noise,
                user_id,
                &item.id,
            )),
            popularity: Some(features::popularity(item)),
            recency: Some(features::recency(item, self.reference_year)),
            demographic_match: Some(features::demographic_match(
                bundle,
                DEFAULT_GENDER,
                DEFAULT_OCCUPATION,
                &item.id,
            )),
        };

        let score = ranking::fuse(bundle, &breakdown);
        let source = ranking::source_label(&breakdown);

        Recommendation {
            item: item.clone(),
            score,
            source,
            features: breakdown,
        }
    }

    /// Content-driven neighbors of a catalog item. The target itself is
    /// excluded from the candidates.
    pub fn recommend_similar(&self, item_id: &str, limit: usize) -> AppResult<Vec<Recommendation>> {
        let bundle = self.store.snapshot();
        let target = bundle
            .catalog
            .get(item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Item {item_id} not found")))?;

        let mut recommendations: Vec<Recommendation> = bundle
            .catalog
            .items()
            .iter()
            .filter(|item| item.id != target.id)
            .map(|item| {
                let overlap = features::genre_jaccard(&target.genres, &item.genres);
                let content =
                    features::clamp01(overlap * 0.7 + self.noise.uniform(0.1, 0.3));
                let pop = features::popularity(item);
                let rec = features::recency(item, self.reference_year);

                let breakdown = FeatureBreakdown {
                    content_similarity: Some(content),
                    user_item_similarity: Some(features::content_similarity(
                        &bundle,
                        &self.noise,
                        item,
                        &target.genres,
                    )),
                    popularity: Some(pop),
                    recency: Some(rec),
                    ..Default::default()
                };

                let score = features::clamp01(
                    content * SIMILAR_CONTENT_WEIGHT
                        + pop * SIMILAR_POPULARITY_WEIGHT
                        + rec * SIMILAR_RECENCY_WEIGHT,
                );

                Recommendation {
                    item: item.clone(),
                    score,
                    source: Source::Content,
                    features: breakdown,
                }
            })
            .collect();

        sort_and_truncate(&mut recommendations, limit);
        Ok(recommendations)
    }

    /// Recommendations for a user with no interaction history, driven by
    /// declared interests and demographics only.
    pub fn recommend_cold_start(
        &self,
        profile: &ColdStartProfile,
        limit: usize,
    ) -> Vec<Recommendation> {
        let bundle = self.store.snapshot();

        let mut recommendations: Vec<Recommendation> = bundle
            .catalog
            .items()
            .iter()
            .map(|item| {
                let overlap = features::genre_jaccard(&profile.interests, &item.genres);
                let content =
                    features::clamp01(overlap * 0.8 + self.noise.uniform(0.1, 0.2));
                let pop = features::popularity(item);
                let rec = features::recency(item, self.reference_year);
                let demographic = features::demographic_match(
                    &bundle,
                    &profile.gender,
                    &profile.occupation,
                    &item.id,
                );

                let breakdown = FeatureBreakdown {
                    content_similarity: Some(content),
                    popularity: Some(pop),
                    recency: Some(rec),
                    demographic_match: Some(demographic),
                    ..Default::default()
                };

                let score = features::clamp01(
                    content * COLD_CONTENT_WEIGHT
                        + pop * COLD_POPULARITY_WEIGHT
                        + rec * COLD_RECENCY_WEIGHT
                        + demographic * COLD_DEMOGRAPHIC_WEIGHT,
                );

                let source = if overlap > COLD_CONTENT_THRESHOLD {
                    Source::Content
                } else {
                    Source::Trending
                };

                Recommendation {
                    item: item.clone(),
                    score,
                    source,
                    features: breakdown,
                }
            })
            .collect();

        sort_and_truncate(&mut recommendations, limit);
        recommendations
    }
}

/// Descending by score; the stable sort preserves catalog order on ties.
fn sort_and_truncate(recommendations: &mut Vec<Recommendation>, limit: usize) {
    recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    recommendations.truncate(limit);
}
