use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Why an artifact slot ended up empty. Logged at load time, never
/// surfaced to callers; every consumer degrades through its fallback path.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("file not found")]
    Missing,

    #[error("deserialization failed: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("read failed: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// Deserializes the artifact file `name` from `dir`.
pub fn read_artifact<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T, ArtifactError> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(ArtifactError::Missing);
    }
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// A named, independently-optional trained artifact.
///
/// Consumers route through [`ArtifactSlot::compute`] so each signal defines
/// its fallback exactly once at the call site instead of scattering
/// presence checks.
#[derive(Debug, Clone)]
pub enum ArtifactSlot<T> {
    Absent,
    Present(T),
}

impl<T> ArtifactSlot<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Applies `f` to the artifact when present. `None` means the slot is
    /// absent or the computation itself declined (unknown id, shape
    /// mismatch); either way the caller falls back.
    pub fn compute<R>(&self, f: impl FnOnce(&T) -> Option<R>) -> Option<R> {
        match self {
            Self::Present(value) => f(value),
            Self::Absent => None,
        }
    }
}

/// Latent-factor rating predictor in biased matrix-factorization form.
#[derive(Debug, Clone, Deserialize)]
pub struct SvdModel {
    pub global_mean: f64,
    pub user_factors: HashMap<String, Vec<f64>>,
    pub item_factors: HashMap<String, Vec<f64>>,
    #[serde(default)]
    pub user_biases: HashMap<String, f64>,
    #[serde(default)]
    pub item_biases: HashMap<String, f64>,
}

impl SvdModel {
    /// Estimated rating on the 1..=5 scale, when both ids are known and
    /// the factor dimensions agree.
    pub fn predict(&self, user_id: &str, item_id: &str) -> Option<f64> {
        let user = self.user_factors.get(user_id)?;
        let item = self.item_factors.get(item_id)?;
        if user.len() != item.len() {
            return None;
        }

        let user_bias = self.user_biases.get(user_id).copied().unwrap_or(0.0);
        let item_bias = self.item_biases.get(item_id).copied().unwrap_or(0.0);
        let interaction: f64 = user.iter().zip(item).map(|(p, q)| p * q).sum();

        Some((self.global_mean + user_bias + item_bias + interaction).clamp(1.0, 5.0))
    }
}

/// TF-IDF content vectorizer: vocabulary plus per-term inverse document
/// frequencies, as exported by the training pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// L2-normalized sparse TF-IDF vector for `text`.
    fn transform(&self, text: &str) -> HashMap<usize, f64> {
        let mut weights: HashMap<usize, f64> = HashMap::new();
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty());

        for token in tokens {
            if let Some(&index) = self.vocabulary.get(&token.to_lowercase()) {
                if let Some(&idf) = self.idf.get(index) {
                    *weights.entry(index).or_insert(0.0) += idf;
                }
            }
        }

        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in weights.values_mut() {
                *weight /= norm;
            }
        }
        weights
    }

    /// Cosine similarity between two texts in the vectorizer's term space.
    /// Weights are non-negative, so the result lies in [0,1].
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let left = self.transform(a);
        let right = self.transform(b);
        left.iter()
            .filter_map(|(index, weight)| right.get(index).map(|other| weight * other))
            .sum()
    }
}

/// Dense row-major embedding matrix; the row index is the entity index.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingMatrix(Vec<Vec<f64>>);

impl EmbeddingMatrix {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.0.get(index).map(Vec::as_slice)
    }

    /// Mean of all rows; stands in for an average taste vector.
    pub fn centroid(&self) -> Option<Vec<f64>> {
        let first = self.0.first()?;
        let mut centroid = vec![0.0; first.len()];
        for row in &self.0 {
            if row.len() != centroid.len() {
                return None;
            }
            for (sum, value) in centroid.iter_mut().zip(row) {
                *sum += value;
            }
        }
        let count = self.0.len() as f64;
        for sum in centroid.iter_mut() {
            *sum /= count;
        }
        Some(centroid)
    }

    /// Cosine similarity in [-1,1]; `None` on dimension mismatch or a
    /// zero vector.
    pub fn cosine(a: &[f64], b: &[f64]) -> Option<f64> {
        if a.len() != b.len() || a.is_empty() {
            return None;
        }
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b = b.iter().map(|y| y * y).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return None;
        }
        Some(dot / (norm_a * norm_b))
    }
}

/// Categorical label encoder; the encoding is the class position.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn encode(&self, label: &str) -> Option<u64> {
        self.classes
            .iter()
            .position(|class| class == label)
            .map(|position| position as u64)
    }
}

/// Output head of the trained final-ranking model.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Classifier; score is the positive-class probability (sigmoid).
    Logistic,
    /// Regressor; the raw affine output is used directly.
    Linear,
}

/// Trained final-ranking model over the six signal features.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingModel {
    pub model_type: ModelType,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl RankingModel {
    /// Scores a feature vector. `None` when the coefficient arity does not
    /// match the input, which sends the caller down the weighted fallback.
    pub fn predict(&self, features: &[f64]) -> Option<f64> {
        if self.coefficients.len() != features.len() {
            return None;
        }
        let margin: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();

        Some(match self.model_type {
            ModelType::Logistic => 1.0 / (1.0 + (-margin).exp()),
            ModelType::Linear => margin,
        })
    }
}
