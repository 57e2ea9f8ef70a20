use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;

use crate::models::Catalog;

use super::artifacts::{
    read_artifact, ArtifactError, ArtifactSlot, EmbeddingMatrix, LabelEncoder, RankingModel,
    SvdModel, TfidfVectorizer,
};

/// Agreed artifact file names within the models directory.
pub const SVD_MODEL_FILE: &str = "svd_model.json";
pub const TFIDF_VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const ITEM_EMBEDDINGS_FILE: &str = "item_embeddings.json";
pub const USER_EMBEDDINGS_FILE: &str = "user_embeddings.json";
pub const GENDER_ENCODER_FILE: &str = "gender_encoder.json";
pub const OCCUPATION_ENCODER_FILE: &str = "occupation_encoder.json";
pub const RANKING_MODEL_FILE: &str = "ranking_model.json";
pub const CATALOG_FILE: &str = "items_metadata.csv";

/// One immutable generation of trained artifacts plus the catalog.
///
/// Built in full before it is ever visible to a scoring request and never
/// mutated afterwards; a reload builds a whole new generation.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub svd: ArtifactSlot<SvdModel>,
    pub vectorizer: ArtifactSlot<TfidfVectorizer>,
    pub item_embeddings: ArtifactSlot<EmbeddingMatrix>,
    pub user_embeddings: ArtifactSlot<EmbeddingMatrix>,
    pub gender_encoder: ArtifactSlot<LabelEncoder>,
    pub occupation_encoder: ArtifactSlot<LabelEncoder>,
    pub ranking_model: ArtifactSlot<RankingModel>,
    pub catalog: Catalog,
    pub catalog_from_disk: bool,
}

impl ModelBundle {
    /// Loads every artifact slot from `dir`, tolerating any subset being
    /// missing or unreadable. The catalog falls back to the built-in
    /// sample set so the engine stays operable with no artifacts at all.
    pub fn load(dir: &Path) -> Self {
        let catalog_path = dir.join(CATALOG_FILE);
        let (catalog, catalog_from_disk) = match Catalog::from_csv(&catalog_path) {
            Ok(catalog) if !catalog.is_empty() => {
                tracing::info!(
                    items = catalog.len(),
                    path = %catalog_path.display(),
                    "Catalog metadata loaded"
                );
                (catalog, true)
            }
            Ok(_) => {
                tracing::warn!(
                    path = %catalog_path.display(),
                    "Catalog metadata is empty, using built-in sample catalog"
                );
                (Catalog::sample(), false)
            }
            Err(e) => {
                tracing::warn!(
                    path = %catalog_path.display(),
                    error = %e,
                    "Catalog metadata unavailable, using built-in sample catalog"
                );
                (Catalog::sample(), false)
            }
        };

        Self {
            svd: load_slot(dir, SVD_MODEL_FILE),
            vectorizer: load_slot(dir, TFIDF_VECTORIZER_FILE),
            item_embeddings: load_slot(dir, ITEM_EMBEDDINGS_FILE),
            user_embeddings: load_slot(dir, USER_EMBEDDINGS_FILE),
            gender_encoder: load_slot(dir, GENDER_ENCODER_FILE),
            occupation_encoder: load_slot(dir, OCCUPATION_ENCODER_FILE),
            ranking_model: load_slot(dir, RANKING_MODEL_FILE),
            catalog,
            catalog_from_disk,
        }
    }

    /// A bundle with every slot absent, over the sample catalog.
    pub fn empty() -> Self {
        Self {
            svd: ArtifactSlot::Absent,
            vectorizer: ArtifactSlot::Absent,
            item_embeddings: ArtifactSlot::Absent,
            user_embeddings: ArtifactSlot::Absent,
            gender_encoder: ArtifactSlot::Absent,
            occupation_encoder: ArtifactSlot::Absent,
            ranking_model: ArtifactSlot::Absent,
            catalog: Catalog::sample(),
            catalog_from_disk: false,
        }
    }

    /// True only when every artifact slot and the on-disk catalog loaded.
    pub fn is_fully_loaded(&self) -> bool {
        self.catalog_from_disk
            && self.svd.is_present()
            && self.vectorizer.is_present()
            && self.item_embeddings.is_present()
            && self.user_embeddings.is_present()
            && self.gender_encoder.is_present()
            && self.occupation_encoder.is_present()
            && self.ranking_model.is_present()
    }
}

fn load_slot<T: DeserializeOwned>(dir: &Path, name: &str) -> ArtifactSlot<T> {
    match read_artifact(dir, name) {
        Ok(artifact) => {
            tracing::info!(artifact = name, "Artifact loaded");
            ArtifactSlot::Present(artifact)
        }
        Err(ArtifactError::Missing) => {
            tracing::warn!(artifact = name, "Artifact file not found, slot disabled");
            ArtifactSlot::Absent
        }
        Err(e) => {
            tracing::warn!(artifact = name, error = %e, "Artifact failed to load, slot disabled");
            ArtifactSlot::Absent
        }
    }
}

/// Owner of the live bundle snapshot.
///
/// Readers clone the `Arc` and keep scoring against their generation even
/// while a reload is in flight; the reload builds the next generation off
/// to the side and publishes it with a single reference swap, so a torn
/// mix of generations is never observable.
#[derive(Debug)]
pub struct ModelStore {
    dir: PathBuf,
    bundle: RwLock<Arc<ModelBundle>>,
}

impl ModelStore {
    /// Loads the bundle from `dir`. Never fails; missing artifacts leave
    /// their slots absent.
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let bundle = Arc::new(ModelBundle::load(&dir));
        Self {
            dir,
            bundle: RwLock::new(bundle),
        }
    }

    /// The current bundle generation.
    pub fn snapshot(&self) -> Arc<ModelBundle> {
        self.bundle
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Rebuilds the bundle from disk and publishes it atomically.
    /// Idempotent; safe to invoke while scoring requests are in flight.
    pub fn reload(&self) {
        let next = Arc::new(ModelBundle::load(&self.dir));
        *self
            .bundle
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
        tracing::info!(dir = %self.dir.display(), "Model bundle reloaded");
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.snapshot().is_fully_loaded()
    }
}
