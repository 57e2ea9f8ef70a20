use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::Item;

/// Placeholder artwork until a real poster service is wired up.
const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1489599849927-2ee91cede3ba?w=400&h=600&fit=crop";

/// Row shape of `items_metadata.csv`. The training pipeline's export
/// carries extra columns (vote averages etc.) which are ignored, and
/// sometimes omits `category`, `description` or `popularity`.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    title: String,
    year: i32,
    #[serde(default = "default_category")]
    category: String,
    genres: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_popularity")]
    popularity: f64,
}

fn default_category() -> String {
    "Movie".to_string()
}

fn default_popularity() -> f64 {
    50.0
}

impl From<CatalogRow> for Item {
    fn from(row: CatalogRow) -> Self {
        let genres = if row.genres.is_empty() {
            Vec::new()
        } else {
            row.genres.split('|').map(str::to_string).collect()
        };

        Item {
            id: row.id,
            title: row.title,
            year: row.year,
            category: row.category,
            genres,
            description: row.description,
            popularity: row.popularity,
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

/// Field the catalog listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Popularity,
    Year,
    Title,
}

/// Filters for a catalog listing
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    pub limit: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            category: None,
            genre: None,
            search: None,
            sort_by: None,
            limit: 50,
        }
    }
}

/// The ordered item catalog. Loaded once at startup (or on hot reload) and
/// read-only afterwards; the insertion order is the tie-break order for
/// every ranked listing.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id.clone(), position))
            .collect();
        Self { items, index }
    }

    /// Reads the tabular catalog file.
    pub fn from_csv(path: &Path) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut items = Vec::new();
        for row in reader.deserialize() {
            let row: CatalogRow = row?;
            items.push(Item::from(row));
        }
        Ok(Self::new(items))
    }

    /// The built-in sample catalog, used when no metadata file is
    /// available so the engine stays operable without external artifacts.
    pub fn sample() -> Self {
        let entries = [
            ("1", "Toy Story", 1995, "Animation|Adventure|Comedy", 92.0,
             "A cowboy doll is profoundly threatened when a new spaceman figure supplants him."),
            ("2", "Jumanji", 1995, "Action|Adventure|Family", 88.0,
             "Two kids find and play a magical board game."),
            ("3", "Heat", 1995, "Action|Crime|Drama", 85.0,
             "A group of professional bank robbers start to feel the heat from police."),
            ("4", "The Matrix", 1999, "Action|Sci-Fi", 95.0,
             "A computer hacker learns about the true nature of reality."),
            ("5", "Inception", 2010, "Action|Sci-Fi|Thriller", 94.0,
             "A thief who steals corporate secrets through dream-sharing technology."),
            ("6", "Interstellar", 2014, "Adventure|Drama|Sci-Fi", 93.0,
             "A team of explorers travel through a wormhole in space."),
            ("7", "The Shawshank Redemption", 1994, "Drama", 97.0,
             "Two imprisoned men bond over a number of years."),
            ("8", "Pulp Fiction", 1994, "Crime|Drama", 91.0,
             "The lives of two mob hitmen, a boxer, and others intertwine."),
        ];

        let items = entries
            .iter()
            .map(|(id, title, year, genres, popularity, description)| Item {
                id: (*id).to_string(),
                title: (*title).to_string(),
                year: *year,
                category: "Movie".to_string(),
                genres: genres.split('|').map(str::to_string).collect(),
                description: (*description).to_string(),
                popularity: *popularity,
                image_url: PLACEHOLDER_IMAGE_URL.to_string(),
            })
            .collect();

        Self::new(items)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Filtered, sorted and truncated listing
    pub fn query(&self, query: &CatalogQuery) -> Vec<Item> {
        let mut results: Vec<Item> = self
            .items
            .iter()
            .filter(|item| {
                query
                    .category
                    .as_ref()
                    .map_or(true, |category| item.category.eq_ignore_ascii_case(category))
            })
            .filter(|item| {
                query.genre.as_ref().map_or(true, |genre| {
                    let needle = genre.to_lowercase();
                    item.genres
                        .iter()
                        .any(|have| have.to_lowercase().contains(&needle))
                })
            })
            .filter(|item| {
                query.search.as_ref().map_or(true, |search| {
                    let needle = search.to_lowercase();
                    item.title.to_lowercase().contains(&needle)
                        || item.description.to_lowercase().contains(&needle)
                })
            })
            .cloned()
            .collect();

        match query.sort_by {
            Some(SortBy::Popularity) => results.sort_by(|a, b| {
                b.popularity
                    .partial_cmp(&a.popularity)
                    .unwrap_or(Ordering::Equal)
            }),
            Some(SortBy::Year) => results.sort_by(|a, b| b.year.cmp(&a.year)),
            Some(SortBy::Title) => results.sort_by(|a, b| a.title.cmp(&b.title)),
            None => {}
        }

        results.truncate(query.limit);
        results
    }
}
