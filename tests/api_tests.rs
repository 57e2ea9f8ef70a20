use std::fs;
use std::path::Path;

use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use curator_api::api::{create_router, AppState};
use curator_api::config::Config;
use curator_api::services::Engine;

fn create_test_server(models_dir: &Path) -> TestServer {
    let config = Config {
        models_dir: models_dir.display().to_string(),
        noise_seed: Some(42),
        ..Config::default()
    };
    let state = AppState::new(Engine::new(&config));
    TestServer::new(create_router(state)).unwrap()
}

/// A models directory with every artifact present, shaped like the
/// training pipeline's export (catalog with extra columns, no category).
fn full_models_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("svd_model.json"),
        r#"{
            "global_mean": 3.4,
            "user_factors": {"user1": [0.2, 0.1], "user2": [0.1, 0.3]},
            "item_factors": {"1": [0.4, 0.2], "2": [0.1, 0.1], "3": [0.3, 0.5]},
            "user_biases": {"user1": 0.1},
            "item_biases": {"1": 0.2}
        }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("tfidf_vectorizer.json"),
        r#"{"vocabulary": {"space": 0, "heist": 1, "drama": 2}, "idf": [1.4, 1.2, 1.0]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("item_embeddings.json"),
        "[[0.8, 0.2], [0.3, 0.7], [0.5, 0.5]]",
    )
    .unwrap();
    fs::write(dir.path().join("user_embeddings.json"), "[[0.6, 0.4], [0.2, 0.8]]").unwrap();
    fs::write(
        dir.path().join("gender_encoder.json"),
        r#"{"classes": ["female", "male", "other"]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("occupation_encoder.json"),
        r#"{"classes": ["artist", "doctor", "engineer", "student", "teacher"]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("ranking_model.json"),
        r#"{"model_type": "logistic", "coefficients": [0.6, 0.4, 0.3, 0.5, 0.1, 0.2], "intercept": -0.4}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("items_metadata.csv"),
        "id,title,genres,popularity,year,description,vote_average,vote_count\n\
         1,Orbital Dawn,Adventure|Sci-Fi,91.5,2019,A crew drifts beyond the relay network.,8.1,412\n\
         2,The Long Heist,Crime|Thriller,74.0,2003,One last job goes sideways.,7.4,388\n\
         3,Quiet Harbor,Drama,66.3,1998,A fishing town weathers a hard season.,7.9,205\n",
    )
    .unwrap();
    dir
}

#[tokio::test]
async fn test_health_check_degraded() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models_loaded"], false);
}

#[tokio::test]
async fn test_health_check_fully_loaded() {
    let dir = full_models_dir();
    let server = create_test_server(dir.path());

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["models_loaded"], true);
}

#[tokio::test]
async fn test_list_items_defaults_to_sample_catalog() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/items").await;
    response.assert_status_ok();

    let items: Vec<serde_json::Value> = response.json();
    assert_eq!(items.len(), 8);
    assert_eq!(items[0]["title"], "Toy Story");
    assert!(items[0]["imageUrl"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn test_list_items_filter_and_sort() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/items")
        .add_query_param("genre", "Sci-Fi")
        .add_query_param("sort_by", "year")
        .await;
    response.assert_status_ok();

    let items: Vec<serde_json::Value> = response.json();
    assert!(!items.is_empty());
    assert_eq!(items[0]["title"], "Interstellar");

    let years: Vec<i64> = items.iter().map(|item| item["year"].as_i64().unwrap()).collect();
    let mut sorted = years.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(years, sorted);
}

#[tokio::test]
async fn test_list_items_search() {
    let dir = full_models_dir();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/items")
        .add_query_param("search", "relay")
        .await;
    response.assert_status_ok();

    let items: Vec<serde_json::Value> = response.json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "1");
    // The export has no category column; the default applies
    assert_eq!(items[0]["category"], "Movie");
}

#[tokio::test]
async fn test_list_items_rejects_bad_limit() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/items").add_query_param("limit", "0").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let response = server.get("/api/items").add_query_param("limit", "9999").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_item() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/items/4").await;
    response.assert_status_ok();

    let item: serde_json::Value = response.json();
    assert_eq!(item["title"], "The Matrix");
    assert_eq!(item["genres"], json!(["Action", "Sci-Fi"]));
}

#[tokio::test]
async fn test_get_item_not_found() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/items/nonexistent-id").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("nonexistent-id"));
}

#[tokio::test]
async fn test_recommend_for_user_degraded() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/recommend/user/user1").await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert_eq!(recommendations.len(), 8);

    let mut previous = f64::INFINITY;
    for recommendation in &recommendations {
        let score = recommendation["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert!(score <= previous);
        previous = score;

        // All six signals are populated in the user flow
        let features = &recommendation["features"];
        for key in [
            "svdScore",
            "contentSimilarity",
            "userItemSimilarity",
            "popularity",
            "recency",
            "demographicMatch",
        ] {
            let value = features[key].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&value));
        }
    }
}

#[tokio::test]
async fn test_recommend_for_user_respects_limit() {
    let dir = full_models_dir();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/recommend/user/user1")
        .add_query_param("limit", "2")
        .await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert_eq!(recommendations.len(), 2);
}

#[tokio::test]
async fn test_recommend_for_user_rejects_bad_limit() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/recommend/user/user1")
        .add_query_param("limit", "51")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_similar_excludes_target() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/similar/4").await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert!(!recommendations.is_empty());
    assert!(recommendations
        .iter()
        .all(|recommendation| recommendation["item"]["id"] != "4"));
    assert!(recommendations
        .iter()
        .all(|recommendation| recommendation["source"] == "content"));
}

#[tokio::test]
async fn test_similar_not_found() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/similar/unknown").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cold_start() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/recommend/cold-start")
        .add_query_param("limit", "5")
        .json(&json!({
            "gender": "female",
            "occupation": "Doctor",
            "interests": ["Sci-Fi", "Action"]
        }))
        .await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert_eq!(recommendations.len(), 5);
    for recommendation in &recommendations {
        let source = recommendation["source"].as_str().unwrap();
        assert!(source == "content" || source == "trending");
        // Cold start has no interaction history to draw on
        assert!(recommendation["features"]["svdScore"].is_null());
        assert!(recommendation["features"]["demographicMatch"].as_f64().unwrap() >= 0.5);
    }
}

#[tokio::test]
async fn test_cold_start_unknown_labels_and_no_interests() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/recommend/cold-start")
        .json(&json!({
            "gender": "unspecified",
            "occupation": "Astronaut"
        }))
        .await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert_eq!(recommendations.len(), 8);
    assert!(recommendations
        .iter()
        .all(|recommendation| recommendation["source"] == "trending"));
}

#[tokio::test]
async fn test_performance_stats() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/stats/performance").await;
    response.assert_status_ok();

    let stats: serde_json::Value = response.json();
    assert!(stats["precision"].as_f64().unwrap() > 0.0);
    assert!(stats["latency_ms"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_list_users() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/users").await;
    response.assert_status_ok();

    let users: Vec<serde_json::Value> = response.json();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["id"], "user1");
}

#[tokio::test]
async fn test_reload_picks_up_new_artifacts() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/health").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["models_loaded"], false);

    // Drop a full artifact set into the watched directory, then reload
    let full = full_models_dir();
    for entry in fs::read_dir(full.path()).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }

    let response = server.post("/api/models/reload").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["models_loaded"], true);

    // The new catalog generation is now being served
    let response = server.get("/api/items/1").await;
    response.assert_status_ok();
    let item: serde_json::Value = response.json();
    assert_eq!(item["title"], "Orbital Dawn");
}

#[tokio::test]
async fn test_request_id_header_is_echoed() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/api/health").await;
    let header = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}
