//! Hybrid recommendation scoring engine.
//!
//! Loads a bundle of independently-optional trained artifacts (latent-factor
//! rating predictor, content vectorizer, embedding matrices, demographic
//! encoders, final-ranking model) plus an item catalog, computes per-item
//! signal scores with graceful degradation, and fuses them into ranked
//! recommendation lists served over a thin HTTP surface.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
