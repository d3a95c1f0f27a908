//! Character Cards API.
//!
//! Serves a fixed collection of character cards from a JSON file over a few
//! read-only HTTP endpoints, alongside the audio and video clips the cards
//! reference.
//!
//! # Endpoints
//!
//! ```text
//! GET /api/characters?limit=N   all cards, shuffled, at most N
//! GET /api/character/random     one card at random
//! GET /api/character/:id        one card by id (404 if absent)
//! GET /health                   plain-text liveness
//! GET /metrics                  Prometheus exposition
//! GET /music/*, /video/*        static media
//! ```
//!
//! The JSON file is re-read on every request, so edits take effect
//! immediately.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`catalog`]: Character records, shuffling and lookup
//! - [`api`]: HTTP routes, handlers and server
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod utils;

pub use catalog::{Character, CharacterCatalog};
pub use config::Config;
pub use error::{CatalogError, Result, ServiceError};
