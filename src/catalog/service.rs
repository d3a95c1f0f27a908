//! File-backed character catalog.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::debug;

use crate::error::CatalogError;
use crate::metrics;

use super::selection::{find_by_id, pick_random, shuffled_prefix};
use super::types::{CatalogFile, Character};

/// Stateless catalog service over a JSON backing file.
///
/// The file is read and parsed on every call, so edits show up on the next
/// request without a restart.
#[derive(Debug, Clone)]
pub struct CharacterCatalog {
    path: PathBuf,
}

impl CharacterCatalog {
    /// Create a catalog backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the full catalog in file order.
    pub async fn load(&self) -> Result<Vec<Character>, CatalogError> {
        let start = Instant::now();
        let result = self.read_file().await;
        metrics::record_catalog_load_latency(start);

        match &result {
            Ok(characters) => debug!(
                path = %self.path.display(),
                count = characters.len(),
                "Loaded character catalog"
            ),
            // Callers report the error; only count it here.
            Err(_) => metrics::inc_catalog_load_failures(),
        }

        result
    }

    async fn read_file(&self) -> Result<Vec<Character>, CatalogError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;
        let file: CatalogFile = serde_json::from_slice(&raw).map_err(|e| self.unavailable(e))?;
        Ok(file.characters)
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> CatalogError {
        CatalogError::DataUnavailable {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// All characters in random order, truncated to `limit` when given.
    pub async fn list_all(
        &self,
        limit: Option<usize>,
        media_base: Option<&str>,
    ) -> Result<Vec<Character>, CatalogError> {
        let characters = self.load().await?;
        let selected = shuffled_prefix(characters, limit, &mut rand::rng());
        Ok(selected
            .into_iter()
            .map(|c| rewrite(c, media_base))
            .collect())
    }

    /// One character chosen uniformly at random.
    pub async fn random(&self, media_base: Option<&str>) -> Result<Character, CatalogError> {
        let characters = self.load().await?;
        let chosen = pick_random(characters, &mut rand::rng())?;
        Ok(rewrite(chosen, media_base))
    }

    /// The first character with the given id.
    pub async fn by_id(&self, id: i64, media_base: Option<&str>) -> Result<Character, CatalogError> {
        let characters = self.load().await?;
        find_by_id(characters, id)
            .map(|c| rewrite(c, media_base))
            .ok_or(CatalogError::NotFound { id: id.to_string() })
    }
}

fn rewrite(character: Character, media_base: Option<&str>) -> Character {
    match media_base {
        Some(base) => character.with_media_base(base),
        None => character,
    }
}
