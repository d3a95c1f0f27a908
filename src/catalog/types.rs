//! Character record types as stored in the backing file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the character identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the relative path of the defeat audio clip.
pub const DEFEAT_MUSIC_FIELD: &str = "defeatMusic";
/// Field holding the relative path of the defeat video clip.
pub const DEFEAT_VIDEO_FIELD: &str = "defeatVideo";

/// One character card.
///
/// The record is kept as the JSON object found in the file so every field,
/// whatever its type, goes back out exactly as stored. Only `id` and the
/// two media paths are ever looked at, and only string media paths are
/// rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Character {
    fields: Map<String, Value>,
}

impl Character {
    /// Wrap a JSON object as a character.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// All fields as stored.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Raw `id` value, if present.
    pub fn id(&self) -> Option<&Value> {
        self.fields.get(ID_FIELD)
    }

    /// The `id` as an integer: a JSON integer, or a float with no fractional
    /// part. Strings and other types never match a numeric lookup.
    pub fn numeric_id(&self) -> Option<i64> {
        let id = self.id()?;
        id.as_i64().or_else(|| {
            let f = id.as_f64()?;
            (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
        })
    }

    /// Defeat audio path, when stored as a string.
    pub fn defeat_music(&self) -> Option<&str> {
        self.fields.get(DEFEAT_MUSIC_FIELD).and_then(Value::as_str)
    }

    /// Defeat video path, when stored as a string.
    pub fn defeat_video(&self) -> Option<&str> {
        self.fields.get(DEFEAT_VIDEO_FIELD).and_then(Value::as_str)
    }

    /// Prefix both media paths with `base`. Absent or non-string values are
    /// left alone.
    pub fn with_media_base(mut self, base: &str) -> Self {
        for field in [DEFEAT_MUSIC_FIELD, DEFEAT_VIDEO_FIELD] {
            if let Some(Value::String(path)) = self.fields.get_mut(field) {
                *path = format!("{}{}", base, path);
            }
        }
        self
    }
}

/// Top-level layout of the backing file: `{"characters": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    /// Characters in file order.
    pub characters: Vec<Character>,
}
