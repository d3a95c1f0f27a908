//! Character catalog module.
//!
//! This module handles:
//! - Character record types and the backing file layout
//! - Shuffling, random picks and id lookup
//! - The file-backed catalog service used by the HTTP layer

pub mod selection;
pub mod service;
pub mod types;

pub use selection::{find_by_id, pick_random, shuffle, shuffled_prefix};
pub use service::CharacterCatalog;
pub use types::{CatalogFile, Character};
