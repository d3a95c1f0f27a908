//! HTTP API module for character, health, metrics and static media endpoints.

pub mod error;
pub mod handlers;
pub mod params;
pub mod routes;
pub mod server;

pub use handlers::{AppState, MediaBase};
pub use routes::{create_app, create_router};
pub use server::serve;
