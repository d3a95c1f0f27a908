use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::CatalogError;

/// Message returned for id lookups that match nothing.
pub const NOT_FOUND_MESSAGE: &str = "Character not found";

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match &self {
            CatalogError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": NOT_FOUND_MESSAGE })),
            )
                .into_response(),
            CatalogError::DataUnavailable { .. } | CatalogError::EmptyCatalog => {
                tracing::error!(error = %self, "Catalog request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "message": "Internal server error",
                        "error": self.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
