use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::middleware::not_found::NotFoundPage;

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(i64),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Filename is empty after sanitizing")]
    InvalidFilename,

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Render error: {0}")]
    Render(String),
}

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CatalogError::InvalidFilename
            | CatalogError::Database(_)
            | CatalogError::Io(_)
            | CatalogError::Config(_)
            | CatalogError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            CatalogError::NotFound(_) => {
                return not_found_page(self.to_string()).into_response();
            }
            CatalogError::BadRequest(msg) => msg.clone(),
            _ => {
                error!(error = %self, "request failed");
                "An internal server error occurred.".to_string()
            }
        };
        (status, Html(error_page(status, &message))).into_response()
    }
}

/// 404 response tagged for the not-found layer, which renders it through the
/// state's renderer. The plain body is only seen without that layer.
pub fn not_found_page(message: String) -> impl IntoResponse {
    let body = error_page(StatusCode::NOT_FOUND, &message);
    (StatusCode::NOT_FOUND, NotFoundPage(message), Html(body))
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        "<!doctype html><html><head><title>{status}</title></head><body><h1>{status}</h1><p>{}</p></body></html>",
        crate::render::escape(message)
    )
}
