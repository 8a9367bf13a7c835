use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponseParts, Response, ResponseParts},
};
use serde_json::json;
use tracing::error;

use crate::error::error_page;
use crate::render::templates;
use crate::router::CatalogState;

/// Marks a 404 whose message should be rendered as the not-found template.
#[derive(Debug, Clone)]
pub struct NotFoundPage(pub String);

impl IntoResponseParts for NotFoundPage {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.extensions_mut().insert(self);
        Ok(res)
    }
}

/// Re-render tagged 404 responses with the configured renderer.
pub async fn render_not_found(
    State(state): State<CatalogState>,
    req: Request,
    next: Next,
) -> Response {
    let resp = next.run(req).await;
    let Some(NotFoundPage(message)) = resp.extensions().get::<NotFoundPage>().cloned() else {
        return resp;
    };

    let body = state
        .renderer
        .render(templates::NOT_FOUND, &json!({ "error": message }))
        .unwrap_or_else(|e| {
            error!(error = %e, "failed to render not-found page");
            error_page(StatusCode::NOT_FOUND, &message)
        });
    let (mut parts, _) = resp.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    Response::from_parts(parts, Body::from(body))
}
