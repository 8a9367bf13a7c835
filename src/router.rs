use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::get,
};
use std::sync::Arc;

use crate::handlers::products;
use crate::middleware::render_not_found;
use crate::render::{HtmlRenderer, Renderer};
use crate::service::ProductService;

/// Shared request state; cheap to clone.
#[derive(Clone)]
pub struct CatalogState {
    pub service: ProductService,
    pub renderer: Arc<dyn Renderer>,
}

impl CatalogState {
    pub fn new(service: ProductService) -> Self {
        Self::with_renderer(service, Arc::new(HtmlRenderer))
    }

    pub fn with_renderer(service: ProductService, renderer: Arc<dyn Renderer>) -> Self {
        Self { service, renderer }
    }
}

pub fn catalog_router(state: CatalogState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(products::home))
        .route("/products", get(products::list_products))
        .route("/product/{id}", get(products::view_product))
        .route(
            "/product/add",
            get(products::add_form).post(products::add_submit),
        )
        .route(
            "/product/update/{id}",
            get(products::update_form).post(products::update_submit),
        )
        .route("/product/delete/{id}", get(products::delete_product))
        .fallback(products::fallback)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(from_fn_with_state(state.clone(), render_not_found))
        .with_state(state)
}
