use axum::{
    extract::{FromRequest, Path, Request, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CatalogError, not_found_page};
use crate::middleware::ProductForm;
use crate::render::templates;
use crate::router::CatalogState;
use crate::service::{SubmitOutcome, UploadRejection};

/// GET / -> landing page.
pub async fn home(State(state): State<CatalogState>) -> Result<Html<String>, CatalogError> {
    page(&state, templates::INDEX, Map::new())
}

/// GET /products -> every product.
pub async fn list_products(
    State(state): State<CatalogState>,
) -> Result<Html<String>, CatalogError> {
    let products = state.service.list().await?;
    page(&state, templates::PRODUCTS, context("products", &products)?)
}

/// GET /product/{id}
pub async fn view_product(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, CatalogError> {
    let product = state.service.get(id).await?;
    page(&state, templates::PRODUCT, context("product", &product)?)
}

/// GET /product/add -> empty form.
pub async fn add_form(State(state): State<CatalogState>) -> Result<Html<String>, CatalogError> {
    page(&state, templates::ADD, Map::new())
}

/// POST /product/add -> redirect to the list once a product with a valid image is saved.
pub async fn add_submit(
    State(state): State<CatalogState>,
    uri: Uri,
    form: ProductForm,
) -> Result<Response, CatalogError> {
    match state.service.create(form).await? {
        SubmitOutcome::Saved(_) => Ok(Redirect::to("/products").into_response()),
        SubmitOutcome::Rejected(rejection) => {
            rejected(&state, &uri, rejection, templates::ADD, Map::new())
        }
    }
}

/// GET /product/update/{id} -> form pre-filled with the stored product.
pub async fn update_form(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, CatalogError> {
    let product = state.service.get(id).await?;
    page(&state, templates::UPDATE, context("product", &product)?)
}

/// POST /product/update/{id} -> redirect to the detail page after a full overwrite.
///
/// The product is looked up before the body is read, so a missing id is a 404
/// whatever was posted.
pub async fn update_submit(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
    uri: Uri,
    req: Request,
) -> Result<Response, CatalogError> {
    let existing = state.service.get(id).await?;
    let form = ProductForm::from_request(req, &state).await?;
    let ctx = context("product", &existing)?;
    match state.service.update(existing, form).await? {
        SubmitOutcome::Saved(product) => {
            Ok(Redirect::to(&format!("/product/{}", product.id)).into_response())
        }
        SubmitOutcome::Rejected(rejection) => {
            rejected(&state, &uri, rejection, templates::UPDATE, ctx)
        }
    }
}

/// GET /product/delete/{id} -> delete unconditionally, back to the list.
pub async fn delete_product(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
) -> Result<Redirect, CatalogError> {
    state.service.delete(id).await?;
    Ok(Redirect::to("/products"))
}

pub async fn fallback(uri: Uri) -> impl IntoResponse {
    not_found_page(format!("No page at {}", uri.path()))
}

fn rejected(
    state: &CatalogState,
    uri: &Uri,
    rejection: UploadRejection,
    template: &str,
    mut ctx: Map<String, Value>,
) -> Result<Response, CatalogError> {
    if rejection.redirects() {
        return Ok(Redirect::to(&uri.to_string()).into_response());
    }
    ctx.insert("error".to_string(), Value::String(rejection.to_string()));
    Ok(page(state, template, ctx)?.into_response())
}

fn page(
    state: &CatalogState,
    template: &str,
    ctx: Map<String, Value>,
) -> Result<Html<String>, CatalogError> {
    state
        .renderer
        .render(template, &Value::Object(ctx))
        .map(Html)
}

fn context<T: Serialize>(key: &str, value: &T) -> Result<Map<String, Value>, CatalogError> {
    let value = serde_json::to_value(value).map_err(|e| CatalogError::Render(e.to_string()))?;
    let mut ctx = Map::new();
    ctx.insert(key.to_string(), value);
    Ok(ctx)
}
