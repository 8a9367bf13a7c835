//! Page rendering: a template id plus a JSON context object in, HTML out.
//!
//! Handlers only depend on the [`Renderer`] trait; [`HtmlRenderer`] is the
//! built-in implementation used by the server binary.

use serde_json::Value;
use std::fmt::Write;

use crate::error::CatalogError;

pub mod templates {
    pub const INDEX: &str = "layouts/index.html";
    pub const PRODUCTS: &str = "product/products.html";
    pub const PRODUCT: &str = "product/product.html";
    pub const ADD: &str = "product/add.html";
    pub const UPDATE: &str = "product/update.html";
    pub const NOT_FOUND: &str = "errors/not_found.html";
}

pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, context: &Value) -> Result<String, CatalogError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String, CatalogError> {
        let (title, body) = match template {
            templates::INDEX => (
                "Catalog",
                r#"<h1>Catalog</h1><p><a href="/products">Browse products</a> | <a href="/product/add">Add a product</a></p>"#
                    .to_string(),
            ),
            templates::PRODUCTS => ("Products", products_body(context)),
            templates::PRODUCT => ("Product", product_body(field(context, "product"))),
            templates::ADD => (
                "Add product",
                form_body("/product/add", None, context.get("error")),
            ),
            templates::UPDATE => {
                let product = field(context, "product");
                let id = product.get("id").map(text).unwrap_or_default();
                (
                    "Update product",
                    form_body(
                        &format!("/product/update/{id}"),
                        Some(product),
                        context.get("error"),
                    ),
                )
            }
            templates::NOT_FOUND => (
                "Not found",
                format!(
                    "<h1>Not found</h1><p>{}</p>",
                    escape(&context.get("error").map(text).unwrap_or_default())
                ),
            ),
            other => return Err(CatalogError::Render(format!("unknown template `{other}`"))),
        };
        Ok(layout(title, &body))
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{body}</body></html>",
        escape(title)
    )
}

fn products_body(context: &Value) -> String {
    let mut out = String::from("<h1>Products</h1><ul>");
    for product in context
        .get("products")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let id = product.get("id").map(text).unwrap_or_default();
        let name = product.get("name").map(text).unwrap_or_default();
        let _ = write!(
            out,
            r#"<li><a href="/product/{id}">{}</a> {}</li>"#,
            escape(&name),
            escape(&product.get("price").map(text).unwrap_or_default())
        );
    }
    out.push_str(r#"</ul><p><a href="/product/add">Add a product</a></p>"#);
    out
}

fn product_body(product: &Value) -> String {
    let id = product.get("id").map(text).unwrap_or_default();
    let mut out = format!(
        "<h1>{}</h1><p>{}</p><p>Price: {}</p><p>{}</p>",
        escape(&product.get("name").map(text).unwrap_or_default()),
        escape(&product.get("desc").map(text).unwrap_or_default()),
        escape(&product.get("price").map(text).unwrap_or_default()),
        if product.get("instock").and_then(Value::as_bool) == Some(true) {
            "In stock"
        } else {
            "Out of stock"
        }
    );
    if let Some(image) = product.get("image").and_then(Value::as_str) {
        let _ = write!(
            out,
            r#"<img src="/static/images/{0}" alt="{0}">"#,
            escape(image)
        );
    }
    let _ = write!(
        out,
        r#"<p><a href="/product/update/{id}">Edit</a> | <a href="/product/delete/{id}">Delete</a></p>"#
    );
    out
}

fn form_body(action: &str, product: Option<&Value>, error: Option<&Value>) -> String {
    let value = |key: &str| {
        product
            .and_then(|p| p.get(key))
            .map(text)
            .unwrap_or_default()
    };
    let checked = product
        .and_then(|p| p.get("instock"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut out = String::new();
    if let Some(error) = error.filter(|e| !e.is_null()) {
        let _ = write!(out, r#"<p class="error">{}</p>"#, escape(&text(error)));
    }
    let _ = write!(
        out,
        concat!(
            r#"<form method="post" action="{action}" enctype="multipart/form-data">"#,
            r#"<input name="name" value="{name}">"#,
            r#"<input name="price" value="{price}">"#,
            r#"<textarea name="desc">{desc}</textarea>"#,
            r#"<input type="checkbox" name="instock" value="on"{checked}>"#,
            r#"<input type="file" name="file">"#,
            r#"<button type="submit">Save</button></form>"#
        ),
        action = escape(action),
        name = escape(&value("name")),
        price = escape(&value("price")),
        desc = escape(&value("desc")),
        checked = if checked { " checked" } else { "" },
    );
    out
}

fn field<'a>(context: &'a Value, key: &str) -> &'a Value {
    context.get(key).unwrap_or(&Value::Null)
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
