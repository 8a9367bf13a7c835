use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use catalog::render::Renderer;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "catalog-test-boundary";

struct TestApp {
    app: Router,
    service: catalog::ProductService,
    dir: TempDir,
}

async fn spawn_app() -> TestApp {
    spawn_app_with(None).await
}

async fn spawn_app_with(renderer: Option<Arc<dyn Renderer>>) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut cfg = catalog::Config::default();
    cfg.database_url = format!("sqlite:{}", dir.path().join("catalog.db").display());
    cfg.upload_dir = dir.path().join("images");

    let service = catalog::ProductService::from_config(&cfg)
        .await
        .expect("service");
    let state = match renderer {
        Some(renderer) => catalog::router::CatalogState::with_renderer(service.clone(), renderer),
        None => catalog::router::CatalogState::new(service.clone()),
    };
    let app = catalog::router::catalog_router(state, cfg.max_upload_bytes);
    TestApp { app, service, dir }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn widget_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Widget"),
        ("price", "9.99"),
        ("desc", "d"),
        ("instock", "on"),
    ]
}

async fn post_form(
    app: &Router,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(fields, file)))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed")
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed")
}

fn location(resp: &axum::response::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(resp: axum::response::Response) -> String {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(body.to_vec()).expect("response body was not utf-8")
}

async fn create_widget(t: &TestApp, filename: &str) -> i64 {
    let resp = post_form(
        &t.app,
        "/product/add",
        &widget_fields(),
        Some((filename, &b"\x89PNG\r\n"[..])),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/products");
    t.service
        .list()
        .await
        .expect("list")
        .last()
        .map(|p| p.id)
        .expect("a product was created")
}

#[tokio::test]
async fn home_and_empty_list_render() {
    let t = spawn_app().await;
    assert_eq!(get(&t.app, "/").await.status(), StatusCode::OK);

    let resp = get(&t.app, "/products").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("<h1>Products</h1>"));
}

#[tokio::test]
async fn create_with_valid_image_persists_product() {
    let t = spawn_app().await;
    let id = create_widget(&t, "my widget.PNG").await;

    let product = t.service.get(id).await.expect("stored product");
    assert_eq!(product.name, "Widget");
    assert_eq!(product.price, 9.99);
    assert_eq!(product.desc, "d");
    assert!(product.instock);
    assert!(product.modified.is_none());
    assert_eq!(product.image.as_deref(), Some("my_widget.PNG"));
    assert!(t.dir.path().join("images").join("my_widget.PNG").exists());

    let resp = get(&t.app, &format!("/product/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("<h1>Widget</h1>"));
}

#[tokio::test]
async fn create_without_file_redirects_back_to_form() {
    let t = spawn_app().await;

    let resp = post_form(&t.app, "/product/add", &widget_fields(), None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/product/add");

    let resp = post_form(&t.app, "/product/add", &widget_fields(), Some(("", &b""[..]))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/product/add");

    assert!(t.service.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn create_with_disallowed_extension_re_renders_form() {
    let t = spawn_app().await;

    let resp = post_form(
        &t.app,
        "/product/add",
        &widget_fields(),
        Some(("a.bmp", &b"BM"[..])),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("<form"));
    assert!(html.contains("File type not allowed"));
    assert!(t.service.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn create_with_missing_field_is_bad_request() {
    let t = spawn_app().await;
    let resp = post_form(
        &t.app,
        "/product/add",
        &[("name", "Widget"), ("desc", "d")],
        Some(("a.png", &b"x"[..])),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(t.service.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn unknown_ids_return_404() {
    let t = spawn_app().await;

    for uri in [
        "/product/9999",
        "/product/update/9999",
        "/product/delete/9999",
    ] {
        assert_eq!(get(&t.app, uri).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
    let resp = post_form(
        &t.app,
        "/product/update/9999",
        &widget_fields(),
        Some(("a.png", &b"x"[..])),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = get(&t.app, "/no/such/page").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Not found"));
}

#[tokio::test]
async fn update_with_new_image_overwrites_everything() {
    let t = spawn_app().await;
    let id = create_widget(&t, "a.png").await;

    let resp = post_form(
        &t.app,
        &format!("/product/update/{id}"),
        &[
            ("name", "Gadget"),
            ("price", "1.5"),
            ("desc", "new"),
            ("instock", ""),
        ],
        Some(("b.jpg", &b"jpeg"[..])),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/product/{id}"));

    let product = t.service.get(id).await.expect("stored product");
    assert_eq!(product.name, "Gadget");
    assert_eq!(product.price, 1.5);
    assert_eq!(product.desc, "new");
    assert!(!product.instock);
    assert_eq!(product.image.as_deref(), Some("b.jpg"));
    assert!(product.modified.is_some());
}

#[tokio::test]
async fn update_without_valid_file_changes_nothing() {
    let t = spawn_app().await;
    let id = create_widget(&t, "a.png").await;
    let before = t.service.get(id).await.expect("stored product");
    let uri = format!("/product/update/{id}");
    let changed = [("name", "Gadget"), ("price", "1.5"), ("desc", "new")];

    let resp = post_form(&t.app, &uri, &changed, None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), uri);

    let resp = post_form(&t.app, &uri, &changed, Some(("b.txt", &b"text"[..]))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(r#"value="Widget""#));

    assert_eq!(t.service.get(id).await.expect("stored product"), before);
}

#[tokio::test]
async fn delete_then_view_is_404_and_list_counts_match() {
    let t = spawn_app().await;
    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(create_widget(&t, &format!("w{i}.gif")).await);
    }

    let resp = get(&t.app, &format!("/product/delete/{}", ids[0])).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/products");

    assert_eq!(
        get(&t.app, &format!("/product/{}", ids[0])).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(t.service.list().await.expect("list").len(), 3);

    let html = body_text(get(&t.app, "/products").await).await;
    assert_eq!(html.matches("<li>").count(), 3);
}

struct TemplateNameRenderer;

impl Renderer for TemplateNameRenderer {
    fn render(&self, template: &str, _context: &Value) -> Result<String, catalog::CatalogError> {
        Ok(format!("rendered:{template}"))
    }
}

#[tokio::test]
async fn not_found_pages_use_the_state_renderer() {
    let t = spawn_app_with(Some(Arc::new(TemplateNameRenderer))).await;

    for uri in ["/product/9999", "/no/such/page"] {
        let resp = get(&t.app, uri).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_text(resp).await, "rendered:errors/not_found.html", "{uri}");
    }
}

#[tokio::test]
async fn create_with_non_finite_price_is_bad_request_and_writes_no_file() {
    let t = spawn_app().await;

    for price in ["NaN", "inf"] {
        let resp = post_form(
            &t.app,
            "/product/add",
            &[("name", "Widget"), ("price", price), ("desc", "d")],
            Some(("nan.png", &b"x"[..])),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{price}");
    }
    assert!(t.service.list().await.expect("list").is_empty());
    assert!(!t.dir.path().join("images").join("nan.png").exists());
}

#[tokio::test]
async fn update_looks_up_the_product_before_reading_the_body() {
    let t = spawn_app().await;
    let id = create_widget(&t, "a.png").await;

    let post_text = |uri: String| {
        t.app.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("not a form"))
                .expect("failed to build request"),
        )
    };

    let resp = post_text("/product/update/9999".to_string())
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = post_text(format!("/product/update/{id}"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
