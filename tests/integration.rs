use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use poster_maker::{
    ai::{MockImageClient, MockTextClient},
    api::{create_router, AppState},
    config::FallbackPolicy,
    models::{PosterRequest, PosterSize},
    registry::{Registry, TextField},
    render::{placeholder_logo, Composition, Compositor, FontLibrary, PosterContent},
    service::{PosterService, PosterServices, PosterSettings},
    store::{FilesystemStore, MockPosterStore, PosterStore},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn compositor() -> Compositor {
    Compositor::new(
        Arc::new(FontLibrary::bundled()),
        Arc::new(placeholder_logo()),
    )
}

fn service(
    text: &Arc<MockTextClient>,
    image: &Arc<MockImageClient>,
    store: Arc<dyn PosterStore>,
    fallback: FallbackPolicy,
) -> PosterService {
    PosterService::with_services(
        PosterServices {
            text: text.clone(),
            image: image.clone(),
            store,
            registry: Arc::new(Registry::builtin()),
            compositor: compositor(),
        },
        PosterSettings {
            fallback,
            ..PosterSettings::default()
        },
    )
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_a4_business_poster_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FilesystemStore::new(dir.path(), 50 * 1024 * 1024).unwrap());
    let text = Arc::new(MockTextClient::new());
    let image = Arc::new(MockImageClient::new());
    let app = create_router(AppState::new(service(
        &text,
        &image,
        store,
        FallbackPolicy::None,
    )));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate-poster",
            json!({
                "title": "Grand Opening Sale",
                "description": "Everything must go this weekend only",
                "theme": "corporate",
                "size": "A4",
                "template": "business_poster",
                "include_logo": true,
                "background_prompt": "abstract blue skyline",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["width"], 2480);
    assert_eq!(body["height"], 3508);
    assert_eq!(body["template"], "business_poster");
    // The description was supplied, so only the background hit a provider.
    assert_eq!(text.get_call_count(), 0);
    assert_eq!(image.get_call_count(), 1);

    let poster_id = body["poster_id"].as_str().unwrap();
    assert_eq!(
        body["image_url"],
        format!("/api/preview-poster/{}", poster_id)
    );

    let preview = app
        .oneshot(get(&format!("/api/preview-poster/{}", poster_id)))
        .await
        .unwrap();
    assert_eq!(preview.status(), StatusCode::OK);
    let bytes = to_bytes(preview.into_body(), usize::MAX).await.unwrap();

    let on_disk = std::fs::read(dir.path().join(format!("{}.png", poster_id))).unwrap();
    assert_eq!(bytes.as_ref(), on_disk.as_slice());

    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2480, 3508));
}

#[test]
fn test_a4_title_stays_inside_its_region() {
    let registry = Registry::builtin();
    let template = registry.resolve_template("business_poster").unwrap().clone();
    let blank = Composition {
        width: 2480,
        height: 3508,
        theme: registry.resolve_theme("corporate").unwrap().clone(),
        template: template.clone(),
        content: PosterContent::default(),
        background: None,
        include_logo: true,
    };
    let mut titled = blank.clone();
    titled.content.title = "Grand Opening Sale".to_string();

    let compositor = compositor();
    let base = compositor.compose(&blank).unwrap();
    let drawn = compositor.compose(&titled).unwrap();
    let title_rect = template
        .region(TextField::Title)
        .unwrap()
        .rect
        .scaled(2480, 3508);

    let mut ink = 0usize;
    for (x, y, pixel) in drawn.enumerate_pixels() {
        if pixel != base.get_pixel(x, y) {
            ink += 1;
            assert!(title_rect.contains(x, y), "title ink at {},{}", x, y);
        }
    }
    assert!(ink > 0);
}

#[tokio::test]
async fn test_oversized_custom_request_makes_no_provider_calls() {
    let text = Arc::new(MockTextClient::new());
    let image = Arc::new(MockImageClient::new());
    let store = Arc::new(MockPosterStore::new());
    let app = create_router(AppState::new(service(
        &text,
        &image,
        store.clone(),
        FallbackPolicy::None,
    )));

    let response = app
        .oneshot(post_json(
            "/api/generate-poster",
            json!({
                "title": "Huge",
                "size": "CUSTOM",
                "custom_width": 999999,
                "custom_height": 999999,
                "generate_description": true,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(text.get_call_count(), 0);
    assert_eq!(image.get_call_count(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_502_and_stores_nothing() {
    let text = Arc::new(MockTextClient::failing());
    let image = Arc::new(MockImageClient::new());
    let store = Arc::new(MockPosterStore::new());
    let app = create_router(AppState::new(service(
        &text,
        &image,
        store.clone(),
        FallbackPolicy::None,
    )));

    let response = app
        .oneshot(post_json(
            "/api/generate-poster",
            json!({
                "title": "Bake Sale",
                "size": "SOCIAL_MEDIA",
                "generate_description": true,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["error"], "UpstreamError");
    assert_eq!(store.get_save_count(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_placeholder_policy_still_produces_a_poster() {
    let text = Arc::new(MockTextClient::failing());
    let image = Arc::new(MockImageClient::failing());
    let store = Arc::new(MockPosterStore::new());
    let service = service(&text, &image, store.clone(), FallbackPolicy::Placeholder);

    let mut request = PosterRequest::new("Bake Sale");
    request.size = PosterSize::Banner;
    request.generate_description = true;
    request.background_prompt = Some("cupcakes".to_string());
    request.tone = Some("friendly".to_string());

    let poster = service.generate_poster(request).await.unwrap();

    assert_eq!((poster.width, poster.height), (1200, 400));
    assert_eq!(
        poster.request.description.as_deref(),
        Some("Join us for: Bake Sale")
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_unknown_and_traversal_ids_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();
    let store = Arc::new(FilesystemStore::new(dir.path().join("posters"), 1024).unwrap());
    let app = create_router(AppState::new(service(
        &Arc::new(MockTextClient::new()),
        &Arc::new(MockImageClient::new()),
        store,
        FallbackPolicy::None,
    )));

    for uri in [
        "/api/preview-poster/0d9c6a3e-55b5-4f0e-a0c4-3c1f1d2b7a10",
        "/api/download-poster/..%2Fsecret.txt",
        "/api/preview-poster/secret",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json_body(response).await["error"], "NotFound");
    }
}

#[tokio::test]
async fn test_listings_and_root() {
    let app = create_router(AppState::new(service(
        &Arc::new(MockTextClient::new()),
        &Arc::new(MockImageClient::new()),
        Arc::new(MockPosterStore::new()),
        FallbackPolicy::None,
    )));

    let themes = json_body(app.clone().oneshot(get("/api/themes")).await.unwrap()).await;
    assert_eq!(themes["themes"].as_array().unwrap().len(), 12);

    let templates = json_body(app.clone().oneshot(get("/api/templates")).await.unwrap()).await;
    let business = templates["templates"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["key"] == "business_poster")
        .unwrap();
    assert_eq!(business["has_logo_region"], true);

    let root = app.oneshot(get("/")).await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
}
