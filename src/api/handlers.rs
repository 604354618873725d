use super::extract::ApiJson;
use super::state::AppState;
use crate::models::{
    ImageGenerationRequest, PosterRequest, PosterResponse, TextGenerationRequest,
    TextGenerationResponse,
};
use crate::{Error, Result};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "AI Poster Maker API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate_poster": "/api/generate-poster",
            "generate_text": "/api/generate-text",
            "generate_image": "/api/generate-image",
            "preview_poster": "/api/preview-poster/{poster_id}",
            "download_poster": "/api/download-poster/{poster_id}",
            "delete_poster": "/api/delete-poster/{poster_id}",
            "templates": "/api/templates",
            "themes": "/api/themes",
            "health": "/health",
        }
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

pub async fn generate_poster(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PosterRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("Poster request: '{}'", request.title);

    let poster = state.service.generate_poster(request).await?;

    Ok((StatusCode::CREATED, Json(PosterResponse::from_poster(&poster))))
}

pub async fn generate_text(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TextGenerationRequest>,
) -> Result<impl IntoResponse> {
    let text = state.service.generate_text(&request).await?;

    Ok(Json(TextGenerationResponse {
        text,
        prompt: request.prompt,
        message: "Text generated successfully!".to_string(),
    }))
}

pub async fn generate_image(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImageGenerationRequest>,
) -> Result<impl IntoResponse> {
    let response = state.service.generate_image(&request).await?;
    Ok(Json(response))
}

pub async fn preview_poster(
    State(state): State<AppState>,
    Path(poster_id): Path<String>,
) -> Result<Response> {
    let (bytes, poster) = state.service.load_poster(&poster_id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, poster.format.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", poster.filename),
        )
        .body(Body::from(bytes))
        .map_err(|e| Error::Invariant(format!("Failed to build response: {}", e)))
}

pub async fn download_poster(
    State(state): State<AppState>,
    Path(poster_id): Path<String>,
) -> Result<Response> {
    let (bytes, poster) = state.service.load_poster(&poster_id).await?;
    tracing::info!("Poster {} downloaded ({} bytes)", poster.poster_id, bytes.len());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"poster_{}.{}\"",
                poster.poster_id,
                poster.format.extension()
            ),
        )
        .body(Body::from(bytes))
        .map_err(|e| Error::Invariant(format!("Failed to build response: {}", e)))
}

pub async fn delete_poster(
    State(state): State<AppState>,
    Path(poster_id): Path<String>,
) -> Result<StatusCode> {
    state.service.delete_poster(&poster_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_templates(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "templates": state.service.registry().list_templates() }))
}

pub async fn list_themes(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "themes": state.service.registry().list_themes() }))
}
