use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::api::{
    error::ApiError,
    state::AppState,
    types::{HealthResponse, ImagePayload, PredictResponse},
};
use crate::application::classify_use_case::classify;
use crate::data::decoder::DecodeError;
use crate::domain::image::ImageSource;

/// GET / -- what this service offers
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Cat vs Dog Classification API",
        "endpoints": {
            "predict": {
                "method": "POST",
                "url": "/predict",
                "description": "Classify an image as cat or dog",
                "request_format": {
                    "multipart_form_data": "Upload image file with key 'image'",
                    "json_base64": "Send base64 encoded image in JSON with key 'image'"
                },
                "response": {
                    "predicted_class": "string ('cat' or 'dog')",
                    "confidence": "float (0.0-1.0)",
                    "probabilities": {
                        "cat": "float (probability of cat)",
                        "dog": "float (probability of dog)"
                    }
                }
            },
            "health": {
                "method": "GET",
                "url": "/health",
                "description": "Service status and whether the model is loaded"
            }
        }
    }))
}

/// GET /health -- always 200; readiness is in the body
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.model_loaded();
    Json(HealthResponse {
        status:       if loaded { "healthy" } else { "not_ready" }.to_string(),
        model_loaded: loaded,
    })
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<PredictResponse>, ApiError> {
    let classifier = state.classifier.clone().ok_or(ApiError::ModelNotLoaded)?;
    let source     = read_image_source(request).await?;

    // Decoding, resizing and the forward pass are CPU-bound
    let prediction = tokio::task::spawn_blocking(move || classify(classifier.as_ref(), &source))
        .await
        .map_err(|e| ApiError::Internal(format!("classification task failed: {e}")))??;

    Ok(Json(PredictResponse { success: true, prediction }))
}

/// Resolve the request body into exactly one ImageSource.
///
/// multipart/form-data → the field named "image"
/// anything else       → JSON {"image": "<base64 or data URI>"}
async fn read_image_source(request: Request) -> Result<ImageSource, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| rejection(e.status(), e.body_text()))?
        {
            if field.name() != Some("image") {
                continue;
            }
            let filename = field.file_name().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| rejection(e.status(), e.body_text()))?;
            return Ok(ImageSource::Multipart { filename, bytes: bytes.to_vec() });
        }
        return Err(DecodeError::MissingImage.into());
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| rejection(e.status(), e.body_text()))?;
    if body.is_empty() {
        return Err(DecodeError::MissingImage.into());
    }

    let payload: ImagePayload = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Request body must be a JSON object with an 'image' field".to_string()))?;

    payload
        .image
        .map(ImageSource::Base64)
        .ok_or_else(|| DecodeError::MissingImage.into())
}

fn rejection(status: StatusCode, detail: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        tracing::debug!("Unreadable request body: {detail}");
        ApiError::BadRequest("Could not read request body".to_string())
    }
}
