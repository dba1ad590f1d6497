// ============================================================
// API error type
// ============================================================
// Every failure a handler can hit, mapped to a status code and a
// message that is safe to show a client. Internal detail (backend
// errors, decoder messages) goes to the log, never to the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::types::ErrorResponse;
use crate::application::classify_use_case::ClassifyError;
use crate::data::decoder::DecodeError;
use crate::domain::traits::InferenceError;

pub const MISSING_IMAGE_MESSAGE: &str =
    "No image provided. Send image as multipart form data with key 'image' or as base64 in JSON with key 'image'";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("model not loaded")]
    ModelNotLoaded,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Request framing problem; the message is ours and safe to return.
    #[error("{0}")]
    BadRequest(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ClassifyError> for ApiError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::Decode(e)    => ApiError::Decode(e),
            ClassifyError::Inference(e) => ApiError::Inference(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ModelNotLoaded
            | ApiError::Inference(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client sees.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::ModelNotLoaded => "Model not loaded".to_string(),
            ApiError::Decode(DecodeError::MissingImage) => MISSING_IMAGE_MESSAGE.to_string(),
            ApiError::Decode(DecodeError::EmptyFilename) => "Empty filename provided".to_string(),
            ApiError::Decode(DecodeError::UnsupportedFormat(format)) => {
                format!("Unsupported image format: {format}. Supported formats: JPEG, PNG")
            }
            ApiError::Decode(DecodeError::Malformed(_)) => "Could not process image".to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::PayloadTooLarge => "Image exceeds the upload size limit".to_string(),
            ApiError::Inference(_) => "Prediction failed".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Prediction request failed: {self}");
        } else {
            tracing::warn!("Rejected prediction request: {self}");
        }

        let body = ErrorResponse { success: false, error: self.public_message() };
        (status, Json(body)).into_response()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_400() {
        assert_eq!(ApiError::from(DecodeError::MissingImage).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let e = ApiError::Inference(InferenceError::Backend("ndarray shape panic at 0x1f".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.public_message(), "Prediction failed");

        let e = ApiError::Decode(DecodeError::Malformed("Format error decoding Png: CRC".into()));
        assert_eq!(e.public_message(), "Could not process image");
    }

    #[test]
    fn test_unsupported_format_names_format() {
        let e = ApiError::from(DecodeError::UnsupportedFormat("GIF".into()));
        assert_eq!(
            e.public_message(),
            "Unsupported image format: GIF. Supported formats: JPEG, PNG"
        );
    }
}
