use serde::{Deserialize, Serialize};

use crate::domain::prediction::Prediction;

/// JSON body accepted by POST /predict
#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    /// Base64 image, optionally as a data URI
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success:    bool,
    pub prediction: Prediction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error:   String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "not_ready"
    pub status:       String,
    pub model_loaded: bool,
}
