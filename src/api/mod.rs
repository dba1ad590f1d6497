// ============================================================
// Layer 1: HTTP API
// ============================================================
// The prediction service:
//
//   GET  /         endpoint description
//   GET  /health   {status, model_loaded}
//   POST /predict  multipart "image" field or JSON {"image": base64}
//
// Handlers only translate HTTP into an ImageSource and a
// Prediction back into JSON; decoding and inference live in the
// classify use case (Layer 2).

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod types;

pub use routes::create_router;
pub use state::AppState;
