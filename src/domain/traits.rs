// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, never
// against burn or the csv crate directly:
//
//   - BurnClassifier  implements ImageClassifier
//   - CsvLoanLoader   implements LoanRecordSource
//
// Tests swap in small fakes (a fixed-probability classifier, an
// in-memory record list) without touching the real backends.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Trait Objects)

use anyhow::Result;
use thiserror::Error;

use crate::domain::image::ImageTensor;
use crate::domain::loan::LoanRecord;

/// Why a forward pass could not produce a usable probability.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("input shape {actual:?} does not match model input {expected:?}")]
    ShapeMismatch { expected: [usize; 4], actual: [usize; 4] },

    #[error("model produced a non-finite output: {0}")]
    InvalidOutput(f32),

    #[error("model backend failure: {0}")]
    Backend(String),
}

// ─── ImageClassifier ──────────────────────────────────────────────────────────
/// Anything that can score a preprocessed image.
///
/// `Send + Sync` because a single loaded model is shared by every
/// request handler through an `Arc<dyn ImageClassifier>`.
pub trait ImageClassifier: Send + Sync {
    /// Return P(dog) for the image, a value in [0, 1].
    fn dog_probability(&self, image: &ImageTensor) -> Result<f32, InferenceError>;

    /// Side length of the square input the model was trained on.
    fn input_size(&self) -> usize;
}

// ─── LoanRecordSource ─────────────────────────────────────────────────────────
/// Any component that can produce raw loan rows.
///
/// Implementations:
///   - CsvLoanLoader → reads a CSV file from disk
pub trait LoanRecordSource {
    /// Load every available row. Fails if the source is unreadable
    /// or a required column is missing.
    fn load_all(&self) -> Result<Vec<LoanRecord>>;
}
