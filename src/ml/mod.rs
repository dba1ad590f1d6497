// ============================================================
// Layer 5: ML / Model Layer
// ============================================================
// Every model in the crate lives here.
//
// Image classifier (Burn):
//
//   model.rs      CatDogNet: three conv blocks, global average
//                 pooling and a dense head ending in one logit
//   trainer.rs    Training loop with validation metrics, early
//                 stopping and best-checkpoint saving
//   inferencer.rs BurnClassifier, the ImageClassifier used by the
//                 HTTP service and the classify command
//
// Loan approval (plain f64 arithmetic, no tensors needed):
//
//   scaler.rs        StandardScaler for the numeric block
//   encoder.rs       OneHotEncoder for the categorical block
//   logistic.rs      L2-regularised logistic regression (Newton)
//   loan_pipeline.rs The three stages fitted and applied together
//   report.rs        Accuracy and the per-class report
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// CNN cat/dog classifier architecture
pub mod model;

/// Training loop with early stopping
pub mod trainer;

/// Loads the saved classifier and scores single images
pub mod inferencer;

pub mod scaler;

pub mod encoder;

pub mod logistic;

/// Scaler + encoder + classifier, fitted on the training split
pub mod loan_pipeline;

pub mod report;
