// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything between a raw input (uploaded bytes, an image folder,
// a CSV file) and the numbers a model consumes.
//
// Image side:
//
//   ImageSource ──► decoder ──► preprocessor ──► ImageTensor
//   image folder ──► dataset (+ augment) ──► batcher ──► tensor batches
//
// Loan side:
//
//   loan_data.csv ──► loader ──► loan_features ──► splitter
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Base64/multipart → decoded JPEG or PNG
pub mod decoder;

/// Resize + normalise into the network's input layout
pub mod preprocessor;

/// Random rotation, zoom and flip for training images
pub mod augment;

/// Implements Burn's Dataset trait over a class-per-folder tree
pub mod dataset;

/// Implements Burn's Batcher trait to create image tensor batches
pub mod batcher;

/// Reads the loan CSV
pub mod loader;

/// Coercion, imputation, derived features, label mapping
pub mod loan_features;

/// Seeded shuffle and train/test split
pub mod splitter;
