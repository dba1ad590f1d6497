// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs, enums, and traits that define what the
// system talks about.
//
// Rules for this layer:
//   - NO burn tensor types
//   - NO file I/O or network calls
//   - Only data types, pure formulas, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Image request sources and the preprocessed tensor type
pub mod image;

/// Cat/dog labels and the formatted prediction
pub mod prediction;

/// Loan rows, applicant input, decisions, derived features
pub mod loan;

/// Core abstractions that other layers implement
pub mod traits;
