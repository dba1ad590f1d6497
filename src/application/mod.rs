// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Each use case coordinates the other layers to reach one goal:
// serve predictions, classify a file, train the image model, or
// run the loan pipeline.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Decode → preprocess → classify, shared by HTTP and CLI
pub mod classify_use_case;

/// Load the model and run the axum service
pub mod serve_use_case;

/// Image model training workflow
pub mod train_image_use_case;

/// Loan data → fitted pipeline → report → example decision
pub mod loan_use_case;
