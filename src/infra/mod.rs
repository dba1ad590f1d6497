// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by training, serving and the
// classify command:
//
//   checkpoint.rs  the image model artifact. Burn's gzipped
//                  named MessagePack recorder writes the weights;
//                  the architecture config sits next to them as
//                  JSON so serving can rebuild the network first.
//
//   metrics.rs     per-epoch training metrics appended to a CSV.
//
// Reference: Burn Book §5 (Checkpointing)

/// Model artifact saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
