// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs — Saving and loading model weights plus the
//                   TrainConfig needed to rebuild the network.
//
//   metrics.rs    — Epoch-level loss/accuracy rows appended to
//                   a CSV file for later plotting.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
