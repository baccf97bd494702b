// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training, evaluating, predicting, serving).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - No direct file access (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow and its config
pub mod train_use_case;

// Test-set report for a saved model
pub mod evaluate_use_case;

// Single-image classification
pub mod predict_use_case;

// Model bootstrap + HTTP server
pub mod serve_use_case;
