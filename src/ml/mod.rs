// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn framework specific code:
//
//   model.rs      — Dense network: 784 → hidden (ReLU) → 10
//   trainer.rs    — SGD/Nesterov training loop with per-epoch
//                   test-set evaluation
//   evaluator.rs  — Confusion matrix over labelled batches
//   inferencer.rs — Loads a checkpoint and classifies images
//
// Two backends are wired in. NdArray runs anywhere on the CPU;
// Wgpu uses the GPU through WebGPU. Training needs the
// Autodiff wrapper around either one.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Dense digit classifier architecture
pub mod model;

/// Full training loop with test-set evaluation
pub mod trainer;

/// Accuracy, precision, recall and F1 over a dataset
pub mod evaluator;

/// Inference engine — loads checkpoint and predicts digits
pub mod inferencer;

pub type CpuBackend  = burn::backend::NdArray;
pub type GpuBackend  = burn::backend::Wgpu;
pub type CpuAutodiff = burn::backend::Autodiff<CpuBackend>;
pub type GpuAutodiff = burn::backend::Autodiff<GpuBackend>;
