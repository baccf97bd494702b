// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the published archive to tensor batches:
//
//   mnist_png.tar.gz (remote)
//       │
//       ▼
//   MnistFetcher      → downloads + extracts once
//       │
//       ▼
//   MnistStore        → training / testing split locations
//       │
//       ▼
//   PngDirLoader      → reads PNGs, label = folder name
//       │             (uses Preprocessor: 28x28, gray, [0,1])
//       ▼
//   MnistDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   MnistBatcher      → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Downloads and extracts the MNIST PNG archive
pub mod fetcher;

/// Training / testing split layout and random sampling
pub mod mnist;

/// Loads a split directory of PNG files
pub mod loader;

/// Converts images and data URLs into scaled pixel vectors
pub mod preprocessor;

/// Implements Burn's Dataset trait for digit images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
