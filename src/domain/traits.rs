// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application and server layers talk to these traits,
// never to PNG directories or Burn models directly.
//
//   - PngDirLoader implements ImageSource
//   - Classifier<B> implements DigitClassifier for any Burn backend
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::digit::{DigitImage, Prediction};

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can produce labelled digit images.
pub trait ImageSource {
    /// Load every available image from this source.
    fn load_all(&self) -> Result<Vec<DigitImage>>;
}

// ─── DigitClassifier ──────────────────────────────────────────────────────────
/// Any component that can tell which digit an image shows.
///
/// `Send` so a classifier can be moved behind a mutex into the
/// HTTP server and onto blocking worker threads.
pub trait DigitClassifier: Send {
    /// `pixels` must hold `n_in()` intensities in [0, 1].
    fn classify(&self, pixels: &[f32]) -> Result<Prediction>;
}
