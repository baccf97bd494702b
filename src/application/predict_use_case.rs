// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Classifies a single PNG with the saved model. Without an
// explicit file a random test image is picked, the same way
// the server's sample endpoint does it.

use std::path::PathBuf;

use anyhow::Result;
use burn::prelude::*;

use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::Preprocessor;
use crate::domain::digit::Prediction;
use crate::ml::inferencer::Classifier;

/// A prediction together with where the image came from.
#[derive(Debug, Clone)]
pub struct PredictOutcome {
    pub path:       PathBuf,
    /// Known only for images drawn from the test split
    pub label:      Option<u8>,
    pub prediction: Prediction,
}

pub struct PredictUseCase {
    config: TrainConfig,
    image:  Option<PathBuf>,
}

impl PredictUseCase {
    pub fn new(config: TrainConfig, image: Option<PathBuf>) -> Self {
        Self { config, image }
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<PredictOutcome> {
        let classifier: Classifier<B> =
            Classifier::from_checkpoint(&self.config.checkpoint(), device)?;

        let (path, label) = match &self.image {
            Some(path) => (path.clone(), None),
            None => {
                let sample = self.config.store().select_any(&mut rand::thread_rng())?;
                (sample.path, Some(sample.label))
            }
        };

        let pixels     = Preprocessor::new().pixels_from_path(&path)?;
        let prediction = classifier.predict(&pixels)?;

        tracing::info!("'{}' → {}", path.display(), prediction.digit);
        Ok(PredictOutcome { path, label, prediction })
    }
}
